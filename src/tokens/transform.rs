//! Color transforms
//!
//! Relative transforms (`darken(10%)`, `lighten(10%)`, `alpha(0.5)`,
//! `saturate(20%)`) apply to an already-resolved color value. Arguments
//! are validated against the declared bounds before anything is
//! computed: darken/lighten/saturate take a percentage in [0,100],
//! alpha a factor in [0,1].

use thiserror::Error;

/// RGBA color, channels in [0,255], alpha in [0,1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("unknown transform '{0}'")]
    UnknownTransform(String),

    #[error("argument {value} out of bounds for {name} (expected {low}..={high})")]
    OutOfBounds {
        name: String,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error("'{0}' is not a color value")]
    NotAColor(String),

    #[error("malformed transform expression '{0}'")]
    Malformed(String),
}

/// A parsed, bounds-checked transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorTransform {
    Darken(f64),
    Lighten(f64),
    Saturate(f64),
    Alpha(f64),
}

impl ColorTransform {
    /// Parse an expression like `darken(10%)` or `alpha(0.5)`.
    pub fn parse(expr: &str) -> Result<Self, TransformError> {
        let expr = expr.trim();
        let open = expr
            .find('(')
            .ok_or_else(|| TransformError::Malformed(expr.to_string()))?;
        if !expr.ends_with(')') {
            return Err(TransformError::Malformed(expr.to_string()));
        }
        let name = &expr[..open];
        let raw_arg = expr[open + 1..expr.len() - 1].trim();

        match name {
            "darken" | "lighten" | "saturate" => {
                let value = parse_percent(raw_arg)
                    .ok_or_else(|| TransformError::Malformed(expr.to_string()))?;
                check_bounds(name, value, 0.0, 100.0)?;
                Ok(match name {
                    "darken" => Self::Darken(value),
                    "lighten" => Self::Lighten(value),
                    _ => Self::Saturate(value),
                })
            }
            "alpha" => {
                let value: f64 = raw_arg
                    .parse()
                    .map_err(|_| TransformError::Malformed(expr.to_string()))?;
                check_bounds(name, value, 0.0, 1.0)?;
                Ok(Self::Alpha(value))
            }
            other => Err(TransformError::UnknownTransform(other.to_string())),
        }
    }

    /// Apply to a resolved color.
    pub fn apply(&self, color: Color) -> Color {
        match *self {
            Self::Darken(pct) => scale_channels(color, 1.0 - pct / 100.0),
            Self::Lighten(pct) => {
                let f = pct / 100.0;
                Color {
                    r: lerp_to(color.r, 255, f),
                    g: lerp_to(color.g, 255, f),
                    b: lerp_to(color.b, 255, f),
                    a: color.a,
                }
            }
            Self::Saturate(pct) => saturate(color, pct / 100.0),
            Self::Alpha(a) => Color { a, ..color },
        }
    }
}

/// True when `expr` looks like a transform call (`name(arg)`).
pub fn is_transform_expr(expr: &str) -> bool {
    let expr = expr.trim();
    expr.ends_with(')')
        && expr
            .find('(')
            .map(|i| i > 0 && expr[..i].chars().all(|c| c.is_ascii_alphabetic()))
            .unwrap_or(false)
}

/// Apply a transform expression to a resolved color string.
pub fn apply_transform(expr: &str, base: &str) -> Result<String, TransformError> {
    let transform = ColorTransform::parse(expr)?;
    let color = parse_color(base).ok_or_else(|| TransformError::NotAColor(base.to_string()))?;
    Ok(format_color(transform.apply(color)))
}

fn parse_percent(s: &str) -> Option<f64> {
    s.strip_suffix('%')?.trim().parse().ok()
}

fn check_bounds(name: &str, value: f64, low: f64, high: f64) -> Result<(), TransformError> {
    if value < low || value > high || !value.is_finite() {
        return Err(TransformError::OutOfBounds {
            name: name.to_string(),
            value,
            low,
            high,
        });
    }
    Ok(())
}

fn scale_channels(c: Color, factor: f64) -> Color {
    Color {
        r: clamp_channel(c.r as f64 * factor),
        g: clamp_channel(c.g as f64 * factor),
        b: clamp_channel(c.b as f64 * factor),
        a: c.a,
    }
}

fn lerp_to(from: u8, to: u8, f: f64) -> u8 {
    clamp_channel(from as f64 + (to as f64 - from as f64) * f)
}

fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

// Push channels away from their shared gray level.
fn saturate(c: Color, f: f64) -> Color {
    let gray = (c.r as f64 + c.g as f64 + c.b as f64) / 3.0;
    Color {
        r: clamp_channel(gray + (c.r as f64 - gray) * (1.0 + f)),
        g: clamp_channel(gray + (c.g as f64 - gray) * (1.0 + f)),
        b: clamp_channel(gray + (c.b as f64 - gray) * (1.0 + f)),
        a: c.a,
    }
}

/// Parse `#rgb` or `#rrggbb` into a [`Color`].
pub fn parse_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    // Length checks below count bytes and the 6-digit form byte-slices;
    // multibyte input must bail out before either.
    if !hex.is_ascii() {
        return None;
    }
    let (r, g, b) = match hex.len() {
        3 => {
            let mut it = hex.chars();
            let r = it.next()?.to_digit(16)? as u8;
            let g = it.next()?.to_digit(16)? as u8;
            let b = it.next()?.to_digit(16)? as u8;
            (r * 17, g * 17, b * 17)
        }
        6 => (
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ),
        _ => return None,
    };
    Some(Color { r, g, b, a: 1.0 })
}

fn format_color(c: Color) -> String {
    if (c.a - 1.0).abs() < f64::EPSILON {
        format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    } else {
        format!("rgba({},{},{},{})", c.r, c.g, c.b, c.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_short_and_long() {
        assert_eq!(
            parse_color("#fff"),
            Some(Color {
                r: 255,
                g: 255,
                b: 255,
                a: 1.0
            })
        );
        assert_eq!(
            parse_color("#102030"),
            Some(Color {
                r: 16,
                g: 32,
                b: 48,
                a: 1.0
            })
        );
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("#12345"), None);
    }

    #[test]
    fn test_multibyte_input_is_not_a_color() {
        // "#aéaé" is six bytes but not six hex digits; it must reject
        // cleanly rather than slicing mid-character.
        assert_eq!(parse_color("#a\u{e9}a\u{e9}"), None);
        let err = apply_transform("darken(10%)", "#a\u{e9}a\u{e9}").unwrap_err();
        assert!(matches!(err, TransformError::NotAColor(_)));
    }

    #[test]
    fn test_darken_scales_down() {
        let out = apply_transform("darken(50%)", "#808080").unwrap();
        assert_eq!(out, "#404040");
    }

    #[test]
    fn test_lighten_moves_toward_white() {
        let out = apply_transform("lighten(100%)", "#102030").unwrap();
        assert_eq!(out, "#ffffff");
    }

    #[test]
    fn test_alpha_emits_rgba() {
        let out = apply_transform("alpha(0.5)", "#000000").unwrap();
        assert_eq!(out, "rgba(0,0,0,0.5)");
    }

    #[test]
    fn test_darken_out_of_bounds() {
        let err = apply_transform("darken(120%)", "#808080").unwrap_err();
        assert!(matches!(err, TransformError::OutOfBounds { .. }));
    }

    #[test]
    fn test_alpha_out_of_bounds() {
        let err = apply_transform("alpha(1.5)", "#808080").unwrap_err();
        assert!(matches!(err, TransformError::OutOfBounds { .. }));
    }

    #[test]
    fn test_unknown_transform() {
        let err = apply_transform("hueshift(10%)", "#808080").unwrap_err();
        assert!(matches!(err, TransformError::UnknownTransform(_)));
    }

    #[test]
    fn test_transform_on_non_color() {
        let err = apply_transform("darken(10%)", "16px").unwrap_err();
        assert!(matches!(err, TransformError::NotAColor(_)));
    }

    #[test]
    fn test_is_transform_expr() {
        assert!(is_transform_expr("darken(10%)"));
        assert!(is_transform_expr("alpha(0.3)"));
        assert!(!is_transform_expr("#ffffff"));
        assert!(!is_transform_expr("16px"));
        assert!(!is_transform_expr("(weird)"));
    }

    #[test]
    fn test_saturate_keeps_gray_fixed() {
        let out = apply_transform("saturate(50%)", "#808080").unwrap();
        assert_eq!(out, "#808080");
    }
}
