//! Theme layer merging
//!
//! Theme layers are sparse overlays combined under a declared
//! `merge_order` (e.g. `[base, brand, mode, density, shape]`). Merging
//! is a deep merge at the leaf-key level: a later layer that sets
//! `color.accent` leaves its sibling `color.surface` from an earlier
//! layer intact. A later non-object value replaces whatever was there.

use serde_json::{Map, Value};

/// Deep-merge `overlay` on top of `base`, leaf-level.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// Merge named theme layers in `merge_order`. Later layers win.
///
/// Layers named in `merge_order` but absent from `layers` contribute
/// nothing; layers present but not named are ignored (they are not part
/// of the declared ordering).
pub fn merge_theme_layers(
    layers: &Map<String, Value>,
    merge_order: &[String],
) -> Value {
    let mut merged = Value::Object(Map::new());
    for name in merge_order {
        if let Some(layer) = layers.get(name) {
            deep_merge(&mut merged, layer);
        }
    }
    merged
}
