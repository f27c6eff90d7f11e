//! Property tests for theme layer merging.

use proptest::prelude::*;
use serde_json::{Map, Value};

use dcfc::tokens::{deep_merge, merge_theme_layers};

// Small key alphabet so layers actually collide.
fn any_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        "#[0-9a-f]{6}".prop_map(Value::String),
        (0..64i64).prop_map(Value::from),
    ]
}

fn any_group() -> impl Strategy<Value = Value> {
    proptest::collection::btree_map(
        prop_oneof![Just("a"), Just("b"), Just("c")].prop_map(String::from),
        any_leaf(),
        0..=3,
    )
    .prop_map(|m| Value::Object(m.into_iter().collect()))
}

fn any_layer() -> impl Strategy<Value = Value> {
    proptest::collection::btree_map(
        prop_oneof![Just("color"), Just("space"), Just("radius")].prop_map(String::from),
        prop_oneof![any_leaf(), any_group()],
        0..=3,
    )
    .prop_map(|m| Value::Object(m.into_iter().collect()))
}

fn collect_leaves(tree: &Value, prefix: &str, out: &mut Vec<(String, Value)>) {
    match tree {
        Value::Object(map) => {
            for (key, value) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_leaves(value, &path, out);
            }
        }
        leaf => out.push((prefix.to_string(), leaf.clone())),
    }
}

fn lookup<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = tree;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Every leaf of the last layer in the merge order wins:
    /// the merged tree carries exactly that value at that path.
    #[test]
    fn property_last_layer_leaves_win(
        base in any_layer(),
        last in any_layer(),
    ) {
        let mut layers = Map::new();
        layers.insert("base".to_string(), base);
        layers.insert("last".to_string(), last.clone());

        let merged = merge_theme_layers(
            &layers,
            &["base".to_string(), "last".to_string()],
        );

        let mut leaves = Vec::new();
        collect_leaves(&last, "", &mut leaves);
        for (path, value) in leaves {
            prop_assert_eq!(
                lookup(&merged, &path),
                Some(&value),
                "leaf '{}' from the last layer must survive",
                path
            );
        }
    }

    /// PROPERTY: Merging the empty overlay is the identity; merging onto
    /// the empty base reproduces the overlay.
    #[test]
    fn property_empty_layer_is_identity(layer in any_layer()) {
        let mut forward = layer.clone();
        deep_merge(&mut forward, &Value::Object(Map::new()));
        prop_assert_eq!(&forward, &layer);

        let mut backward = Value::Object(Map::new());
        deep_merge(&mut backward, &layer);
        prop_assert_eq!(&backward, &layer);
    }

    /// PROPERTY: Merging the declared order in one call equals folding
    /// the layers one deep_merge at a time.
    #[test]
    fn property_merge_equals_stepwise_fold(
        layers in proptest::collection::vec(any_layer(), 1..=4),
    ) {
        let mut named = Map::new();
        let mut order = Vec::new();
        for (i, layer) in layers.iter().enumerate() {
            let name = format!("layer{i}");
            named.insert(name.clone(), layer.clone());
            order.push(name);
        }

        let direct = merge_theme_layers(&named, &order);

        let mut folded = Value::Object(Map::new());
        for layer in &layers {
            deep_merge(&mut folded, layer);
        }

        prop_assert_eq!(direct, folded);
    }

    /// PROPERTY: Merging never drops a path: every leaf path of the base
    /// still resolves to some value after any overlay.
    #[test]
    fn property_merge_never_drops_base_paths(
        base in any_layer(),
        overlay in any_layer(),
    ) {
        let mut merged = base.clone();
        deep_merge(&mut merged, &overlay);

        let mut leaves = Vec::new();
        collect_leaves(&base, "", &mut leaves);
        for (path, _) in leaves {
            // An overlay scalar may replace a whole group, shortening
            // the path; some prefix of it must still exist.
            let survives = (0..path.split('.').count()).any(|i| {
                let prefix: Vec<&str> = path.split('.').take(i + 1).collect();
                lookup(&merged, &prefix.join(".")).is_some()
            });
            prop_assert!(survives, "no prefix of '{}' survived the merge", path);
        }
    }
}
