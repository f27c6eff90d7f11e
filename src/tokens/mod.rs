//! Token resolution
//!
//! Tokens are the base layer everything else reads. Resolution happens
//! in three steps: theme layers deep-merge under the declared
//! `merge_order` (`merge`), reference expressions and color transforms
//! resolve against the merged tree (`graph`, `transform`), and the
//! frozen [`TokenGraph`] is handed to every downstream stage.

pub mod graph;
pub mod merge;
pub mod transform;

pub use graph::{ResolvedToken, TokenGraph, TokenId};
pub use merge::{deep_merge, merge_theme_layers};
pub use transform::{apply_transform, parse_color, ColorTransform, TransformError};
