//! Document loading
//!
//! Thin shell between the file system and the engine: walks a target
//! directory for `.json`/`.yaml`/`.yml` files, decodes each into a
//! generic tree, and lifts it into a [`Document`]. The engine core
//! never touches the file system itself.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::document::Document;
use crate::error::{EngineError, EngineResult};

/// Load every DCF document under `dir`, recursively.
///
/// Results are sorted by source id for deterministic runs.
pub fn load_directory(dir: &Path) -> EngineResult<Vec<Document>> {
    if !dir.is_dir() {
        return Err(EngineError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut documents = Vec::new();
    load_recursive(dir, dir, &mut documents)?;
    documents.sort_by(|a, b| a.source_id.cmp(&b.source_id));
    Ok(documents)
}

fn load_recursive(root: &Path, current: &Path, out: &mut Vec<Document>) -> EngineResult<()> {
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false);
            if !hidden {
                load_recursive(root, &path, out)?;
            }
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if matches!(ext, "json" | "yaml" | "yml") {
                out.push(load_file(root, &path)?);
            }
        }
    }
    Ok(())
}

/// Decode one file into a [`Document`].
pub fn load_file(root: &Path, path: &Path) -> EngineResult<Document> {
    let content = fs::read_to_string(path)?;
    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml_ng::from_str(&content)?,
    };

    let source_id = path
        .strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string();
    Document::from_value(&source_id, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_directory_yaml_and_json() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tokens.yaml"),
            "dcf_version: \"1.0.0\"\nkind: tokens\ncolor:\n  accent: \"#ff0000\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("button.json"),
            r#"{"dcf_version": "1.0.0", "kind": "component", "name": "Button"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let documents = load_directory(dir.path()).unwrap();
        assert_eq!(documents.len(), 2);
        // Sorted by source id.
        assert_eq!(documents[0].kind, DocumentKind::Component);
        assert_eq!(documents[1].kind, DocumentKind::Tokens);
        assert_eq!(documents[1].body["color"]["accent"], "#ff0000");
    }

    #[test]
    fn test_load_directory_skips_hidden_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".cache")).unwrap();
        fs::write(
            dir.path().join(".cache/stale.yaml"),
            "dcf_version: \"1.0.0\"\nkind: tokens\n",
        )
        .unwrap();

        let documents = load_directory(dir.path()).unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn test_load_directory_missing_dir_errors() {
        let result = load_directory(Path::new("/nonexistent/designs"));
        assert!(matches!(result, Err(EngineError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_load_file_unknown_kind_is_structural_error() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("weird.yaml"),
            "dcf_version: \"1.0.0\"\nkind: widget\n",
        )
        .unwrap();
        let result = load_directory(dir.path());
        assert!(matches!(result, Err(EngineError::UnknownKind { .. })));
    }
}
