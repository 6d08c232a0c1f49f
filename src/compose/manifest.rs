//! Binaries manifest parsing.
//!
//! The manifest is either a list of paths (each copied under its file name)
//! or an object mapping the destination name to a path:
//!
//! ```json
//! ["bins/a.bin", "bins/b.bin"]
//! {"a.bin": "bins/a.bin", "renamed": "/abs/b.bin"}
//! ```

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::DOCKERFILE_NAME;

/// One binary to package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// File name inside the build context.
    pub name: String,
    /// Source path as written in the manifest.
    pub path: PathBuf,
}

/// Read and validate a manifest file.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    if !path.is_file() {
        bail!("JSON file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to read JSON {}", path.display()))?;
    parse_manifest(&value)
}

/// Validate the manifest shape and flatten it to entries, preserving order.
pub fn parse_manifest(value: &Value) -> Result<Vec<ManifestEntry>> {
    let entries = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let Some(p) = item.as_str() else {
                    bail!("JSON list items must be strings (file paths)");
                };
                let path = PathBuf::from(p);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .with_context(|| format!("Cannot derive a file name from '{}'", p))?;
                Ok(ManifestEntry { name, path })
            })
            .collect::<Result<Vec<_>>>()?,
        Value::Object(map) => map
            .iter()
            .map(|(name, v)| {
                let Some(p) = v.as_str() else {
                    bail!("JSON object values must be strings (file paths)");
                };
                Ok(ManifestEntry {
                    name: name.clone(),
                    path: PathBuf::from(p),
                })
            })
            .collect::<Result<Vec<_>>>()?,
        _ => bail!("JSON must be an array (list of paths) or an object mapping names to paths"),
    };

    let mut seen = HashSet::new();
    for entry in &entries {
        validate_name(&entry.name)?;
        if !seen.insert(entry.name.as_str()) {
            bail!("Duplicate binary name '{}' in manifest", entry.name);
        }
    }
    Ok(entries)
}

/// Destination names must stay inside the build context and not collide
/// with the recipe.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("Invalid binary name '{}': must be a plain file name", name);
    }
    if name == DOCKERFILE_NAME {
        bail!("Invalid binary name '{}': reserved for the build recipe", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_uses_file_names() {
        let entries = parse_manifest(&json!(["bins/a.bin", "/abs/b"])).unwrap();
        assert_eq!(
            entries,
            vec![
                ManifestEntry {
                    name: "a.bin".into(),
                    path: "bins/a.bin".into()
                },
                ManifestEntry {
                    name: "b".into(),
                    path: "/abs/b".into()
                },
            ]
        );
    }

    #[test]
    fn test_object_preserves_order() {
        let value: Value =
            serde_json::from_str(r#"{"zeta": "z.bin", "alpha": "a.bin"}"#).unwrap();
        let names: Vec<_> = parse_manifest(&value)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn test_wrong_shapes_rejected() {
        let err = parse_manifest(&json!(["ok", 3])).unwrap_err();
        assert!(err.to_string().contains("list items must be strings"));

        let err = parse_manifest(&json!({"a": ["nested"]})).unwrap_err();
        assert!(err.to_string().contains("object values must be strings"));

        let err = parse_manifest(&json!("just a string")).unwrap_err();
        assert!(err.to_string().contains("must be an array"));
    }

    #[test]
    fn test_escaping_names_rejected() {
        assert!(parse_manifest(&json!({"../evil": "a.bin"})).is_err());
        assert!(parse_manifest(&json!({"": "a.bin"})).is_err());
        assert!(parse_manifest(&json!([".."])).is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = parse_manifest(&json!(["x/a.bin", "y/a.bin"])).unwrap_err();
        assert!(err.to_string().contains("Duplicate binary name 'a.bin'"));
    }

    #[test]
    fn test_recipe_name_reserved() {
        let err = parse_manifest(&json!({"Dockerfile": "b"})).unwrap_err();
        assert!(err.to_string().contains("reserved"));
        assert!(parse_manifest(&json!(["bins/Dockerfile"])).is_err());
    }

    #[test]
    fn test_empty_manifest_is_valid() {
        assert!(parse_manifest(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_load_reports_malformed_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bins.json");
        fs::write(&path, "[\"a\",").unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read JSON"));

        let err = load_manifest(&tmp.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
