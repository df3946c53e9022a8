//! Technology tags inferred from a project's build files
//!
//! Used to ask the catalog for rules and skills that fit the project. Tags are
//! collected from marker files first, then from `package.json` dependencies,
//! de-duplicated in first-seen order.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Marker files and the tags their presence implies
pub const TECH_MARKERS: &[(&str, &[&str])] = &[
    ("package.json", &["node", "javascript"]),
    ("tsconfig.json", &["typescript"]),
    ("next.config.js", &["nextjs"]),
    ("next.config.mjs", &["nextjs"]),
    ("next.config.ts", &["nextjs"]),
    ("requirements.txt", &["python"]),
    ("pyproject.toml", &["python"]),
    ("Cargo.toml", &["rust"]),
    ("go.mod", &["go"]),
];

/// npm packages that imply a tag
const PACKAGE_TAGS: &[(&str, &str)] = &[
    ("next", "nextjs"),
    ("react", "react"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("typescript", "typescript"),
    ("tailwindcss", "tailwind"),
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageJson {
    fn depends_on(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }
}

/// Tags describing the project at `root`; empty when nothing is recognized
pub fn stack_tags(root: &Path) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut add = |tag: &str| {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    };

    for &(file, implied) in TECH_MARKERS {
        if root.join(file).is_file() {
            for &tag in implied {
                add(tag);
            }
        }
    }

    if let Some(package) = read_package_json(root) {
        for &(name, tag) in PACKAGE_TAGS {
            if package.depends_on(name) {
                add(tag);
            }
        }
    }

    debug!(tags = ?tags, "Derived stack tags");
    tags
}

/// `package.json`, if present and parseable
fn read_package_json(root: &Path) -> Option<PackageJson> {
    let path = root.join("package.json");
    let raw = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(package) => Some(package),
        Err(e) => {
            debug!(path = %path.display(), "Ignoring unparseable package.json: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_project_has_no_tags() {
        let temp = TempDir::new().unwrap();
        assert!(stack_tags(temp.path()).is_empty());
    }

    #[test]
    fn test_marker_files_in_table_order() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module x").unwrap();
        fs::write(temp.path().join("pyproject.toml"), "").unwrap();
        fs::write(temp.path().join("requirements.txt"), "").unwrap();
        fs::write(temp.path().join("Cargo.toml"), "").unwrap();

        assert_eq!(stack_tags(temp.path()), vec!["python", "rust", "go"]);
    }

    #[test]
    fn test_package_dependencies_add_framework_tags() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("tsconfig.json"), "{}").unwrap();
        fs::write(temp.path().join("next.config.mjs"), "").unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{
                "dependencies": {"next": "14.0.0", "react": "18.2.0"},
                "devDependencies": {"typescript": "5.4.0", "tailwindcss": "3.4.0"}
            }"#,
        )
        .unwrap();

        assert_eq!(
            stack_tags(temp.path()),
            vec!["node", "javascript", "typescript", "nextjs", "react", "tailwind"]
        );
    }

    #[test]
    fn test_malformed_package_json_keeps_marker_tags() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{ not json").unwrap();

        assert_eq!(stack_tags(temp.path()), vec!["node", "javascript"]);
    }

    #[test]
    fn test_marker_directory_is_not_a_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("go.mod")).unwrap();
        assert!(stack_tags(temp.path()).is_empty());
    }
}
