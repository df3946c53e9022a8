//! Cursor profile: `.mdc` rules with front-matter, nested skills

use super::{ArtifactKind, ToolId, ToolProfile};

/// Cursor stores rules as `.mdc` files that need front-matter to be picked up
pub struct CursorProfile;

impl ToolProfile for CursorProfile {
    fn tool(&self) -> ToolId {
        ToolId::Cursor
    }

    fn relative_path(&self, kind: ArtifactKind, slug: &str) -> String {
        match kind {
            ArtifactKind::Rule => format!(".cursor/rules/{slug}.mdc"),
            ArtifactKind::Skill => format!(".cursor/skills/{slug}/SKILL.md"),
        }
    }

    fn render(&self, kind: ArtifactKind, content: &str, title: &str) -> String {
        match kind {
            ArtifactKind::Rule => ensure_front_matter(content, title),
            ArtifactKind::Skill => content.to_string(),
        }
    }

    fn scaffold_dirs(&self) -> Vec<String> {
        vec![
            ".cursor".to_string(),
            ".cursor/rules".to_string(),
            ".cursor/skills".to_string(),
        ]
    }
}

/// Whether content already opens with a front-matter fence
pub fn has_front_matter(content: &str) -> bool {
    content.trim_start().starts_with("---")
}

/// Prepend front-matter unless the content already carries some
pub fn ensure_front_matter(content: &str, title: &str) -> String {
    if has_front_matter(content) {
        return content.to_string();
    }
    let description = title.replace('"', "\\\"");
    format!("---\ndescription: \"{description}\"\nalwaysApply: true\n---\n\n{content}")
}
