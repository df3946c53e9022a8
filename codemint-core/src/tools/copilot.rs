//! Copilot profile: `.instructions.md` files under `.github/instructions`

use super::{ArtifactKind, ToolId, ToolProfile};

pub struct CopilotProfile;

impl ToolProfile for CopilotProfile {
    fn tool(&self) -> ToolId {
        ToolId::Copilot
    }

    fn relative_path(&self, kind: ArtifactKind, slug: &str) -> String {
        match kind {
            ArtifactKind::Rule => format!(".github/instructions/{slug}.instructions.md"),
            ArtifactKind::Skill => {
                format!(".github/instructions/skills/skill-{slug}.instructions.md")
            }
        }
    }

    fn render(&self, _kind: ArtifactKind, content: &str, _title: &str) -> String {
        content.to_string()
    }
}
