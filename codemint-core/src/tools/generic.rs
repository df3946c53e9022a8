//! Generic profile shared by tools that keep plain markdown under `rules/` and `skills/`

use super::{ArtifactKind, ToolId, ToolProfile};

/// How a tool lays out skill files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLayout {
    /// `skills/<slug>/SKILL.md`
    Nested,
    /// `skills/skill-<slug>.md`
    Prefixed,
}

/// Profile for tools whose content is written verbatim
pub struct GenericProfile {
    tool: ToolId,
    skills: SkillLayout,
}

impl GenericProfile {
    pub const fn new(tool: ToolId, skills: SkillLayout) -> Self {
        Self { tool, skills }
    }
}

impl ToolProfile for GenericProfile {
    fn tool(&self) -> ToolId {
        self.tool
    }

    fn relative_path(&self, kind: ArtifactKind, slug: &str) -> String {
        let base = self.tool.base_dir();
        match (kind, self.skills) {
            (ArtifactKind::Rule, _) => format!("{base}/rules/{slug}.md"),
            (ArtifactKind::Skill, SkillLayout::Nested) => format!("{base}/skills/{slug}/SKILL.md"),
            (ArtifactKind::Skill, SkillLayout::Prefixed) => {
                format!("{base}/skills/skill-{slug}.md")
            }
        }
    }

    fn render(&self, _kind: ArtifactKind, content: &str, _title: &str) -> String {
        content.to_string()
    }
}
