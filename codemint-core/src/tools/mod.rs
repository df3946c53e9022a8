//! Tool profiles - where and how catalog items land for each AI coding tool
//!
//! Every supported tool owns a directory layout for rules and skills and,
//! optionally, a wrapping rule for file content. The layouts are enumerated
//! per tool rather than derived from one formula:
//!
//! ```text
//! cursor    .cursor/rules/<slug>.mdc              .cursor/skills/<slug>/SKILL.md
//! cline     .cline/rules/<slug>.md                .cline/skills/<slug>/SKILL.md
//! copilot   .github/instructions/<slug>.instructions.md
//!           .github/instructions/skills/skill-<slug>.instructions.md
//! windsurf, continue, claude, codex
//!           <dir>/rules/<slug>.md                 <dir>/skills/skill-<slug>.md
//! ```
//!
//! Profiles are resolved once from a [`ToolId`] through [`profile`]; call
//! sites never branch on tool names themselves.

mod copilot;
mod cursor;
pub mod detect;
mod generic;
pub mod stack;
pub mod types;

pub use copilot::CopilotProfile;
pub use cursor::{ensure_front_matter, has_front_matter, CursorProfile};
pub use detect::{detect, scaffold, ToolDetector, DETECTION_ORDER};
pub use generic::{GenericProfile, SkillLayout};
pub use stack::{stack_tags, TECH_MARKERS};
pub use types::{ArtifactKind, ToolId};

use crate::error::Result;

/// Path and content conventions of one AI coding tool
pub trait ToolProfile: Send + Sync {
    /// The tool this profile describes
    fn tool(&self) -> ToolId;

    /// Project-relative, `/`-separated destination for an artifact
    fn relative_path(&self, kind: ArtifactKind, slug: &str) -> String;

    /// Final file content for an artifact. Must be idempotent.
    fn render(&self, kind: ArtifactKind, content: &str, title: &str) -> String;

    /// Directories created when the tool is chosen for a project with no markers
    fn scaffold_dirs(&self) -> Vec<String> {
        vec![self.tool().base_dir().to_string()]
    }
}

static CURSOR: CursorProfile = CursorProfile;
static COPILOT: CopilotProfile = CopilotProfile;
static CLINE: GenericProfile = GenericProfile::new(ToolId::Cline, SkillLayout::Nested);
static WINDSURF: GenericProfile = GenericProfile::new(ToolId::Windsurf, SkillLayout::Prefixed);
static CONTINUE: GenericProfile = GenericProfile::new(ToolId::Continue, SkillLayout::Prefixed);
static CLAUDE: GenericProfile = GenericProfile::new(ToolId::Claude, SkillLayout::Prefixed);
static CODEX: GenericProfile = GenericProfile::new(ToolId::Codex, SkillLayout::Prefixed);

/// Look up the profile for a tool
pub fn profile(tool: ToolId) -> &'static dyn ToolProfile {
    match tool {
        ToolId::Cursor => &CURSOR,
        ToolId::Copilot => &COPILOT,
        ToolId::Cline => &CLINE,
        ToolId::Windsurf => &WINDSURF,
        ToolId::Continue => &CONTINUE,
        ToolId::Claude => &CLAUDE,
        ToolId::Codex => &CODEX,
    }
}

/// Destination path for an artifact, by tool identifier
///
/// Fails with `ConfigurationError` for an unknown tool identifier.
pub fn path_for(tool_id: &str, kind: ArtifactKind, slug: &str) -> Result<String> {
    let tool: ToolId = tool_id.parse()?;
    Ok(profile(tool).relative_path(kind, slug))
}

/// Rendered file content for an artifact, by tool identifier
///
/// Fails with `ConfigurationError` for an unknown tool identifier.
pub fn render_content(tool_id: &str, kind: ArtifactKind, content: &str, title: &str) -> Result<String> {
    let tool: ToolId = tool_id.parse()?;
    Ok(profile(tool).render(kind, content, title))
}
