//! Tool commands: detect, init, and the interactive tool prompt

use anyhow::{bail, Context, Result};
use std::io::{self, Write};

use codemint_core::tools::{self, ToolId};

use crate::Project;

pub fn execute_detect(project: &Project) -> Result<()> {
    match tools::detect(&project.root)? {
        Some(tool) => println!("{} ({})", tool, tool.display_name()),
        None => println!("none"),
    }
    Ok(())
}

pub fn execute_init(project: &Project, tool: ToolId) -> Result<()> {
    let created = tools::scaffold(&project.root, tool)
        .with_context(|| format!("Failed to set up {}", tool.display_name()))?;

    if created.is_empty() {
        println!("{} is already set up in this project.", tool.display_name());
    } else {
        for dir in created {
            println!("Created {}", dir.display());
        }
    }
    Ok(())
}

/// Ask which tool to install for when the project has no markers
pub fn prompt_for_tool() -> Result<ToolId> {
    println!("No AI tool folder detected in this project. Which tool do you use?");
    for (i, tool) in ToolId::ALL.iter().enumerate() {
        println!("  {}) {}", i + 1, tool.display_name());
    }
    print!("Choose [1-{}]: ", ToolId::ALL.len());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    parse_tool_choice(&input)
}

/// Accept a menu number or a tool id
fn parse_tool_choice(input: &str) -> Result<ToolId> {
    let input = input.trim();
    if input.is_empty() {
        bail!("No tool selected");
    }

    if let Ok(choice) = input.parse::<usize>() {
        return match choice.checked_sub(1).and_then(|i| ToolId::ALL.get(i)) {
            Some(tool) => Ok(*tool),
            None => bail!("Choice must be between 1 and {}", ToolId::ALL.len()),
        };
    }

    Ok(input.parse::<ToolId>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_choice() {
        assert_eq!(parse_tool_choice("1\n").unwrap(), ToolId::Cursor);
        assert_eq!(parse_tool_choice("7").unwrap(), ToolId::Codex);
        assert_eq!(parse_tool_choice(" windsurf ").unwrap(), ToolId::Windsurf);
        assert!(parse_tool_choice("0").is_err());
        assert!(parse_tool_choice("8").is_err());
        assert!(parse_tool_choice("").is_err());
        assert!(parse_tool_choice("emacs").is_err());
    }
}
