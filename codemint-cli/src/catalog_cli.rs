//! Catalog commands: install, sync, list, remove, search, suggest

use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use codemint_core::catalog::{ItemType, SearchParams};
use codemint_core::sync::SyncStatus;
use codemint_core::tools::{self, ToolId};

use crate::tool_cli::prompt_for_tool;
use crate::Project;

pub async fn execute_install(project: &Project, reference: &str, tool: Option<ToolId>) -> Result<()> {
    // Ask before touching the network so a bad answer costs nothing
    let tool = match tool {
        Some(tool) => Some(tool),
        None => match tools::detect(&project.root)? {
            Some(_) => None,
            None => Some(prompt_for_tool()?),
        },
    };

    let engine = project.engine()?;
    println!("Installing {reference}...");
    let outcome = engine
        .install(&project.root, reference, tool)
        .await
        .with_context(|| format!("Failed to install {reference}"))?;

    for dir in &outcome.scaffolded {
        println!("Created {}", dir.display());
    }
    println!(
        "Installed {} v{} for {} -> {}",
        outcome.entry.reference,
        outcome.entry.installed_version,
        outcome.tool.display_name(),
        outcome.entry.relative_path
    );
    if outcome.deprecated {
        println!();
        println!("WARNING: {} is deprecated!", outcome.entry.reference);
    }
    Ok(())
}

pub async fn execute_sync(project: &Project, json_output: bool) -> Result<()> {
    let engine = project.engine()?;
    let report = engine.sync(&project.root).await.context("Sync failed")?;

    if json_output {
        let output = serde_json::json!({
            "summary": report.summary(),
            "syncedAt": report.synced_at,
            "outcomes": report.outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if report.outcomes.is_empty() {
        println!("Nothing installed. Use `codemint install @rule/<slug>` first.");
        return Ok(());
    } else {
        for outcome in &report.outcomes {
            match &outcome.status {
                SyncStatus::Updated => println!(
                    "  updated     {} v{} -> v{}",
                    outcome.reference,
                    outcome.previous_version,
                    outcome.remote_version.as_deref().unwrap_or("?")
                ),
                SyncStatus::UpToDate => {
                    println!("  up-to-date  {} v{}", outcome.reference, outcome.previous_version)
                }
                SyncStatus::SkippedNotFound => {
                    println!("  skipped     {} (no longer in the catalog)", outcome.reference)
                }
                SyncStatus::Error(message) => {
                    println!("  failed      {}: {}", outcome.reference, message)
                }
            }
        }
        println!();
        println!("{}", report.summary());
    }

    report.into_result()?;
    Ok(())
}

/// Table row for installed items
#[derive(Tabled)]
struct InstalledRow {
    #[tabled(rename = "Ref")]
    reference: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Tool")]
    tool: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Installed")]
    installed_at: String,
}

pub fn execute_list(project: &Project, json_output: bool) -> Result<()> {
    let entries = project.engine()?.list(&project.root);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No rules or skills installed.");
        return Ok(());
    }

    let rows: Vec<InstalledRow> = entries
        .iter()
        .map(|entry| InstalledRow {
            reference: entry.reference.clone(),
            version: entry.installed_version.clone(),
            tool: entry.tool.clone(),
            path: entry.relative_path.clone(),
            installed_at: entry.installed_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub fn execute_remove(project: &Project, key: &str) -> Result<()> {
    let entry = project
        .engine()?
        .remove(&project.root, key)
        .with_context(|| format!("Failed to remove '{key}'"))?;
    println!("Removed {} ({})", entry.reference, entry.relative_path);
    Ok(())
}

/// Table row for search results
#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "Ref")]
    reference: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Snippet")]
    snippet: String,
}

pub async fn execute_search(
    project: &Project,
    query: Option<String>,
    item_type: Option<ItemType>,
    tags: Vec<String>,
    page: Option<u32>,
    limit: u32,
    json_output: bool,
) -> Result<()> {
    let params = SearchParams {
        query,
        item_type,
        tags,
        page,
        limit: Some(limit),
    };
    let results = project
        .engine()?
        .search(&params)
        .await
        .context("Search failed")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.items.is_empty() {
        println!("No matching rules, skills or prompts.");
        return Ok(());
    }

    println!(
        "Found {} result(s), page {}:\n",
        results.total, results.page
    );
    let rows: Vec<SearchResultRow> = results
        .items
        .iter()
        .map(|hit| SearchResultRow {
            reference: hit.reference(),
            name: hit.name.clone(),
            version: hit.version.clone().unwrap_or_default(),
            tags: hit.tags.join(", "),
            snippet: truncate(hit.snippet.as_deref().unwrap_or(""), 50),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
    Ok(())
}

/// Table row for suggestions
#[derive(Tabled)]
struct SuggestionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Ref")]
    reference: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

pub async fn execute_suggest(project: &Project, pick: bool, json_output: bool) -> Result<()> {
    let suggestions = project
        .engine()?
        .suggest(&project.root)
        .await
        .context("Failed to fetch suggestions")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.tags.is_empty() {
        println!("No tech markers found. Try `codemint search` instead.");
        return Ok(());
    }
    println!("Detected stack: {}", suggestions.tags.join(", "));
    if suggestions.is_empty() {
        println!("No recommendations for this project.");
        return Ok(());
    }

    let rows: Vec<SuggestionRow> = suggestions
        .items
        .iter()
        .enumerate()
        .map(|(i, hit)| SuggestionRow {
            index: i + 1,
            reference: hit.reference(),
            name: hit.name.clone(),
            tags: hit.tags.join(", "),
        })
        .collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");

    if !pick {
        return Ok(());
    }
    print!("Install which? [1-{}]: ", rows.len());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let choice = parse_pick(&input, rows.len())?;

    execute_install(project, &rows[choice].reference, None).await
}

/// Zero-based index of a 1-based menu answer
fn parse_pick(input: &str, count: usize) -> Result<usize> {
    let input = input.trim();
    if input.is_empty() {
        bail!("Nothing selected");
    }
    match input.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
        Some(index) if index < count => Ok(index),
        _ => bail!("Choice must be between 1 and {count}"),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() > max_chars {
        let cut: String = single_line.chars().take(max_chars - 3).collect();
        format!("{cut}...")
    } else {
        single_line
    }
}
