//! Job grouping commands.
//!
//! - `locsync job list` - jobs with member counts
//! - `locsync job show <id>` - member documents by kind
//! - `locsync job rebuild` - regenerate the derived index

use std::path::PathBuf;

use colored::Colorize;

use crate::cli::JobCommands;
use crate::error::Result;
use crate::jobs;

use super::CommandContext;

/// Execute a job command.
///
/// # Errors
///
/// Propagates storage errors.
pub fn execute(
    command: &JobCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let ctx = CommandContext::open(db.map(PathBuf::as_path), actor)?;

    match command {
        JobCommands::List => {
            let entries = jobs::list(&ctx.storage)?;
            if json {
                let output: Vec<serde_json::Value> = entries
                    .iter()
                    .map(|(job, count)| serde_json::json!({"job_id": job, "documents": count}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if entries.is_empty() {
                println!("{}", "No jobs assigned.".dimmed());
            } else {
                for (job, count) in entries {
                    println!("{job:24} {count} document(s)");
                }
            }
            Ok(())
        }
        JobCommands::Show { job_id } => {
            let members = jobs::members(&ctx.storage, job_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&members)?);
                return Ok(());
            }
            if members.is_empty() {
                println!("{}", format!("No documents in job '{job_id}'.").dimmed());
                return Ok(());
            }
            println!("{}", job_id.bold());
            if !members.content_refs.is_empty() {
                println!("  Content:");
                for local_ref in &members.content_refs {
                    println!("    {local_ref}");
                }
            }
            if !members.config_refs.is_empty() {
                println!("  Config:");
                for local_ref in &members.config_refs {
                    println!("    {local_ref}");
                }
            }
            Ok(())
        }
        JobCommands::Rebuild => {
            let count = jobs::rebuild(&ctx.storage)?;
            if json {
                println!("{}", serde_json::json!({"indexed": count}));
            } else {
                println!("Rebuilt job index ({count} documents indexed)");
            }
            Ok(())
        }
    }
}
