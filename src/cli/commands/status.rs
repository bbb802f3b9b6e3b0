//! Sync status display.
//!
//! Shows the per-document source state and the lazily-materialized
//! target view for every enabled locale, plus aggregate counts of
//! pending work.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::engine::TargetView;
use crate::error::Result;
use crate::model::{SourceStatus, TargetStatus};

use super::CommandContext;

#[derive(Serialize)]
struct StatusOutput {
    project_id: String,
    source_locale: String,
    target_locales: Vec<String>,
    documents: Vec<DocumentStatus>,
    pending_uploads: usize,
    pending_downloads: usize,
}

#[derive(Serialize)]
struct DocumentStatus {
    local_ref: String,
    source_status: String,
    job_id: Option<String>,
    targets: Vec<TargetView>,
}

/// Execute the status command.
///
/// # Errors
///
/// Propagates storage errors.
pub fn execute(db: Option<&PathBuf>, actor: Option<&str>, json: bool) -> Result<()> {
    let mut ctx = CommandContext::open(db.map(PathBuf::as_path), actor)?;
    let documents = ctx.storage.list_documents()?;

    let mut output = StatusOutput {
        project_id: ctx.config.project_id.clone(),
        source_locale: ctx.config.source_locale.clone(),
        target_locales: ctx.config.target_locales.clone(),
        documents: Vec::with_capacity(documents.len()),
        pending_uploads: 0,
        pending_downloads: 0,
    };

    for doc in &documents {
        let targets = ctx.engine().effective_targets(doc)?;
        if matches!(
            doc.source_status,
            SourceStatus::Untracked | SourceStatus::Edited | SourceStatus::Error
        ) {
            output.pending_uploads += 1;
        }
        output.pending_downloads += targets
            .iter()
            .filter(|t| t.status == TargetStatus::Ready)
            .count();
        output.documents.push(DocumentStatus {
            local_ref: doc.local_ref.clone(),
            source_status: doc.source_status.to_string(),
            job_id: doc.job_id.clone(),
            targets,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Sync Status".bold().underline());
    println!();
    println!(
        "Project {} ({} -> {})",
        output.project_id,
        output.source_locale,
        output.target_locales.join(", ")
    );
    println!();

    if output.documents.is_empty() {
        println!("{}", "No tracked documents.".dimmed());
        return Ok(());
    }

    for doc in &output.documents {
        let status = match doc.source_status.as_str() {
            "current" => doc.source_status.green(),
            "error" => doc.source_status.red(),
            "edited" | "importing" => doc.source_status.yellow(),
            _ => doc.source_status.normal(),
        };
        println!("{:30} {}", doc.local_ref, status);
        for target in &doc.targets {
            let shown = match target.status {
                TargetStatus::Current => target.status.to_string().green(),
                TargetStatus::Ready => target.status.to_string().cyan(),
                TargetStatus::Error => target.status.to_string().red(),
                TargetStatus::Disabled => target.status.to_string().dimmed(),
                _ => target.status.to_string().normal(),
            };
            println!("    {:8} {shown}", target.locale);
        }
    }

    println!();
    if output.pending_uploads > 0 {
        println!(
            "{}",
            format!("{} document(s) need upload or re-send.", output.pending_uploads).yellow()
        );
    }
    if output.pending_downloads > 0 {
        println!(
            "{}",
            format!(
                "{} translation(s) ready; run `locsync target download`.",
                output.pending_downloads
            )
            .cyan()
        );
    }
    if output.pending_uploads == 0 && output.pending_downloads == 0 {
        println!("{}", "Everything is in sync.".green());
    }
    Ok(())
}
