//! Document lifecycle commands.
//!
//! - `locsync document upload <ref>` - first upload (or retry)
//! - `locsync document update <ref>` - re-send edited content
//! - `locsync document check <ref>` - re-query import progress
//! - `locsync document refresh [<ref>|--all]` - local-edit detection
//! - `locsync document clear <ref>` - full reset
//! - `locsync document show/list` - inspection
//! - `locsync document set-job/set-profile` - grouping and policy

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::DocumentCommands;
use crate::engine::{CommandOutcome, TargetView};
use crate::error::{Error, Result};
use crate::model::Document;
use crate::validate;

use super::{format_timestamp, print_outcome, CommandContext};

#[derive(Serialize)]
struct DocumentOutput {
    id: String,
    local_ref: String,
    kind: String,
    source_locale: String,
    source_status: String,
    remote_id: Option<String>,
    job_id: Option<String>,
    profile_id: Option<String>,
    last_uploaded_at: Option<String>,
    last_updated_at: Option<String>,
    targets: Vec<TargetView>,
}

impl DocumentOutput {
    fn new(doc: &Document, targets: Vec<TargetView>) -> Self {
        Self {
            id: doc.id.clone(),
            local_ref: doc.local_ref.clone(),
            kind: doc.kind.as_str().to_string(),
            source_locale: doc.source_locale.clone(),
            source_status: doc.source_status.to_string(),
            remote_id: doc.remote_id.clone(),
            job_id: doc.job_id.clone(),
            profile_id: doc.profile_id.clone(),
            last_uploaded_at: doc.last_uploaded_at.map(format_timestamp),
            last_updated_at: doc.last_updated_at.map(format_timestamp),
            targets,
        }
    }
}

/// Execute a document command.
///
/// # Errors
///
/// Propagates engine and storage errors.
pub fn execute(
    command: &DocumentCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut ctx = CommandContext::open(db.map(PathBuf::as_path), actor)?;

    match command {
        DocumentCommands::Upload { local_ref, job } => {
            let outcome = ctx.engine().upload(local_ref)?;
            if let Some(job_id) = job {
                validate::job_id(job_id)?;
                if let Some(mut doc) = ctx.storage.get_document(local_ref)? {
                    let actor = ctx.actor.clone();
                    ctx.storage.set_job(&mut doc, Some(job_id.as_str()), &actor)?;
                }
            }
            print_outcome(&outcome, json)
        }
        DocumentCommands::Update { local_ref } => {
            let outcome = ctx.engine().update(local_ref)?;
            print_outcome(&outcome, json)
        }
        DocumentCommands::Check { local_ref } => {
            let outcome = ctx.engine().check_upload(local_ref)?;
            print_outcome(&outcome, json)
        }
        DocumentCommands::Refresh { local_ref, all } => {
            execute_refresh(&mut ctx, local_ref.as_deref(), *all, json)
        }
        DocumentCommands::Clear { local_ref } => {
            let mut doc = ctx
                .storage
                .get_document(local_ref)?
                .ok_or_else(|| Error::DocumentNotFound {
                    local_ref: local_ref.clone(),
                })?;
            let actor = ctx.actor.clone();
            ctx.storage.clear_document(&mut doc, &actor)?;
            print_outcome(
                &CommandOutcome {
                    performed: true,
                    messages: vec![format!("cleared tracking for '{local_ref}'")],
                },
                json,
            )
        }
        DocumentCommands::Show { local_ref } => execute_show(&mut ctx, local_ref, json),
        DocumentCommands::List => execute_list(&ctx, json),
        DocumentCommands::SetJob {
            local_ref,
            job,
            clear,
        } => {
            let mut doc = ctx
                .storage
                .get_document(local_ref)?
                .ok_or_else(|| Error::DocumentNotFound {
                    local_ref: local_ref.clone(),
                })?;
            let job = match (job, clear) {
                (Some(id), false) => Some(validate::job_id(id)?),
                (None, true) => None,
                _ => {
                    return Err(Error::InvalidArgument(
                        "provide a job id or --clear".to_string(),
                    ))
                }
            };
            let actor = ctx.actor.clone();
            ctx.storage.set_job(&mut doc, job, &actor)?;
            let text = match job {
                Some(id) => format!("assigned '{local_ref}' to job '{id}'"),
                None => format!("removed job assignment from '{local_ref}'"),
            };
            print_outcome(
                &CommandOutcome {
                    performed: true,
                    messages: vec![text],
                },
                json,
            )
        }
        DocumentCommands::SetProfile {
            local_ref,
            profile,
            clear,
        } => {
            let mut doc = ctx
                .storage
                .get_document(local_ref)?
                .ok_or_else(|| Error::DocumentNotFound {
                    local_ref: local_ref.clone(),
                })?;
            let profile_id = match (profile, clear) {
                (Some(name), false) => {
                    let profile = ctx
                        .storage
                        .get_profile_by_name(name)?
                        .ok_or_else(|| Error::ProfileNotFound { id: name.clone() })?;
                    Some(profile.id)
                }
                (None, true) => None,
                _ => {
                    return Err(Error::InvalidArgument(
                        "provide a profile name or --clear".to_string(),
                    ))
                }
            };
            let actor = ctx.actor.clone();
            ctx.storage
                .set_document_profile(&mut doc, profile_id.as_deref(), &actor)?;
            let text = match &profile_id {
                Some(_) => format!("assigned profile to '{local_ref}'"),
                None => format!("removed profile from '{local_ref}'"),
            };
            print_outcome(
                &CommandOutcome {
                    performed: true,
                    messages: vec![text],
                },
                json,
            )
        }
    }
}

fn execute_refresh(
    ctx: &mut CommandContext,
    local_ref: Option<&str>,
    all: bool,
    json: bool,
) -> Result<()> {
    match (local_ref, all) {
        (Some(local_ref), false) => {
            let outcome = ctx.engine().refresh(local_ref)?;
            print_outcome(&outcome, json)
        }
        (None, true) => {
            let refs: Vec<String> = ctx
                .storage
                .list_documents()?
                .into_iter()
                .map(|d| d.local_ref)
                .collect();
            let mut combined = CommandOutcome {
                performed: false,
                messages: Vec::new(),
            };
            for local_ref in refs {
                match ctx.engine().refresh(&local_ref) {
                    Ok(outcome) => {
                        combined.performed |= outcome.performed;
                        for message in outcome.messages {
                            combined.messages.push(format!("{local_ref}: {message}"));
                        }
                    }
                    Err(e) => combined.messages.push(format!("{local_ref}: {e}")),
                }
            }
            if combined.messages.is_empty() {
                combined.messages.push("no tracked documents".to_string());
            }
            print_outcome(&combined, json)
        }
        _ => Err(Error::InvalidArgument(
            "provide a document reference or --all".to_string(),
        )),
    }
}

fn execute_show(ctx: &mut CommandContext, local_ref: &str, json: bool) -> Result<()> {
    let doc = ctx
        .storage
        .get_document(local_ref)?
        .ok_or_else(|| Error::DocumentNotFound {
            local_ref: local_ref.to_string(),
        })?;
    let targets = ctx.engine().effective_targets(&doc)?;
    let output = DocumentOutput::new(&doc, targets);

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    if crate::is_silent() {
        println!("{}", doc.id);
        return Ok(());
    }

    println!("{}", output.local_ref.bold());
    println!("  Kind:      {}", output.kind);
    println!("  Source:    {} ({})", output.source_status, output.source_locale);
    println!(
        "  Remote:    {}",
        output.remote_id.as_deref().unwrap_or("-")
    );
    if let Some(job) = &output.job_id {
        println!("  Job:       {job}");
    }
    if let Some(uploaded) = &output.last_uploaded_at {
        println!("  Uploaded:  {uploaded}");
    }
    if let Some(updated) = &output.last_updated_at {
        println!("  Updated:   {updated}");
    }
    println!("  Targets:");
    for target in &output.targets {
        let marker = if target.requested { "*" } else { " " };
        println!("    {marker} {:8} {}", target.locale, target.status);
    }
    Ok(())
}

fn execute_list(ctx: &CommandContext, json: bool) -> Result<()> {
    let documents = ctx.storage.list_documents()?;

    if json {
        let output: Vec<serde_json::Value> = documents
            .iter()
            .map(|d| {
                serde_json::json!({
                    "local_ref": d.local_ref,
                    "kind": d.kind.as_str(),
                    "source_status": d.source_status.as_str(),
                    "remote_id": d.remote_id,
                    "job_id": d.job_id,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if documents.is_empty() {
        println!("{}", "No tracked documents.".dimmed());
        return Ok(());
    }
    for doc in documents {
        println!(
            "{:10} {:30} {}",
            doc.source_status.as_str(),
            doc.local_ref,
            doc.job_id.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
