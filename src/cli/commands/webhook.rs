//! Webhook dispatch command.
//!
//! Reads one JSON notification payload (file or stdin), routes it
//! through the engine, and prints the structured response. The command
//! exits successfully even for unknown documents or foreign projects,
//! matching the HTTP contract: the TMS must never see the host as
//! unreachable.

use std::io::Read;
use std::path::PathBuf;

use crate::cli::WebhookArgs;
use crate::error::Result;
use crate::notify::{dispatch, Notification, WebhookResponse};

use super::CommandContext;

/// Execute the webhook command.
///
/// # Errors
///
/// Returns an error for an unreadable or malformed payload, or on
/// local storage failure. Remote-state conditions are reported in the
/// response body instead.
pub fn execute(
    args: &WebhookArgs,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let raw = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let notification = Notification::from_json(&raw)?;

    let mut ctx = CommandContext::open(db.map(PathBuf::as_path), actor)?;
    let project_id = ctx.config.project_id.clone();
    let outcome = dispatch(&mut ctx.engine(), &notification, Some(&project_id))?;
    let response = WebhookResponse::from(outcome);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        for message in &response.messages {
            println!("{message}");
        }
        if !response.result.request_translations.is_empty() {
            println!(
                "requested: {}",
                response.result.request_translations.join(", ")
            );
        }
        if response.result.download {
            println!("download performed");
        }
    }
    Ok(())
}
