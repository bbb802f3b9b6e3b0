//! Automation profile commands.
//!
//! - `locsync profile create <name>` - create a profile
//! - `locsync profile list` / `show <name>` - inspection
//! - `locsync profile set <name>` - change global flags
//! - `locsync profile override <name> <locale>` - per-locale overrides

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{ProfileCommands, ProfileCreateArgs, ProfileOverrideArgs};
use crate::error::{Error, Result};
use crate::model::{LanguageOverride, Profile};
use crate::validate;

use super::CommandContext;

#[derive(Serialize)]
struct ProfileOutput {
    id: String,
    name: String,
    auto_upload: bool,
    auto_request: bool,
    auto_download: bool,
    overrides: Vec<OverrideOutput>,
}

#[derive(Serialize)]
struct OverrideOutput {
    locale: String,
    disabled: bool,
    auto_request: Option<bool>,
    auto_download: Option<bool>,
}

impl From<&Profile> for ProfileOutput {
    fn from(profile: &Profile) -> Self {
        let overrides = profile
            .language_overrides
            .iter()
            .map(|(locale, ov)| match ov {
                LanguageOverride::Disabled => OverrideOutput {
                    locale: locale.clone(),
                    disabled: true,
                    auto_request: None,
                    auto_download: None,
                },
                LanguageOverride::Custom {
                    auto_request,
                    auto_download,
                } => OverrideOutput {
                    locale: locale.clone(),
                    disabled: false,
                    auto_request: *auto_request,
                    auto_download: *auto_download,
                },
            })
            .collect();
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            auto_upload: profile.auto_upload,
            auto_request: profile.auto_request,
            auto_download: profile.auto_download,
            overrides,
        }
    }
}

fn require_profile(ctx: &CommandContext, name: &str) -> Result<Profile> {
    ctx.storage
        .get_profile_by_name(name)?
        .ok_or_else(|| Error::ProfileNotFound {
            id: name.to_string(),
        })
}

fn print_profile(profile: &Profile, json: bool) -> Result<()> {
    let output = ProfileOutput::from(profile);
    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }
    if crate::is_silent() {
        println!("{}", profile.id);
        return Ok(());
    }
    println!("{}", output.name.bold());
    println!("  auto-upload:   {}", output.auto_upload);
    println!("  auto-request:  {}", output.auto_request);
    println!("  auto-download: {}", output.auto_download);
    if !output.overrides.is_empty() {
        println!("  Overrides:");
        for ov in &output.overrides {
            if ov.disabled {
                println!("    {:8} disabled", ov.locale);
            } else {
                println!(
                    "    {:8} request={} download={}",
                    ov.locale,
                    ov.auto_request.map_or("inherit".to_string(), |v| v.to_string()),
                    ov.auto_download.map_or("inherit".to_string(), |v| v.to_string()),
                );
            }
        }
    }
    Ok(())
}

/// Execute a profile command.
///
/// # Errors
///
/// Propagates storage errors and validation failures.
pub fn execute(
    command: &ProfileCommands,
    db: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut ctx = CommandContext::open(db.map(PathBuf::as_path), actor)?;
    let actor = ctx.actor.clone();

    match command {
        ProfileCommands::Create(args) => execute_create(&mut ctx, args, &actor, json),
        ProfileCommands::List => {
            let profiles = ctx.storage.list_profiles()?;
            if json {
                let output: Vec<ProfileOutput> = profiles.iter().map(ProfileOutput::from).collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if profiles.is_empty() {
                println!("{}", "No profiles defined.".dimmed());
            } else {
                for profile in &profiles {
                    println!(
                        "{:20} upload={} request={} download={} ({} overrides)",
                        profile.name,
                        profile.auto_upload,
                        profile.auto_request,
                        profile.auto_download,
                        profile.language_overrides.len()
                    );
                }
            }
            Ok(())
        }
        ProfileCommands::Show { name } => {
            let profile = require_profile(&ctx, name)?;
            print_profile(&profile, json)
        }
        ProfileCommands::Set {
            name,
            auto_upload,
            auto_request,
            auto_download,
        } => {
            let mut profile = require_profile(&ctx, name)?;
            if let Some(v) = auto_upload {
                profile.auto_upload = *v;
            }
            if let Some(v) = auto_request {
                profile.auto_request = *v;
            }
            if let Some(v) = auto_download {
                profile.auto_download = *v;
            }
            ctx.storage.update_profile(&profile, &actor)?;
            print_profile(&profile, json)
        }
        ProfileCommands::Override(args) => execute_override(&mut ctx, args, &actor, json),
    }
}

fn execute_create(
    ctx: &mut CommandContext,
    args: &ProfileCreateArgs,
    actor: &str,
    json: bool,
) -> Result<()> {
    validate::profile_name(&args.name)?;
    if ctx.storage.get_profile_by_name(&args.name)?.is_some() {
        return Err(Error::InvalidArgument(format!(
            "profile '{}' already exists",
            args.name
        )));
    }

    let profile = Profile::new(&args.name).with_flags(
        args.auto_upload,
        args.auto_request,
        args.auto_download,
    );
    ctx.storage.create_profile(&profile, actor)?;
    print_profile(&profile, json)
}

fn execute_override(
    ctx: &mut CommandContext,
    args: &ProfileOverrideArgs,
    actor: &str,
    json: bool,
) -> Result<()> {
    let mut profile = require_profile(ctx, &args.name)?;
    let locale = validate::normalize_locale(&args.locale)?;

    if args.remove {
        if profile.language_overrides.remove(&locale).is_none() {
            return Err(Error::InvalidArgument(format!(
                "no override for '{locale}' on profile '{}'",
                args.name
            )));
        }
    } else if args.disable {
        profile
            .language_overrides
            .insert(locale, LanguageOverride::Disabled);
    } else {
        profile.language_overrides.insert(
            locale,
            LanguageOverride::Custom {
                auto_request: args.auto_request,
                auto_download: args.auto_download,
            },
        );
    }

    ctx.storage.update_profile(&profile, actor)?;
    print_profile(&profile, json)
}
