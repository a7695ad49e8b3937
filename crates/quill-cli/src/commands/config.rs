use quill_core::config::{normalize_base_url, API_URL_ENV, DEFAULT_API_BASE_URL};
use quill_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::commands::common::CommandContext;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(
    command: ConfigCommands,
    global_profile: Option<&str>,
    global_api_url: Option<&str>,
) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_url,
            timeout_secs,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            api_url.or_else(|| global_api_url.map(str::to_string)),
            timeout_secs,
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile, global_api_url),
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn run_config_init(
    profile_name: Option<&str>,
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing_url = config
        .profile(&profile_name)
        .and_then(|profile| profile.api_base_url());

    let merged_api_url = resolve_init_api_url(
        normalize_text_option(api_url),
        normalize_text_option(std::env::var(API_URL_ENV).ok()),
        existing_url,
    )?;

    let profile = config.profile_mut_or_default(&profile_name);
    profile.api_base_url = Some(merged_api_url.clone());
    if timeout_secs.is_some() {
        profile.request_timeout_secs = timeout_secs;
    }
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    println!(
        "Backend: {merged_api_url}. Run `quill auth login --email <email> --password <password>`."
    );
    Ok(())
}

/// Explicit value, then environment, then the profile's current value, then
/// the local default. The result is validated and normalized.
pub fn resolve_init_api_url(
    explicit: Option<String>,
    env_value: Option<String>,
    existing: Option<String>,
) -> Result<String, CliError> {
    let chosen = explicit
        .or(env_value)
        .or(existing)
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    Ok(normalize_base_url(chosen)?)
}

fn run_config_show(profile: Option<&str>, api_url: Option<&str>) -> Result<(), CliError> {
    let context = CommandContext::resolve(profile, api_url)?;
    println!("profile: {}", context.profile_name);
    println!("api_base_url: {}", context.config.api_base_url);
    println!(
        "request_timeout: {}s",
        context.config.request_timeout.as_secs()
    );
    Ok(())
}
