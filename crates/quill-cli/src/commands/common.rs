use chrono::{DateTime, TimeZone};
use quill_core::auth::SessionPersistence;
use quill_core::config::API_URL_ENV;
use quill_core::dashboard::{CategoryGroup, NoteCard};
use quill_core::{AuthSession, Category, CategoryId, ClientConfig, Error, Note, NoteId};
use serde::Serialize;

use crate::auth::{open_session, KeychainSessionStore};
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub type Session = AuthSession<KeychainSessionStore>;

/// Profile and backend resolved from global flags, environment and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub profile_name: String,
    pub config: ClientConfig,
}

impl CommandContext {
    pub fn resolve(profile: Option<&str>, api_url: Option<&str>) -> Result<Self, CliError> {
        let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = profiles.resolve_profile_name(profile);
        let config = client_config_from(
            api_url,
            std::env::var(API_URL_ENV).ok(),
            profiles.profile(&profile_name),
        )?;
        tracing::debug!(
            profile = %profile_name,
            api = %config.api_base_url,
            timeout_secs = config.request_timeout.as_secs(),
            "resolved command context"
        );
        Ok(Self {
            profile_name,
            config,
        })
    }

    pub fn session(&self) -> Result<Session, CliError> {
        Ok(open_session(&self.profile_name, &self.config)?)
    }
}

/// Backend URL from the flag, then the environment, then the profile. The
/// profile's timeout replaces the default when set.
pub fn client_config_from(
    api_url: Option<&str>,
    env_url: Option<String>,
    profile: Option<&CliProfile>,
) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::resolve_from(
        api_url.map(str::to_string),
        env_url,
        profile.and_then(CliProfile::api_base_url),
    )?;
    if let Some(timeout) = profile.and_then(CliProfile::request_timeout) {
        config = config.with_request_timeout(timeout);
    }
    Ok(config)
}

/// Protected commands start here.
pub async fn require_signed_in<S: SessionPersistence>(
    session: &AuthSession<S>,
) -> Result<(), CliError> {
    match session.require_session().await {
        Ok(()) => Ok(()),
        Err(Error::Unauthenticated) => Err(CliError::NotSignedIn),
        Err(error) => Err(error.into()),
    }
}

/// Write the cookie jar back after a command, whatever it returned. A storage
/// failure only surfaces when the command itself succeeded.
pub fn finish_session<S: SessionPersistence>(
    session: &AuthSession<S>,
    outcome: Result<(), CliError>,
) -> Result<(), CliError> {
    match (outcome, session.persist()) {
        (Ok(()), persisted) => Ok(persisted?),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(persist_error)) => {
            tracing::warn!("Failed to store session cookies: {}", persist_error);
            Err(error)
        }
    }
}

pub fn parse_note_id(raw: &str) -> Result<NoteId, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidNoteId(raw.trim().to_string()))
}

pub fn parse_category_id(raw: &str) -> Result<CategoryId, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidCategoryId(raw.trim().to_string()))
}

#[derive(Debug, Serialize)]
pub struct CategoryGroupItem {
    pub category: Option<Category>,
    pub notes: Vec<NoteCard>,
}

pub fn group_to_item<Tz: TimeZone>(group: &CategoryGroup, now: &DateTime<Tz>) -> CategoryGroupItem {
    CategoryGroupItem {
        category: group.category.clone(),
        notes: group
            .notes
            .iter()
            .map(|note| NoteCard::from_note(note, now))
            .collect(),
    }
}

pub fn format_group_lines<Tz: TimeZone>(groups: &[CategoryGroup], now: &DateTime<Tz>) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups.iter().filter(|group| !group.notes.is_empty()) {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("## {}", group.name()));
        for note in &group.notes {
            let card = NoteCard::from_note(note, now);
            lines.push(format!(
                "{:>6}  {:<9}  {}  {}",
                card.id.get(),
                card.last_edited,
                card.title,
                card.preview
            ));
        }
    }
    if lines.is_empty() {
        lines.push("No notes yet.".to_string());
    }
    lines
}

pub fn format_category_lines(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .map(|category| {
            let count = category
                .notes_count
                .map(|count| format!(" ({count})"))
                .unwrap_or_default();
            format!(
                "{:>6}  {}  {}{}",
                category.id.get(),
                category.color(),
                category.name,
                count
            )
        })
        .collect()
}

pub fn format_note_detail<Tz: TimeZone>(note: &Note, now: &DateTime<Tz>) -> Vec<String> {
    let card = NoteCard::from_note(note, now);
    let mut lines = vec![
        format!("# {}", card.title),
        format!(
            "id: {}  category: {}  last edited: {}",
            note.id,
            if card.category_name.is_empty() {
                "-"
            } else {
                card.category_name.as_str()
            },
            card.last_edited
        ),
        String::new(),
    ];
    if note.content.is_empty() {
        lines.push("No content".to_string());
    } else {
        lines.extend(note.content.lines().map(str::to_string));
    }
    lines
}
