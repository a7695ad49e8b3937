use chrono::{TimeZone, Utc};
use clap::Parser;
use pretty_assertions::assert_eq;
use quill_core::autosave::{FailurePolicy, DEFAULT_DEBOUNCE};
use quill_core::dashboard::group_by_category;
use quill_core::models::CategoryRef;
use std::time::Duration;

use quill_core::auth::SessionPersistence;
use quill_core::{
    ApiClient, AuthSession, Category, CategoryId, ClientConfig, MemorySessionStore, Note, NoteEdit,
    NoteId, NotesApi,
};

use crate::cli::{AuthCommands, Cli, Commands, CompletionShell, ConfigCommands};
use crate::commands::common::{
    client_config_from, finish_session, format_category_lines, format_group_lines,
    format_note_detail, parse_note_id,
};
use crate::commands::completions::render_completions;
use crate::commands::config::resolve_init_api_url;
use crate::commands::edit::{
    autosave_options, collect_flag_edits, describe_last_saved, ensure_something_to_edit,
};
use crate::config_profiles::CliProfile;
use crate::error::CliError;

fn category(id: i64, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        color_hex: "#EF9C66".to_string(),
        created_at: None,
        notes_count: Some(1),
    }
}

fn note(id: i64, category_id: i64, title: &str, content: &str) -> Note {
    Note {
        id: NoteId::new(id),
        title: title.to_string(),
        content: content.to_string(),
        category: Some(CategoryRef {
            id: CategoryId::new(category_id),
            name: "Random Thoughts".to_string(),
            color_hex: "#EF9C66".to_string(),
        }),
        updated_at: Utc.with_ymd_and_hms(2024, 7, 20, 15, 0, 0).unwrap(),
    }
}

#[test]
fn list_command_parses_category_and_json() {
    let cli = Cli::try_parse_from(["quill", "list", "--category", "3", "--json"]).unwrap();
    match cli.command {
        Some(Commands::List { category, json }) => {
            assert_eq!(category, "3");
            assert!(json);
        }
        _ => panic!("expected list command"),
    }
}

#[test]
fn list_category_defaults_to_all() {
    let cli = Cli::try_parse_from(["quill", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::List { ref category, json: false }) if category == "all"
    ));
}

#[test]
fn global_flags_are_accepted_after_subcommand() {
    let cli = Cli::try_parse_from([
        "quill",
        "auth",
        "status",
        "--profile",
        "work",
        "--api-url",
        "https://notes.example.com",
    ])
    .unwrap();
    assert_eq!(cli.profile.as_deref(), Some("work"));
    assert_eq!(cli.api_url.as_deref(), Some("https://notes.example.com"));
    assert!(matches!(
        cli.command,
        Some(Commands::Auth {
            command: AuthCommands::Status
        })
    ));
}

#[test]
fn edit_command_defaults_to_editor_debounce() {
    let cli = Cli::try_parse_from(["quill", "edit", "7", "--title", "Groceries"]).unwrap();
    match cli.command {
        Some(Commands::Edit {
            id,
            title,
            debounce_ms,
            requeue_failed,
            ..
        }) => {
            assert_eq!(id, "7");
            assert_eq!(title.as_deref(), Some("Groceries"));
            assert_eq!(u128::from(debounce_ms), DEFAULT_DEBOUNCE.as_millis());
            assert!(!requeue_failed);
        }
        _ => panic!("expected edit command"),
    }
}

#[test]
fn edit_reads_stdin_only_when_asked() {
    let cli = Cli::try_parse_from(["quill", "edit", "5", "--title", "X"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Edit { stdin: false, .. })
    ));

    let cli = Cli::try_parse_from(["quill", "edit", "5", "--stdin"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Edit { stdin: true, .. })));
}

#[test]
fn edit_without_flags_or_stdin_has_nothing_to_do() {
    assert!(matches!(
        ensure_something_to_edit(&[], false),
        Err(CliError::NothingToEdit)
    ));
    assert!(ensure_something_to_edit(&[], true).is_ok());
    assert!(ensure_something_to_edit(&[NoteEdit::Title("X".to_string())], false).is_ok());
}

#[test]
fn config_init_parses_timeout() {
    let cli =
        Cli::try_parse_from(["quill", "config", "init", "--timeout-secs", "30"]).unwrap();
    match cli.command {
        Some(Commands::Config {
            command: ConfigCommands::Init { timeout_secs, .. },
        }) => assert_eq!(timeout_secs, Some(30)),
        _ => panic!("expected config init command"),
    }
    assert!(Cli::try_parse_from(["quill", "config", "init", "--timeout-secs", "0"]).is_err());
}

#[test]
fn profile_timeout_reaches_client_config() {
    let profile = CliProfile {
        api_base_url: Some("https://notes.example.com".to_string()),
        request_timeout_secs: Some(42),
    };
    let config = client_config_from(None, None, Some(&profile)).unwrap();
    assert_eq!(config.api_base_url, "https://notes.example.com");
    assert_eq!(config.request_timeout, Duration::from_secs(42));

    let config = client_config_from(
        Some("https://override.example.com"),
        Some("https://env.example.com".to_string()),
        Some(&profile),
    )
    .unwrap();
    assert_eq!(config.api_base_url, "https://override.example.com");
    assert_eq!(config.request_timeout, Duration::from_secs(42));

    let config = client_config_from(None, None, None).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn session_is_written_back_when_command_fails() {
    let store = MemorySessionStore::default();
    let config = ClientConfig::new("http://localhost:8000").unwrap();
    let api = NotesApi::new(ApiClient::new(&config).unwrap());
    let session = AuthSession::new(api, store.clone()).unwrap();
    session.api().http().restore_cookies("access_token=rotated");

    let outcome = finish_session(&session, Err(CliError::NothingToEdit));

    assert!(matches!(outcome, Err(CliError::NothingToEdit)));
    assert_eq!(
        store.load_cookies().unwrap().as_deref(),
        Some("access_token=rotated")
    );
}

#[test]
fn config_init_parses_no_activate() {
    let cli = Cli::try_parse_from([
        "quill",
        "config",
        "init",
        "--profile",
        "staging",
        "--api-url",
        "https://staging.example.com",
        "--no-activate",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Config {
            command:
                ConfigCommands::Init {
                    profile,
                    api_url,
                    timeout_secs,
                    no_activate,
                },
        }) => {
            assert_eq!(profile.as_deref(), Some("staging"));
            assert_eq!(api_url.as_deref(), Some("https://staging.example.com"));
            assert_eq!(timeout_secs, None);
            assert!(no_activate);
        }
        _ => panic!("expected config init command"),
    }
}

#[test]
fn flag_edits_follow_field_order() {
    let edits = collect_flag_edits(
        Some("Title".to_string()),
        Some("Body".to_string()),
        Some("2"),
    )
    .unwrap();
    assert_eq!(
        edits,
        vec![
            NoteEdit::Title("Title".to_string()),
            NoteEdit::Content("Body".to_string()),
            NoteEdit::Category(CategoryId::new(2)),
        ]
    );
    assert!(collect_flag_edits(None, None, None).unwrap().is_empty());
}

#[test]
fn flag_edits_reject_invalid_category() {
    let error = collect_flag_edits(None, None, Some("school")).unwrap_err();
    assert!(matches!(error, CliError::InvalidCategoryId(ref raw) if raw == "school"));
}

#[test]
fn autosave_options_follow_flags() {
    let options = autosave_options(250, true);
    assert_eq!(options.window.as_millis(), 250);
    assert_eq!(options.failure_policy, FailurePolicy::Requeue);
    assert_eq!(autosave_options(500, false).failure_policy, FailurePolicy::Drop);
}

#[test]
fn last_saved_description() {
    let now = Utc.with_ymd_and_hms(2024, 7, 21, 18, 0, 0).unwrap();
    assert_eq!(describe_last_saved(None, &now), "Not saved yet");
    assert_eq!(
        describe_last_saved(Some(Utc.with_ymd_and_hms(2024, 7, 21, 9, 5, 0).unwrap()), &now),
        "Last saved today at 09:05"
    );
    assert_eq!(
        describe_last_saved(Some(Utc.with_ymd_and_hms(2024, 7, 2, 9, 5, 0).unwrap()), &now),
        "Last saved Jul 2 at 09:05"
    );
}

#[test]
fn note_id_must_be_numeric() {
    assert_eq!(parse_note_id(" 12 ").unwrap(), NoteId::new(12));
    assert!(matches!(
        parse_note_id("abc"),
        Err(CliError::InvalidNoteId(ref raw)) if raw == "abc"
    ));
}

#[test]
fn group_lines_render_sections() {
    let now = Utc.with_ymd_and_hms(2024, 7, 21, 18, 0, 0).unwrap();
    let categories = vec![category(1, "Random Thoughts"), category(2, "School")];
    let notes = vec![note(4, 1, "Groceries", "milk\neggs"), note(5, 1, "", "")];

    let lines = format_group_lines(&group_by_category(&categories, &notes), &now);
    assert_eq!(
        lines,
        vec![
            "## Random Thoughts".to_string(),
            "     4  yesterday  Groceries  milk".to_string(),
            "     5  yesterday  Untitled  No content".to_string(),
        ]
    );
}

#[test]
fn group_lines_report_empty_dashboard() {
    let now = Utc.with_ymd_and_hms(2024, 7, 21, 18, 0, 0).unwrap();
    let lines = format_group_lines(&group_by_category(&[category(1, "School")], &[]), &now);
    assert_eq!(lines, vec!["No notes yet.".to_string()]);
}

#[test]
fn category_lines_include_counts() {
    assert_eq!(
        format_category_lines(&[category(1, "School")]),
        vec!["     1  #EF9C66  School (1)".to_string()]
    );
}

#[test]
fn note_detail_shows_header_and_body() {
    let now = Utc.with_ymd_and_hms(2024, 7, 21, 18, 0, 0).unwrap();
    let lines = format_note_detail(&note(4, 1, "Groceries", "milk\neggs"), &now);
    assert_eq!(
        lines,
        vec![
            "# Groceries".to_string(),
            "id: 4  category: Random Thoughts  last edited: yesterday".to_string(),
            String::new(),
            "milk".to_string(),
            "eggs".to_string(),
        ]
    );
}

#[test]
fn init_api_url_prefers_explicit_then_env_then_existing() {
    assert_eq!(
        resolve_init_api_url(
            Some("https://explicit.example.com/".to_string()),
            Some("https://env.example.com".to_string()),
            None,
        )
        .unwrap(),
        "https://explicit.example.com"
    );
    assert_eq!(
        resolve_init_api_url(None, None, Some("https://stored.example.com".to_string())).unwrap(),
        "https://stored.example.com"
    );
    assert_eq!(
        resolve_init_api_url(None, None, None).unwrap(),
        "http://localhost:8000"
    );
    assert!(resolve_init_api_url(Some("notes.example.com".to_string()), None, None).is_err());
}

#[test]
fn core_errors_display_user_message() {
    let error = CliError::from(quill_core::Error::Request {
        status: 400,
        message: r#"{"email":["Enter a valid email address."]}"#.to_string(),
    });
    assert_eq!(error.to_string(), "Enter a valid email address.");
}

#[test]
fn completions_mention_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("quill"));
}
