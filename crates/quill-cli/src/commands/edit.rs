use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use quill_core::autosave::{AutosaveOptions, FailurePolicy};
use quill_core::dashboard::last_edited_label;
use quill_core::{AutosaveCoordinator, NoteEdit};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::common::{parse_category_id, parse_note_id, require_signed_in, Session};
use crate::error::CliError;

pub struct EditArgs {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub debounce_ms: u64,
    pub requeue_failed: bool,
    pub read_stdin: bool,
}

/// Apply flag edits, then (with `--stdin`) every input line as the next
/// content state, through the autosave coordinator. Pending edits are saved
/// explicitly at end of input.
pub async fn run_edit(id: &str, args: EditArgs, session: &Session) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let flag_edits = collect_flag_edits(args.title, args.content, args.category.as_deref())?;
    ensure_something_to_edit(&flag_edits, args.read_stdin)?;

    require_signed_in(session).await?;
    let note = session.api().get_note(note_id).await?;

    let autosave = AutosaveCoordinator::new(
        note.id,
        session.api().clone(),
        autosave_options(args.debounce_ms, args.requeue_failed),
    );
    autosave.set_last_saved(Some(note.updated_at));

    for edit in flag_edits {
        autosave.record(edit);
    }

    if args.read_stdin {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            autosave.record(NoteEdit::Content(line));
        }
    }

    let saved = autosave.flush_now().await?;
    if saved.is_none() {
        tracing::debug!(note_id = %note.id, "no pending edits at end of input");
    }
    println!(
        "{}",
        describe_last_saved(autosave.last_saved(), &Local::now())
    );
    Ok(())
}

pub fn collect_flag_edits(
    title: Option<String>,
    content: Option<String>,
    category: Option<&str>,
) -> Result<Vec<NoteEdit>, CliError> {
    let mut edits = Vec::new();
    if let Some(title) = title {
        edits.push(NoteEdit::Title(title));
    }
    if let Some(content) = content {
        edits.push(NoteEdit::Content(content));
    }
    if let Some(category) = category {
        edits.push(NoteEdit::Category(parse_category_id(category)?));
    }
    Ok(edits)
}

pub fn ensure_something_to_edit(
    flag_edits: &[NoteEdit],
    read_stdin: bool,
) -> Result<(), CliError> {
    if flag_edits.is_empty() && !read_stdin {
        Err(CliError::NothingToEdit)
    } else {
        Ok(())
    }
}

pub fn autosave_options(debounce_ms: u64, requeue_failed: bool) -> AutosaveOptions {
    AutosaveOptions {
        window: Duration::from_millis(debounce_ms),
        failure_policy: if requeue_failed {
            FailurePolicy::Requeue
        } else {
            FailurePolicy::Drop
        },
    }
}

pub fn describe_last_saved<Tz: TimeZone>(
    saved_at: Option<DateTime<Utc>>,
    now: &DateTime<Tz>,
) -> String {
    saved_at.map_or_else(
        || "Not saved yet".to_string(),
        |saved_at| {
            let local = saved_at.with_timezone(&now.timezone());
            format!(
                "Last saved {} at {}",
                last_edited_label(saved_at, now),
                local.naive_local().format("%H:%M")
            )
        },
    )
}
