use chrono::Local;

use crate::commands::common::{format_note_detail, parse_note_id, require_signed_in, Session};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool, session: &Session) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    require_signed_in(session).await?;
    let note = session.api().get_note(note_id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        for line in format_note_detail(&note, &Local::now()) {
            println!("{line}");
        }
    }
    Ok(())
}
