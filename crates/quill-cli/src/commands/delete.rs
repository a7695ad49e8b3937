use crate::commands::common::{parse_note_id, require_signed_in, Session};
use crate::error::CliError;

pub async fn run_delete(id: &str, session: &Session) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    require_signed_in(session).await?;
    session.api().delete_note(note_id).await?;
    println!("{note_id}");
    Ok(())
}
