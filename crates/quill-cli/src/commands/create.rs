use quill_core::models::NoteDraft;

use crate::commands::common::{parse_category_id, require_signed_in, Session};
use crate::error::CliError;

/// Create a note. With no flags the backend fills in an empty note in its
/// default category.
pub async fn run_new(
    title: Option<String>,
    content: Option<String>,
    category: Option<&str>,
    session: &Session,
) -> Result<(), CliError> {
    let draft = NoteDraft {
        title,
        content,
        category_id: category.map(parse_category_id).transpose()?,
    };

    require_signed_in(session).await?;
    let note = session.api().create_note(&draft).await?;
    println!("{}", note.id);
    Ok(())
}
