use crate::commands::common::{format_category_lines, require_signed_in, Session};
use crate::error::CliError;

pub async fn run_categories(as_json: bool, session: &Session) -> Result<(), CliError> {
    require_signed_in(session).await?;
    let categories = session.api().list_categories().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else {
        for line in format_category_lines(&categories) {
            println!("{line}");
        }
    }
    Ok(())
}
