use chrono::Local;
use quill_core::dashboard::group_by_category;
use quill_core::CategoryFilter;

use crate::commands::common::{
    format_group_lines, group_to_item, require_signed_in, CategoryGroupItem, Session,
};
use crate::error::CliError;

pub async fn run_list(
    category: &str,
    as_json: bool,
    session: &Session,
) -> Result<(), CliError> {
    let filter = category
        .parse::<CategoryFilter>()
        .map_err(CliError::InvalidFilter)?;

    require_signed_in(session).await?;
    let api = session.api();
    let (categories, notes) = tokio::try_join!(api.list_categories(), api.list_notes(filter))?;

    let groups = group_by_category(&categories, &notes);
    let now = Local::now();
    if as_json {
        let items = groups
            .iter()
            .map(|group| group_to_item(group, &now))
            .collect::<Vec<CategoryGroupItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_group_lines(&groups, &now) {
            println!("{line}");
        }
    }
    Ok(())
}
