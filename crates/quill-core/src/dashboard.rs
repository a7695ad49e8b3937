//! Dashboard view model: category filtering, grouping, note cards and the
//! "last edited" label.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::{Category, CategoryId, Note, NoteId, DEFAULT_CATEGORY_COLOR};
use crate::util::preview_line;

/// Characters of content shown on a card.
pub const CARD_PREVIEW_CHARS: usize = 80;

/// Category selection on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(CategoryId),
}

impl CategoryFilter {
    pub fn matches(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Category(id) => note.category_id() == Some(id),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Category(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value
            .parse::<CategoryId>()
            .map(Self::Category)
            .map_err(|_| format!("Invalid category '{value}'. Use 'all' or a category id."))
    }
}

/// Notes belonging to the selected category, in their listed order.
pub fn filter_notes(notes: &[Note], filter: CategoryFilter) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| filter.matches(note))
        .cloned()
        .collect()
}

/// One dashboard section. `category` is `None` for notes whose category is
/// missing from the category list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Option<Category>,
    pub notes: Vec<Note>,
}

impl CategoryGroup {
    pub fn name(&self) -> &str {
        self.category
            .as_ref()
            .map_or("Uncategorized", |category| category.name.as_str())
    }
}

/// Group notes by category, keeping category order. Notes pointing at an
/// unknown category end up in a trailing group, present only when non-empty.
pub fn group_by_category(categories: &[Category], notes: &[Note]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = categories
        .iter()
        .map(|category| CategoryGroup {
            category: Some(category.clone()),
            notes: Vec::new(),
        })
        .collect();
    let mut orphans = Vec::new();

    for note in notes {
        let slot = note.category_id().and_then(|id| {
            categories
                .iter()
                .position(|category| category.id == id)
        });
        match slot {
            Some(index) => groups[index].notes.push(note.clone()),
            None => orphans.push(note.clone()),
        }
    }

    if !orphans.is_empty() {
        groups.push(CategoryGroup {
            category: None,
            notes: orphans,
        });
    }
    groups
}

/// Display data for one note on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteCard {
    pub id: NoteId,
    pub title: String,
    pub preview: String,
    pub category_name: String,
    pub color_hex: String,
    pub last_edited: String,
}

impl NoteCard {
    pub fn from_note<Tz: TimeZone>(note: &Note, now: &DateTime<Tz>) -> Self {
        let preview = preview_line(&note.content, CARD_PREVIEW_CHARS);
        Self {
            id: note.id,
            title: note.display_title().to_string(),
            preview: if preview.is_empty() {
                "No content".to_string()
            } else {
                preview
            },
            category_name: note
                .category
                .as_ref()
                .map(|category| category.name.clone())
                .unwrap_or_default(),
            color_hex: note.category.as_ref().map_or_else(
                || DEFAULT_CATEGORY_COLOR.to_string(),
                |category| category.color().to_string(),
            ),
            last_edited: last_edited_label(note.updated_at, now),
        }
    }
}

/// `today`, `yesterday`, or `Mon D`, by calendar day in `now`'s time zone.
pub fn last_edited_label<Tz: TimeZone>(edited_at: DateTime<Utc>, now: &DateTime<Tz>) -> String {
    let today = now.date_naive();
    let edited = edited_at.with_timezone(&now.timezone()).date_naive();

    if edited == today {
        "today".to_string()
    } else if today.pred_opt() == Some(edited) {
        "yesterday".to_string()
    } else {
        edited.format("%b %-d").to_string()
    }
}

/// Like [`last_edited_label`] for a raw RFC 3339 timestamp. Missing or
/// unparsable input gives an empty string.
pub fn format_last_edited<Tz: TimeZone>(raw: Option<&str>, now: &DateTime<Tz>) -> String {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
        .map(|parsed| last_edited_label(parsed.with_timezone(&Utc), now))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::CategoryRef;

    fn category(id: i64, name: &str, color_hex: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            color_hex: color_hex.to_string(),
            created_at: None,
            notes_count: None,
        }
    }

    fn note(id: i64, category_id: Option<i64>, title: &str, content: &str) -> Note {
        Note {
            id: NoteId::new(id),
            title: title.to_string(),
            content: content.to_string(),
            category: category_id.map(|id| CategoryRef {
                id: CategoryId::new(id),
                name: format!("Category {id}"),
                color_hex: String::new(),
            }),
            updated_at: Utc.with_ymd_and_hms(2024, 7, 21, 9, 30, 0).unwrap(),
        }
    }

    fn ids(notes: &[Note]) -> Vec<i64> {
        notes.iter().map(|note| note.id.get()).collect()
    }

    #[test]
    fn category_filter_parses_all_and_ids() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            " 7 ".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Category(CategoryId::new(7))
        );
        assert!("school".parse::<CategoryFilter>().is_err());
        assert_eq!(CategoryFilter::Category(CategoryId::new(7)).to_string(), "7");
    }

    #[test]
    fn filter_keeps_selected_category_in_order() {
        let notes = vec![
            note(1, Some(1), "", ""),
            note(2, Some(2), "", ""),
            note(3, Some(1), "", ""),
            note(4, None, "", ""),
        ];

        assert_eq!(ids(&filter_notes(&notes, CategoryFilter::All)), vec![1, 2, 3, 4]);
        assert_eq!(
            ids(&filter_notes(
                &notes,
                CategoryFilter::Category(CategoryId::new(1))
            )),
            vec![1, 3]
        );
    }

    #[test]
    fn grouping_follows_category_order_with_trailing_unknown() {
        let categories = vec![category(2, "School", "#AAA"), category(1, "Random", "#BBB")];
        let notes = vec![
            note(10, Some(1), "", ""),
            note(11, Some(9), "", ""),
            note(12, Some(2), "", ""),
            note(13, Some(1), "", ""),
        ];

        let groups = group_by_category(&categories, &notes);
        let summary: Vec<(&str, Vec<i64>)> = groups
            .iter()
            .map(|group| (group.name(), ids(&group.notes)))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("School", vec![12]),
                ("Random", vec![10, 13]),
                ("Uncategorized", vec![11]),
            ]
        );
    }

    #[test]
    fn grouping_keeps_empty_categories_and_omits_empty_unknown_group() {
        let categories = vec![category(1, "Random", "#BBB"), category(2, "School", "#AAA")];
        let groups = group_by_category(&categories, &[note(1, Some(1), "", "")]);
        assert_eq!(groups.len(), 2);
        assert!(groups[1].notes.is_empty());
    }

    #[test]
    fn card_falls_back_for_blank_fields() {
        let now = Utc.with_ymd_and_hms(2024, 7, 21, 18, 0, 0).unwrap();
        let card = NoteCard::from_note(&note(5, Some(3), "  ", ""), &now);

        assert_eq!(card.title, "Untitled");
        assert_eq!(card.preview, "No content");
        assert_eq!(card.category_name, "Category 3");
        assert_eq!(card.color_hex, DEFAULT_CATEGORY_COLOR);
        assert_eq!(card.last_edited, "today");
    }

    #[test]
    fn card_preview_uses_first_line() {
        let now = Utc.with_ymd_and_hms(2024, 7, 21, 18, 0, 0).unwrap();
        let card = NoteCard::from_note(&note(5, None, "Groceries", "milk   and\teggs\nbread"), &now);
        assert_eq!(card.preview, "milk and eggs");
        assert_eq!(card.category_name, "");
    }

    #[test]
    fn last_edited_labels_today_yesterday_and_dates() {
        let now = Utc.with_ymd_and_hms(2024, 7, 21, 18, 0, 0).unwrap();

        assert_eq!(format_last_edited(Some("2024-07-21T00:05:00Z"), &now), "today");
        assert_eq!(format_last_edited(Some("2024-07-20T23:59:00Z"), &now), "yesterday");
        assert_eq!(format_last_edited(Some("2024-07-05T10:00:00Z"), &now), "Jul 5");
        assert_eq!(format_last_edited(Some("2023-12-25T10:00:00+00:00"), &now), "Dec 25");
    }

    #[test]
    fn last_edited_uses_calendar_day_of_now_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = tokyo.with_ymd_and_hms(2024, 7, 21, 8, 0, 0).unwrap();

        // 2024-07-20T20:00Z is already the 21st in Tokyo.
        assert_eq!(format_last_edited(Some("2024-07-20T20:00:00Z"), &now), "today");
        assert_eq!(format_last_edited(Some("2024-07-20T10:00:00Z"), &now), "yesterday");
    }

    #[test]
    fn last_edited_is_empty_for_missing_or_invalid_input() {
        let now = Utc.with_ymd_and_hms(2024, 7, 21, 18, 0, 0).unwrap();
        assert_eq!(format_last_edited(None, &now), "");
        assert_eq!(format_last_edited(Some(""), &now), "");
        assert_eq!(format_last_edited(Some("yesterday-ish"), &now), "");
    }
}
