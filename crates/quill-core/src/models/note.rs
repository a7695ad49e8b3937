//! Note model and the write payloads built from editor input

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::{CategoryId, CategoryRef};

/// Server-assigned note identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A note as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Owning category; the backend always embeds it but tolerate its absence
    #[serde(default)]
    pub category: Option<CategoryRef>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.as_ref().map(|category| category.id)
    }

    /// Title shown in lists, falling back to `Untitled`.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

/// Body of a create request. An empty draft serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

/// Editable note fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Title,
    Content,
    CategoryId,
}

impl NoteField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::CategoryId => "category_id",
        }
    }
}

impl fmt::Display for NoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user edit to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEdit {
    Title(String),
    Content(String),
    Category(CategoryId),
}

impl NoteEdit {
    #[must_use]
    pub const fn field(&self) -> NoteField {
        match self {
            Self::Title(_) => NoteField::Title,
            Self::Content(_) => NoteField::Content,
            Self::Category(_) => NoteField::CategoryId,
        }
    }
}

/// Pending field values for a partial update.
///
/// Each field holds the latest value recorded for it; fields never edited
/// stay `None` and are left out of the serialized body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

impl NotePatch {
    /// Record an edit, replacing any earlier value for the same field.
    pub fn apply(&mut self, edit: NoteEdit) {
        match edit {
            NoteEdit::Title(title) => self.title = Some(title),
            NoteEdit::Content(content) => self.content = Some(content),
            NoteEdit::Category(category_id) => self.category_id = Some(category_id),
        }
    }

    /// Overlay `newer` on top of `self`; fields set in `newer` win.
    pub fn merge(&mut self, newer: Self) {
        if newer.title.is_some() {
            self.title = newer.title;
        }
        if newer.content.is_some() {
            self.content = newer.content;
        }
        if newer.category_id.is_some() {
            self.category_id = newer.category_id;
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category_id.is_none()
    }

    #[must_use]
    pub fn fields(&self) -> Vec<NoteField> {
        let mut fields = Vec::with_capacity(3);
        if self.title.is_some() {
            fields.push(NoteField::Title);
        }
        if self.content.is_some() {
            fields.push(NoteField::Content);
        }
        if self.category_id.is_some() {
            fields.push(NoteField::CategoryId);
        }
        fields
    }
}

impl FromIterator<NoteEdit> for NotePatch {
    fn from_iter<I: IntoIterator<Item = NoteEdit>>(iter: I) -> Self {
        let mut patch = Self::default();
        for edit in iter {
            patch.apply(edit);
        }
        patch
    }
}

/// The part of a write response the editor cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SaveAck {
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
