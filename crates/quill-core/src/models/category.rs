//! Category model

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Card color used when a category carries none
pub const DEFAULT_CATEGORY_COLOR: &str = "#FBE7CD";

/// Server-assigned category identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

impl CategoryId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A category as listed by `GET /api/categories/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub color_hex: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes_count: Option<u32>,
}

impl Category {
    #[must_use]
    pub fn color(&self) -> &str {
        color_or_default(&self.color_hex)
    }
}

/// Minimal category embedded in a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color_hex: String,
}

impl CategoryRef {
    #[must_use]
    pub fn color(&self) -> &str {
        color_or_default(&self.color_hex)
    }
}

fn color_or_default(color_hex: &str) -> &str {
    let trimmed = color_hex.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY_COLOR
    } else {
        trimmed
    }
}
