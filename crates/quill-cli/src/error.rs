use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}", .0.user_message())]
    Core(#[from] quill_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid note id: {0}")]
    InvalidNoteId(String),
    #[error("Invalid category id: {0}")]
    InvalidCategoryId(String),
    #[error("{0}")]
    InvalidFilter(String),
    #[error("Nothing to change. Pass --title, --content, --category or --stdin.")]
    NothingToEdit,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Not signed in. Run `quill auth login --email <email> --password <password>` first."
    )]
    NotSignedIn,
}
