//! Data models for Quill

mod category;
mod note;
mod user;

pub use category::{Category, CategoryId, CategoryRef, DEFAULT_CATEGORY_COLOR};
pub use note::{Note, NoteDraft, NoteEdit, NoteField, NoteId, NotePatch, SaveAck};
pub use user::AuthUser;
