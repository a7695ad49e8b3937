//! quill-core - Core library for Quill
//!
//! This crate contains the backend client, session handling, the debounced
//! autosave coordinator and the dashboard view model used by the Quill CLI.

pub mod api;
pub mod auth;
pub mod autosave;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod models;
pub mod util;

pub use api::NotesApi;
pub use auth::{AuthSession, AuthStatus, Credentials, MemorySessionStore, SessionPersistence};
pub use autosave::{AutosaveCoordinator, AutosaveOptions, AutosaveState, FailurePolicy, NoteSaver};
pub use config::ClientConfig;
pub use dashboard::CategoryFilter;
pub use error::{Error, Result};
pub use http::ApiClient;
pub use models::{Category, CategoryId, Note, NoteEdit, NoteId, NotePatch};
