//! Typed wrappers over the notes backend endpoints.

use crate::auth::Credentials;
use crate::dashboard::CategoryFilter;
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::models::{AuthUser, Category, Note, NoteDraft, NoteId, NotePatch, SaveAck};

pub const CATEGORIES_PATH: &str = "/api/categories/";
pub const NOTES_PATH: &str = "/api/notes/";
pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const SIGNUP_PATH: &str = "/api/auth/signup/";
pub const LOGOUT_PATH: &str = "/api/auth/logout/";

/// Path of a single note resource.
pub fn note_path(id: NoteId) -> String {
    format!("{NOTES_PATH}{id}/")
}

#[derive(Debug, Clone)]
pub struct NotesApi {
    http: ApiClient,
}

impl NotesApi {
    pub const fn new(http: ApiClient) -> Self {
        Self { http }
    }

    pub const fn http(&self) -> &ApiClient {
        &self.http
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.http.get(CATEGORIES_PATH).await?.unwrap_or_default())
    }

    pub async fn list_notes(&self, filter: CategoryFilter) -> Result<Vec<Note>> {
        let path = match filter {
            CategoryFilter::All => NOTES_PATH.to_string(),
            CategoryFilter::Category(id) => format!("{NOTES_PATH}?category={id}"),
        };
        Ok(self.http.get(&path).await?.unwrap_or_default())
    }

    pub async fn get_note(&self, id: NoteId) -> Result<Note> {
        self.http
            .get(&note_path(id))
            .await?
            .ok_or_else(|| Error::EmptyResponse(note_path(id)))
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> Result<Note> {
        self.http
            .post(NOTES_PATH, draft)
            .await?
            .ok_or_else(|| Error::EmptyResponse(NOTES_PATH.to_string()))
    }

    /// Partial update carrying only the fields present in `patch`.
    pub async fn patch_note(&self, id: NoteId, patch: &NotePatch) -> Result<SaveAck> {
        let ack = self.http.patch(&note_path(id), patch).await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn delete_note(&self, id: NoteId) -> Result<()> {
        self.http
            .delete::<serde_json::Value>(&note_path(id))
            .await?;
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Option<AuthUser>> {
        self.http.post(LOGIN_PATH, credentials).await
    }

    pub async fn signup(&self, credentials: &Credentials) -> Result<Option<AuthUser>> {
        self.http.post(SIGNUP_PATH, credentials).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.http.post_empty::<serde_json::Value>(LOGOUT_PATH).await?;
        Ok(())
    }

    /// True iff an ordinary authenticated read succeeds.
    pub async fn probe_session(&self) -> bool {
        match self.http.get::<serde_json::Value>(CATEGORIES_PATH).await {
            Ok(_) => true,
            Err(error) => {
                tracing::debug!("Session probe failed: {}", error);
                false
            }
        }
    }
}
