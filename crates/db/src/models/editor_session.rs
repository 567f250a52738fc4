//! Editor session model and DTOs.
//!
//! A session holds the append-only history of compressed template saves
//! (`email_saves`) plus the asset URLs uploaded while editing.

use mailspark_core::session_codec::SaveEntry;
use mailspark_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// How a session came to exist. Stored as lowercase text, constrained by a
/// CHECK in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum SessionType {
    /// Produced by the generation pipeline; counts against plan credits.
    Generated,
    /// Created by the user from the editor.
    Manual,
}

/// A full row from the `editor_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditorSession {
    pub id: DbId,
    pub user_id: DbId,
    pub brand_id: Option<DbId>,
    pub product_id: Option<DbId>,
    pub session_name: String,
    pub session_type: SessionType,
    pub email_saves: Json<Vec<SaveEntry>>,
    pub assets: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EditorSession {
    /// The most recent save, if any.
    pub fn latest_save(&self) -> Option<&SaveEntry> {
        self.email_saves.0.last()
    }
}

/// Listing row: the session without its save payloads.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditorSessionSummary {
    pub id: DbId,
    pub brand_id: Option<DbId>,
    pub product_id: Option<DbId>,
    pub session_name: String,
    pub session_type: SessionType,
    pub save_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEditorSession {
    pub brand_id: Option<DbId>,
    pub product_id: Option<DbId>,
    pub session_name: String,
    pub session_type: SessionType,
}
