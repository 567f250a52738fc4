//! Repository for the `editor_sessions` table.
//!
//! `email_saves` is append-only: saves are added with a single `||` update
//! so concurrent appends never overwrite each other.

use mailspark_core::session_codec::SaveEntry;
use mailspark_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::editor_session::{
    CreateEditorSession, EditorSession, EditorSessionSummary, SessionType,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, brand_id, product_id, session_name, session_type, \
                       email_saves, assets, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "id, brand_id, product_id, session_name, session_type, \
                               jsonb_array_length(email_saves) AS save_count, \
                               created_at, updated_at";

pub struct EditorSessionRepo;

impl EditorSessionRepo {
    /// Insert a session for `user_id` with its initial saves.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateEditorSession,
        initial_saves: &[SaveEntry],
    ) -> Result<EditorSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO editor_sessions
                (user_id, brand_id, product_id, session_name, session_type, email_saves)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditorSession>(&query)
            .bind(user_id)
            .bind(input.brand_id)
            .bind(input.product_id)
            .bind(&input.session_name)
            .bind(input.session_type)
            .bind(Json(initial_saves))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EditorSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM editor_sessions WHERE id = $1");
        sqlx::query_as::<_, EditorSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's sessions, most recently updated first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EditorSessionSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM editor_sessions
             WHERE user_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, EditorSessionSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Append one save to the end of the session's list.
    ///
    /// Returns `None` if the session does not exist.
    pub async fn append_save(
        pool: &PgPool,
        id: DbId,
        entry: &SaveEntry,
    ) -> Result<Option<EditorSession>, sqlx::Error> {
        let query = format!(
            "UPDATE editor_sessions
             SET email_saves = email_saves || jsonb_build_array($2::jsonb)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditorSession>(&query)
            .bind(id)
            .bind(Json(entry))
            .fetch_optional(pool)
            .await
    }

    /// Number of the user's sessions of the given type.
    pub async fn count_by_type(
        pool: &PgPool,
        user_id: DbId,
        session_type: SessionType,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM editor_sessions WHERE user_id = $1 AND session_type = $2",
        )
        .bind(user_id)
        .bind(session_type)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Record an uploaded asset URL on the session.
    pub async fn add_asset(
        pool: &PgPool,
        id: DbId,
        url: &str,
    ) -> Result<Option<EditorSession>, sqlx::Error> {
        let query = format!(
            "UPDATE editor_sessions SET assets = array_append(assets, $2)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditorSession>(&query)
            .bind(id)
            .bind(url)
            .fetch_optional(pool)
            .await
    }
}
