use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::database::Database;
use crate::store::types::WorkflowHistoryEntry;

/// Append-only access to the `workflow_history` table. Entries are never
/// updated or deleted.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    db: Database,
}

impl HistoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn append(
        &self,
        form_id: &str,
        action: &str,
        actor_email: &str,
        note: Option<&str>,
        forwarded_to_email: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let mut conn = self.db.pool().acquire().await?;
        Self::append_in_tx(
            &mut conn,
            form_id,
            action,
            actor_email,
            note,
            forwarded_to_email,
            Utc::now(),
        )
        .await
    }

    /// Transaction-scoped append used by the workflow engine so the state
    /// mutation and its audit record commit or roll back together.
    #[allow(clippy::too_many_arguments)]
    pub async fn append_in_tx(
        conn: &mut SqliteConnection,
        form_id: &str,
        action: &str,
        actor_email: &str,
        note: Option<&str>,
        forwarded_to_email: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO workflow_history
                (form_id, action, actor_email, note, forwarded_to_email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(form_id)
        .bind(action)
        .bind(actor_email)
        .bind(note)
        .bind(forwarded_to_email)
        .bind(created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Timeline for one form, ordered by creation time with insert order as
    /// the tiebreaker.
    pub async fn list_for_form(
        &self,
        form_id: &str,
    ) -> Result<Vec<WorkflowHistoryEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, form_id, action, actor_email, note, forwarded_to_email, created_at
            FROM workflow_history
            WHERE form_id = ?1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(form_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(WorkflowHistoryEntry::from_row).collect()
    }
}
