use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::Database;
use crate::store::types::{FormData, FormStatus, FormSubmission};

/// Fields supplied when a technician starts a new form.
#[derive(Debug, Clone)]
pub struct NewForm {
    pub job_po_number: String,
    pub submitted_by_email: Option<String>,
    pub data: FormData,
}

/// Draft-time updates. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateForm {
    pub submitted_by_email: Option<String>,
    pub data: Option<FormData>,
}

/// CRUD access to the `form_submissions` table. Workflow transitions do not
/// live here; they are owned by the workflow engine, which runs its own
/// guarded updates inside a transaction.
#[derive(Debug, Clone)]
pub struct FormStore {
    db: Database,
}

impl FormStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, new_form: NewForm) -> Result<FormSubmission, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let data_json = serde_json::to_string(&new_form.data)
            .expect("form data serializes to JSON");

        sqlx::query(
            r#"
            INSERT INTO form_submissions
                (id, job_po_number, status, is_draft, submitted_by_email, data,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(&new_form.job_po_number)
        .bind(FormStatus::Draft.as_str())
        .bind(&new_form.submitted_by_email)
        .bind(&data_json)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        self.fetch(&id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn fetch(&self, id: &str) -> Result<Option<FormSubmission>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM form_submissions WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(FormSubmission::from_row).transpose()
    }

    /// Transaction-scoped fetch used by the workflow engine so the read and
    /// the guarded write see the same snapshot.
    pub async fn fetch_in_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> Result<Option<FormSubmission>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM form_submissions WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        row.as_ref().map(FormSubmission::from_row).transpose()
    }

    pub async fn list(&self) -> Result<Vec<FormSubmission>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM form_submissions ORDER BY created_at DESC")
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(FormSubmission::from_row).collect()
    }

    pub async fn update_draft(
        &self,
        id: &str,
        update: UpdateForm,
    ) -> Result<Option<FormSubmission>, sqlx::Error> {
        let Some(existing) = self.fetch(id).await? else {
            return Ok(None);
        };

        let submitted_by = update
            .submitted_by_email
            .or(existing.submitted_by_email);
        let data = update.data.unwrap_or(existing.data);
        let data_json = serde_json::to_string(&data).expect("form data serializes to JSON");

        sqlx::query(
            r#"
            UPDATE form_submissions
            SET submitted_by_email = ?1, data = ?2, updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&submitted_by)
        .bind(&data_json)
        .bind(Utc::now())
        .bind(id)
        .execute(self.db.pool())
        .await?;

        self.fetch(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM form_submissions WHERE id = ?1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip `http_post_sent` after a successful webhook delivery. Runs
    /// outside the transition transaction: delivery happens post-commit.
    pub async fn mark_http_post_sent(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE form_submissions SET http_post_sent = 1 WHERE id = ?1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
