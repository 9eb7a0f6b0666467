//! PostgreSQL document store
//!
//! Each operation checks a client out of the pool and returns it on drop.
//! Multi-statement operations run inside a transaction.

use super::{queries, FormStore, UserStore};
use crate::error::AppError;
use crate::models::{Form, FormResponse, User};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use postgres_types::Json;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn form_from_row(row: &Row) -> Result<Form, AppError> {
    let Json(mut form): Json<Form> = row.try_get(0)?;
    let count: i64 = row.try_get(1)?;
    form.response_count = count.max(0) as u64;
    Ok(form)
}

fn response_from_row(row: &Row) -> Result<FormResponse, AppError> {
    let Json(response): Json<FormResponse> = row.try_get(0)?;
    Ok(response)
}

fn user_from_row(row: &Row) -> Result<User, AppError> {
    Ok(User {
        id: row.try_get(0)?,
        email: row.try_get(1)?,
        password_hash: row.try_get(2)?,
        name: row.try_get(3)?,
        created_at: row.try_get(4)?,
        updated_at: row.try_get(5)?,
    })
}

/// Map unique-constraint violations to a caller-facing conflict
fn conflict_on_unique(e: tokio_postgres::Error, message: &str) -> AppError {
    if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(e)
    }
}

#[async_trait]
impl FormStore for PgStore {
    async fn insert_form(&self, form: &Form) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        client
            .execute(
                queries::INSERT_FORM,
                &[
                    &form.id,
                    &form.user_id,
                    &(form.response_count as i64),
                    &form.updated_at,
                    &Json(form),
                ],
            )
            .await
            .map_err(|e| conflict_on_unique(e, "Form already exists"))?;
        Ok(())
    }

    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::SELECT_FORM, &[&id]).await?;
        row.as_ref().map(form_from_row).transpose()
    }

    async fn find_forms_by_owner(&self, owner: Uuid) -> Result<Vec<Form>, AppError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::SELECT_FORMS_BY_OWNER, &[&owner]).await?;
        rows.iter().map(form_from_row).collect()
    }

    async fn update_form(&self, form: &Form) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(queries::UPDATE_FORM, &[&form.id, &form.updated_at, &Json(form)])
            .await?;
        Ok(updated > 0)
    }

    async fn delete_form(&self, id: Uuid) -> Result<Option<u64>, AppError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let removed = tx.execute(queries::DELETE_RESPONSES_BY_FORM, &[&id]).await?;
        let deleted = tx.execute(queries::DELETE_FORM, &[&id]).await?;
        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        debug!("Deleted form {} with {} responses", id, removed);
        Ok(Some(removed))
    }

    async fn insert_response(&self, response: &FormResponse) -> Result<(), AppError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        tx.execute(
            queries::INSERT_RESPONSE,
            &[
                &response.id,
                &response.form_id,
                &response.ip_address,
                &response.submitter_email,
                &response.submitted_at,
                &Json(response),
            ],
        )
        .await?;

        let bumped = tx
            .execute(queries::INCREMENT_RESPONSE_COUNT, &[&response.form_id])
            .await?;
        if bumped == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!(
                "Form {} not found",
                response.form_id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_responses(&self, form_id: Uuid) -> Result<Vec<FormResponse>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(queries::SELECT_RESPONSES_BY_FORM, &[&form_id])
            .await?;
        rows.iter().map(response_from_row).collect()
    }

    async fn find_prior_submission(
        &self,
        form_id: Uuid,
        ip_address: &str,
        submitter_email: Option<&str>,
    ) -> Result<Option<FormResponse>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                queries::SELECT_PRIOR_SUBMISSION,
                &[&form_id, &ip_address, &submitter_email],
            )
            .await?;
        row.as_ref().map(response_from_row).transpose()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        client
            .execute(
                queries::INSERT_USER,
                &[
                    &user.id,
                    &user.email,
                    &user.password_hash,
                    &user.name,
                    &user.created_at,
                    &user.updated_at,
                ],
            )
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::SELECT_USER_BY_EMAIL, &[&email]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::SELECT_USER_BY_ID, &[&id]).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                queries::UPDATE_USER,
                &[
                    &user.id,
                    &user.email,
                    &user.password_hash,
                    &user.name,
                    &user.updated_at,
                ],
            )
            .await
            .map_err(|e| conflict_on_unique(e, "Email already exists"))?;

        if updated == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }
}
