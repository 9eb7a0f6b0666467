//! In-memory document store
//!
//! Backs development runs (`STORAGE_BACKEND=memory`) and tests. Nothing survives a restart.

use super::{FormStore, UserStore};
use crate::error::AppError;
use crate::models::{Form, FormResponse, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Thread-safe in-process store for forms, responses and users
#[derive(Clone, Default)]
pub struct MemoryStore {
    forms: Arc<RwLock<HashMap<Uuid, Form>>>,
    /// Form ID -> responses in insertion order
    responses: Arc<RwLock<HashMap<Uuid, Vec<FormResponse>>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    email_index: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormStore for MemoryStore {
    async fn insert_form(&self, form: &Form) -> Result<(), AppError> {
        let mut forms = self.forms.write().await;
        if forms.contains_key(&form.id) {
            return Err(AppError::Conflict(format!("Form {} already exists", form.id)));
        }
        forms.insert(form.id, form.clone());
        Ok(())
    }

    async fn find_form(&self, id: Uuid) -> Result<Option<Form>, AppError> {
        let forms = self.forms.read().await;
        Ok(forms.get(&id).cloned())
    }

    async fn find_forms_by_owner(&self, owner: Uuid) -> Result<Vec<Form>, AppError> {
        let forms = self.forms.read().await;
        let mut owned: Vec<Form> = forms
            .values()
            .filter(|f| f.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn update_form(&self, form: &Form) -> Result<bool, AppError> {
        let mut forms = self.forms.write().await;
        match forms.get_mut(&form.id) {
            Some(stored) => {
                let response_count = stored.response_count;
                *stored = form.clone();
                stored.response_count = response_count;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_form(&self, id: Uuid) -> Result<Option<u64>, AppError> {
        // Lock order: forms, then responses
        let mut forms = self.forms.write().await;
        let mut responses = self.responses.write().await;

        if forms.remove(&id).is_none() {
            return Ok(None);
        }
        let removed = responses.remove(&id).map_or(0, |r| r.len() as u64);
        Ok(Some(removed))
    }

    async fn insert_response(&self, response: &FormResponse) -> Result<(), AppError> {
        let mut forms = self.forms.write().await;
        let mut responses = self.responses.write().await;

        let form = forms
            .get_mut(&response.form_id)
            .ok_or_else(|| AppError::NotFound(format!("Form {} not found", response.form_id)))?;

        responses
            .entry(response.form_id)
            .or_default()
            .push(response.clone());
        form.response_count += 1;
        Ok(())
    }

    async fn find_responses(&self, form_id: Uuid) -> Result<Vec<FormResponse>, AppError> {
        let responses = self.responses.read().await;
        let mut found = responses.get(&form_id).cloned().unwrap_or_default();
        found.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(found)
    }

    async fn find_prior_submission(
        &self,
        form_id: Uuid,
        ip_address: &str,
        submitter_email: Option<&str>,
    ) -> Result<Option<FormResponse>, AppError> {
        let responses = self.responses.read().await;
        let prior = responses.get(&form_id).and_then(|list| {
            list.iter()
                .find(|r| {
                    r.ip_address.as_deref() == Some(ip_address)
                        || (submitter_email.is_some()
                            && r.submitter_email.as_deref() == submitter_email)
                })
                .cloned()
        });
        Ok(prior)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        // Check if email already exists
        if email_index.contains_key(&user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        email_index.insert(user.email.clone(), user.id);
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        let email_index = self.email_index.read().await;
        Ok(email_index.get(email).and_then(|id| users.get(id).cloned()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        if let Some(owner) = email_index.get(&user.email) {
            if *owner != user.id {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if stored.email != user.email {
            email_index.remove(&stored.email);
            email_index.insert(user.email.clone(), user.id);
        }
        *stored = user.clone();
        Ok(())
    }
}
