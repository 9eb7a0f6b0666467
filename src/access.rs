//! Ownership and visibility rules for forms

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::Form;

fn is_owner(form: &Form, caller: Option<&Identity>) -> bool {
    caller.is_some_and(|c| form.is_owned_by(c.user_id))
}

fn hidden(form: &Form) -> AppError {
    AppError::NotFound(format!("Form {} not found", form.id))
}

/// Public forms are readable by anyone. Private forms only by their owner;
/// to everyone else they do not exist.
pub fn authorize_read(form: &Form, caller: Option<&Identity>) -> Result<(), AppError> {
    if form.settings.is_public || is_owner(form, caller) {
        Ok(())
    } else {
        Err(hidden(form))
    }
}

/// Mutations, responses and analytics are owner-only
pub fn authorize_owner(form: &Form, caller: &Identity) -> Result<(), AppError> {
    if form.is_owned_by(caller.user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Access denied".to_string()))
    }
}

/// Who may submit a response
pub fn authorize_submit(form: &Form, caller: Option<&Identity>) -> Result<(), AppError> {
    authorize_read(form, caller)?;
    if form.settings.require_auth && caller.is_none() {
        return Err(AppError::Unauthorized(
            "Sign in to respond to this form".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateFormRequest;
    use uuid::Uuid;

    fn identity(user_id: Uuid) -> Identity {
        Identity {
            user_id,
            email: "someone@example.com".into(),
        }
    }

    fn form(owner: Uuid, is_public: bool, require_auth: bool) -> Form {
        let mut form = Form::new(owner, CreateFormRequest::default()).unwrap();
        form.settings.is_public = is_public;
        form.settings.require_auth = require_auth;
        form
    }

    #[test]
    fn test_private_form_hidden_from_strangers() {
        let owner = Uuid::new_v4();
        let private = form(owner, false, false);

        assert!(authorize_read(&private, Some(&identity(owner))).is_ok());
        assert!(matches!(
            authorize_read(&private, None),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            authorize_read(&private, Some(&identity(Uuid::new_v4()))),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_public_form_readable_anonymously() {
        assert!(authorize_read(&form(Uuid::new_v4(), true, false), None).is_ok());
    }

    #[test]
    fn test_non_owner_forbidden() {
        let f = form(Uuid::new_v4(), true, false);
        assert!(matches!(
            authorize_owner(&f, &identity(Uuid::new_v4())),
            Err(AppError::Forbidden(_))
        ));
        assert!(authorize_owner(&f, &identity(f.user_id)).is_ok());
    }

    #[test]
    fn test_require_auth_needs_caller() {
        let f = form(Uuid::new_v4(), true, true);
        assert!(matches!(
            authorize_submit(&f, None),
            Err(AppError::Unauthorized(_))
        ));
        assert!(authorize_submit(&f, Some(&identity(Uuid::new_v4()))).is_ok());
    }

    #[test]
    fn test_private_form_submission_owner_only() {
        let owner = Uuid::new_v4();
        let f = form(owner, false, false);
        assert!(authorize_submit(&f, Some(&identity(owner))).is_ok());
        assert!(matches!(
            authorize_submit(&f, Some(&identity(Uuid::new_v4()))),
            Err(AppError::NotFound(_))
        ));
    }
}
