// =============================================================================
// VALIDATION MODULE
// =============================================================================
// Synchronous validation of the create/edit user dialog.
//
// LEARNING NOTES:
// - Validation never fails with an error: it returns a sparse map of
//   field -> message. A missing key means the field is valid.
// - The rules depend on the dialog mode. View mode is read-only and is
//   never validated; email is immutable after creation so only create mode
//   checks it; passwords are only entered when creating with setup mode
//   "password".
// =============================================================================

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::models::{FormMode, SetupMode, UserFormValues};

/// Minimum password length accepted on submit.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    DepartmentId,
    Password,
    #[serde(rename = "confirmPassword")]
    ConfirmPassword,
}

/// Field -> message. Ordered so responses are deterministic.
pub type FieldErrors = BTreeMap<FormField, &'static str>;

pub const MSG_NAME_REQUIRED: &str = "Please enter a name";
pub const MSG_EMAIL_REQUIRED: &str = "Please enter an email address";
pub const MSG_EMAIL_INVALID: &str = "Email address is not valid";
pub const MSG_DEPARTMENT_REQUIRED: &str = "Please select a department";
pub const MSG_PASSWORD_REQUIRED: &str = "Please enter a password";
pub const MSG_PASSWORD_POLICY: &str =
    "Password must be at least 8 characters and contain a letter and a digit";
pub const MSG_CONFIRM_REQUIRED: &str = "Please confirm the password";
pub const MSG_CONFIRM_MISMATCH: &str = "Passwords do not match";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Submission rule: at least 8 characters, one ASCII letter, one digit.
pub fn password_meets_policy(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Validate the user dialog for `mode`.
pub fn validate_user_form(values: &UserFormValues, mode: FormMode) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if mode == FormMode::View {
        return errors;
    }

    if values.name.trim().is_empty() {
        errors.insert(FormField::Name, MSG_NAME_REQUIRED);
    }

    if mode == FormMode::Create {
        let email = values.email.trim();
        if email.is_empty() {
            errors.insert(FormField::Email, MSG_EMAIL_REQUIRED);
        } else if !is_valid_email(email) {
            errors.insert(FormField::Email, MSG_EMAIL_INVALID);
        }
    }

    if values.department_id.trim().is_empty() {
        errors.insert(FormField::DepartmentId, MSG_DEPARTMENT_REQUIRED);
    }

    if mode == FormMode::Create && values.setup_mode == SetupMode::Password {
        let password = values.password.trim();
        let confirm = values.confirm_password.trim();

        if password.is_empty() {
            errors.insert(FormField::Password, MSG_PASSWORD_REQUIRED);
        } else if !password_meets_policy(password) {
            errors.insert(FormField::Password, MSG_PASSWORD_POLICY);
        }

        if confirm.is_empty() {
            errors.insert(FormField::ConfirmPassword, MSG_CONFIRM_REQUIRED);
        } else if confirm != password {
            errors.insert(FormField::ConfirmPassword, MSG_CONFIRM_MISMATCH);
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> UserFormValues {
        UserFormValues {
            name: "Somchai".to_string(),
            email: "somchai@example.co.th".to_string(),
            department_id: "dep-1".to_string(),
            setup_mode: SetupMode::Password,
            password: "abcdefg1".to_string(),
            confirm_password: "abcdefg1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_view_mode_never_reports_errors() {
        let garbage = UserFormValues {
            email: "not an email".to_string(),
            setup_mode: SetupMode::Password,
            password: "x".to_string(),
            ..Default::default()
        };
        assert!(validate_user_form(&garbage, FormMode::View).is_empty());
    }

    #[test]
    fn test_valid_create_form_passes() {
        assert!(validate_user_form(&valid_create(), FormMode::Create).is_empty());
    }

    #[test]
    fn test_email_is_only_checked_on_create() {
        let mut values = valid_create();
        values.email = String::new();

        let create = validate_user_form(&values, FormMode::Create);
        assert_eq!(create.get(&FormField::Email), Some(&MSG_EMAIL_REQUIRED));

        let edit = validate_user_form(&values, FormMode::Edit);
        assert!(!edit.contains_key(&FormField::Email));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@c.com"));

        let mut values = valid_create();
        values.email = "somchai@example".to_string();
        let errors = validate_user_form(&values, FormMode::Create);
        assert_eq!(errors.get(&FormField::Email), Some(&MSG_EMAIL_INVALID));
    }

    #[test]
    fn test_required_fields_in_edit_mode() {
        let values = UserFormValues {
            name: "   ".to_string(),
            ..Default::default()
        };
        let errors = validate_user_form(&values, FormMode::Edit);
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key(&FormField::Name));
        assert!(errors.contains_key(&FormField::DepartmentId));
    }

    #[test]
    fn test_password_policy() {
        assert!(password_meets_policy("abcdefg1"));
        assert!(!password_meets_policy("abcdefg"));
        assert!(!password_meets_policy("short1"));
        assert!(!password_meets_policy("12345678"));
    }

    #[test]
    fn test_passwords_only_required_for_password_setup_on_create() {
        let mut values = valid_create();
        values.password = String::new();
        values.confirm_password = String::new();

        let errors = validate_user_form(&values, FormMode::Create);
        assert_eq!(errors.get(&FormField::Password), Some(&MSG_PASSWORD_REQUIRED));
        assert_eq!(
            errors.get(&FormField::ConfirmPassword),
            Some(&MSG_CONFIRM_REQUIRED)
        );

        values.setup_mode = SetupMode::Invite;
        assert!(validate_user_form(&values, FormMode::Create).is_empty());

        values.setup_mode = SetupMode::Password;
        assert!(validate_user_form(&values, FormMode::Edit).is_empty());
    }

    #[test]
    fn test_confirm_password_must_match_after_trim() {
        let mut values = valid_create();
        values.confirm_password = " abcdefg1 ".to_string();
        assert!(validate_user_form(&values, FormMode::Create).is_empty());

        values.confirm_password = "abcdefg2".to_string();
        let errors = validate_user_form(&values, FormMode::Create);
        assert_eq!(
            errors.get(&FormField::ConfirmPassword),
            Some(&MSG_CONFIRM_MISMATCH)
        );
    }
}
