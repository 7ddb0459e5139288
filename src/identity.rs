// =============================================================================
// IDENTITY MODULE
// =============================================================================
// Canonicalizes the loosely-typed role/status strings coming from the backend
// and derives a stable key for user rows whose id may still be blank.
// =============================================================================

use crate::models::{Role, UserAccount, UserStatus};

/// Anything other than exactly `"admin"` is displayed as an employee.
///
/// This is a display default, not an authorization decision.
pub fn normalize_role(role: Option<&str>) -> Role {
    match role {
        Some("admin") => Role::Admin,
        _ => Role::Employee,
    }
}

/// `"inactive"` and `"pending"` pass through; everything else is active.
pub fn normalize_status(status: Option<&str>) -> UserStatus {
    match status {
        Some("inactive") => UserStatus::Inactive,
        Some("pending") => UserStatus::Pending,
        _ => UserStatus::Active,
    }
}

/// Stable, non-empty key for rendering a user row.
///
/// Priority: trimmed id, trimmed lowercased email, trimmed emp_code, then a
/// `name-tel` composite with `user`/`na` placeholders.
pub fn user_list_key(user: &UserAccount) -> String {
    let id = user.id.trim();
    if !id.is_empty() {
        return id.to_string();
    }

    let email = user.email.trim().to_lowercase();
    if !email.is_empty() {
        return email;
    }

    let emp_code = user.emp_code.trim();
    if !emp_code.is_empty() {
        return emp_code.to_string();
    }

    composite_key(&user.name, &user.tel)
}

pub(crate) fn composite_key(name: &str, tel: &str) -> String {
    let name = if name.is_empty() { "user" } else { name };
    let tel = if tel.is_empty() { "na" } else { tel };
    format!("{}-{}", name, tel)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn user(id: &str, email: &str, name: &str) -> UserAccount {
        UserAccount {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            tel: String::new(),
            department_id: String::new(),
            department_name: String::new(),
            role: Role::Employee,
            status: UserStatus::Active,
            nickname: String::new(),
            emp_code: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_normalize_role() {
        assert_eq!(normalize_role(Some("admin")), Role::Admin);
        assert_eq!(normalize_role(Some("Admin")), Role::Employee);
        assert_eq!(normalize_role(Some("superuser")), Role::Employee);
        assert_eq!(normalize_role(None), Role::Employee);
    }

    #[test]
    fn test_normalize_status() {
        assert_eq!(normalize_status(Some("inactive")), UserStatus::Inactive);
        assert_eq!(normalize_status(Some("pending")), UserStatus::Pending);
        assert_eq!(normalize_status(Some("active")), UserStatus::Active);
        assert_eq!(normalize_status(Some("banned")), UserStatus::Active);
        assert_eq!(normalize_status(None), UserStatus::Active);
    }

    #[test]
    fn test_list_key_priority() {
        assert_eq!(user_list_key(&user("  emp-001 ", "a@x.com", "A")), "emp-001");
        assert_eq!(user_list_key(&user(" ", " A@X.com ", "A")), "a@x.com");

        let mut coded = user("", "", "A");
        coded.emp_code = " E-17 ".to_string();
        assert_eq!(user_list_key(&coded), "E-17");

        let mut composite = user("", "", "Somchai");
        composite.tel = "0812345678".to_string();
        assert_eq!(user_list_key(&composite), "Somchai-0812345678");

        assert_eq!(user_list_key(&user("", "", "")), "user-na");
    }
}
