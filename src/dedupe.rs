// =============================================================================
// DEDUPE MODULE
// =============================================================================
// Collapses accidental duplicates in a fetched user list to one row per
// real-world identity, keeping the most recently updated row.
// =============================================================================

use std::collections::HashMap;

use crate::identity::composite_key;
use crate::models::UserAccount;

/// Identity key used to decide whether two rows are the same user.
///
/// Keys are namespaced so an id can never collide with an email.
pub fn identity_key(user: &UserAccount) -> String {
    let id = user.id.trim();
    if !id.is_empty() {
        return format!("id:{}", id);
    }

    let email = user.email.trim().to_lowercase();
    if !email.is_empty() {
        return format!("email:{}", email);
    }

    let emp_code = user.emp_code.trim();
    if !emp_code.is_empty() {
        return format!("code:{}", emp_code);
    }

    format!("fallback:{}", composite_key(user.name.trim(), user.tel.trim()))
}

/// One row per identity key, in first-seen order.
///
/// Within a group the row with the latest `updated_at` wins; a missing
/// timestamp counts as oldest, and on a tie the earlier row is kept.
pub fn dedupe_users_by_identity(users: Vec<UserAccount>) -> Vec<UserAccount> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(users.len());
    let mut kept: Vec<UserAccount> = Vec::with_capacity(users.len());

    for user in users {
        let key = identity_key(&user);
        match slots.get(&key) {
            Some(&slot) => {
                if user.updated_at > kept[slot].updated_at {
                    kept[slot] = user;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(user);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::tests::user;
    use chrono::{DateTime, Utc};

    fn at(iso: &str) -> Option<DateTime<Utc>> {
        Some(
            DateTime::parse_from_rfc3339(iso)
                .expect("valid timestamp")
                .with_timezone(&Utc),
        )
    }

    fn stamped(id: &str, email: &str, name: &str, updated: &str) -> UserAccount {
        let mut u = user(id, email, name);
        u.updated_at = at(updated);
        u
    }

    #[test]
    fn test_keeps_newest_row_for_same_id() {
        let users = vec![
            stamped("emp-001", "", "Old", "2026-02-01T10:00:00.000Z"),
            stamped("emp-001", "", "New", "2026-02-02T10:00:00.000Z"),
        ];
        let deduped = dedupe_users_by_identity(users);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].name, "New");
    }

    #[test]
    fn test_newer_row_wins_regardless_of_position() {
        let users = vec![
            stamped("emp-001", "", "New", "2026-02-02T10:00:00.000Z"),
            stamped("emp-001", "", "Old", "2026-02-01T10:00:00.000Z"),
        ];
        assert_eq!(dedupe_users_by_identity(users)[0].name, "New");
    }

    #[test]
    fn test_blank_id_falls_back_to_case_insensitive_email() {
        let users = vec![
            stamped("", "duplicate@x.com", "First", "2026-01-01T00:00:00.000Z"),
            stamped("", " DUPLICATE@x.com ", "Second", "2026-01-05T00:00:00.000Z"),
        ];
        let deduped = dedupe_users_by_identity(users);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].name, "Second");
    }

    #[test]
    fn test_unrelated_blank_identities_stay_separate() {
        let mut a = user("", "", "Somchai");
        a.tel = "081".to_string();
        let mut b = user("", "", "Somsak");
        b.tel = "082".to_string();

        assert_eq!(dedupe_users_by_identity(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_preserves_first_seen_group_order() {
        let users = vec![
            stamped("b", "", "B1", "2026-01-01T00:00:00.000Z"),
            stamped("a", "", "A1", "2026-01-01T00:00:00.000Z"),
            stamped("b", "", "B2", "2026-03-01T00:00:00.000Z"),
        ];
        let names: Vec<_> = dedupe_users_by_identity(users)
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["B2", "A1"]);
    }

    #[test]
    fn test_missing_timestamp_loses_and_ties_keep_first() {
        let users = vec![
            user("x", "", "NoStamp"),
            stamped("x", "", "Stamped", "2026-01-01T00:00:00.000Z"),
            stamped("x", "", "SameStamp", "2026-01-01T00:00:00.000Z"),
        ];
        assert_eq!(dedupe_users_by_identity(users)[0].name, "Stamped");
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let users = vec![
            stamped("emp-001", "a@x.com", "Old", "2026-02-01T10:00:00.000Z"),
            stamped("", "b@x.com", "B", "2026-02-01T10:00:00.000Z"),
            stamped("emp-001", "a@x.com", "New", "2026-02-02T10:00:00.000Z"),
            stamped("", "B@X.COM", "B2", "2026-01-01T10:00:00.000Z"),
            user("", "", ""),
            user("", "", ""),
        ];
        let once = dedupe_users_by_identity(users);
        let twice = dedupe_users_by_identity(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }
}
