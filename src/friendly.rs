// =============================================================================
// FRIENDLY ERROR MESSAGES
// =============================================================================
// Translates raw backend failure messages into something an admin can act
// on. Pure substring matching on the lowercased message: we do not depend on
// any backend's exact error codes.
// =============================================================================

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Permission,
    Duplicate,
    Other,
}

pub const MSG_NETWORK: &str =
    "Cannot reach the server. Check your connection and try again.";
pub const MSG_PERMISSION: &str = "You do not have permission to perform this action.";
pub const MSG_DUPLICATE: &str = "This value is already in use.";

const NETWORK_HINTS: &[&str] = &[
    "failed to fetch",
    "network",
    "connection refused",
    "connection reset",
    "timed out",
    "timeout",
];

const PERMISSION_HINTS: &[&str] = &[
    "row-level security",
    "row level security",
    "permission denied",
    "not allowed",
    "insufficient privilege",
    "unauthorized",
    "forbidden",
];

const DUPLICATE_HINTS: &[&str] = &[
    "duplicate",
    "unique constraint",
    "already exists",
    "already registered",
    "already in use",
];

pub fn classify(raw: &str) -> FailureKind {
    let message = raw.to_lowercase();
    let hit = |hints: &[&str]| hints.iter().any(|hint| message.contains(hint));

    // Permission before network: "permission denied ... (network policy)" is
    // still an authorization failure.
    if hit(PERMISSION_HINTS) {
        FailureKind::Permission
    } else if hit(DUPLICATE_HINTS) {
        FailureKind::Duplicate
    } else if hit(NETWORK_HINTS) {
        FailureKind::Network
    } else {
        FailureKind::Other
    }
}

/// Human message for a backend failure; unrecognized messages pass through.
pub fn friendly_message(raw: &str) -> String {
    match classify(raw) {
        FailureKind::Network => MSG_NETWORK.to_string(),
        FailureKind::Permission => MSG_PERMISSION.to_string(),
        FailureKind::Duplicate => MSG_DUPLICATE.to_string(),
        FailureKind::Other => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_common_backend_failures() {
        assert_eq!(classify("TypeError: Failed to fetch"), FailureKind::Network);
        assert_eq!(
            classify("new row violates row-level security policy for table \"locations\""),
            FailureKind::Permission
        );
        assert_eq!(classify("Insufficient privileges"), FailureKind::Permission);
        assert_eq!(
            classify("duplicate key value violates unique constraint \"employees_email_key\""),
            FailureKind::Duplicate
        );
        assert_eq!(classify("User already registered"), FailureKind::Duplicate);
        assert_eq!(classify("location is still referenced"), FailureKind::Other);
    }

    #[test]
    fn test_unrecognized_messages_pass_through() {
        assert_eq!(
            friendly_message("location is still referenced by 3 serials"),
            "location is still referenced by 3 serials"
        );
        assert_eq!(friendly_message("NOT ALLOWED"), MSG_PERMISSION);
    }
}
