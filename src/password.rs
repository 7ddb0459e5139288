// =============================================================================
// PASSWORD STRENGTH
// =============================================================================
// Advisory strength meter shown under the password field.
//
// NOTE: this does not gate submission. Submission uses
// `validation::password_meets_policy` (length, letter, digit), so a password
// can be accepted while still scoring "weak" here. Both rules are kept as
// they are.
// =============================================================================

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrengthChecks {
    pub length: bool,
    pub letter: bool,
    pub digit: bool,
    pub special: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLabel {
    Weak,
    Medium,
    Good,
    Strong,
}

impl StrengthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 | 1 => StrengthLabel::Weak,
            2 => StrengthLabel::Medium,
            3 => StrengthLabel::Good,
            _ => StrengthLabel::Strong,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub checks: StrengthChecks,
    /// Number of passing checks, 0..=4
    pub score: u8,
    pub label: StrengthLabel,
}

/// Scores the trimmed password against four independent checks.
pub fn score_password(password: &str) -> PasswordStrength {
    let password = password.trim();
    let checks = StrengthChecks {
        length: password.chars().count() >= 8,
        letter: password.chars().any(|c| c.is_ascii_alphabetic()),
        digit: password.chars().any(|c| c.is_ascii_digit()),
        special: password.chars().any(|c| !c.is_ascii_alphanumeric()),
    };
    let score = [checks.length, checks.letter, checks.digit, checks.special]
        .iter()
        .filter(|passed| **passed)
        .count() as u8;

    PasswordStrength {
        checks,
        score,
        label: StrengthLabel::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::password_meets_policy;

    #[test]
    fn test_labels_follow_score() {
        assert_eq!(score_password("").label, StrengthLabel::Weak);
        assert_eq!(score_password("").score, 0);
        assert_eq!(score_password("abc").label, StrengthLabel::Weak);
        assert_eq!(score_password("abc1").label, StrengthLabel::Medium);
        assert_eq!(score_password("abcdefg1").label, StrengthLabel::Good);
        assert_eq!(score_password("abcdefg1!").label, StrengthLabel::Strong);
        assert_eq!(score_password("abcdefg1!").score, 4);
    }

    #[test]
    fn test_whitespace_is_trimmed_before_scoring() {
        let strength = score_password("   ab1   ");
        assert!(!strength.checks.length);
        assert!(!strength.checks.special);
    }

    #[test]
    fn test_meter_and_submission_rule_are_independent() {
        // Passes the submit rule while the meter only says "good".
        assert!(password_meets_policy("abcdefg1"));
        assert_eq!(score_password("abcdefg1").label, StrengthLabel::Good);

        // Scores "good" but is rejected on submit (no digit).
        assert!(!password_meets_policy("abcdefg!"));
        assert_eq!(score_password("abcdefg!").label, StrengthLabel::Good);
    }
}
