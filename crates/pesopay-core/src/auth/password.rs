//! Password strength feedback for registration and password-change forms.

/// Minimum length accepted for a new password
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Fair,
    Good,
    Strong,
}

impl std::fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordStrength::Weak => write!(f, "Weak"),
            PasswordStrength::Fair => write!(f, "Fair"),
            PasswordStrength::Good => write!(f, "Good"),
            PasswordStrength::Strong => write!(f, "Strong"),
        }
    }
}

/// Score a candidate password for UI feedback.
///
/// Anything under the minimum length is Weak regardless of content. Above
/// that, the score counts character classes (lower, upper, digit, symbol)
/// with a bonus for 12+ characters.
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.len() < MIN_PASSWORD_LEN {
        return PasswordStrength::Weak;
    }

    let mut classes = 0;
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        classes += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        classes += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        classes += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        classes += 1;
    }

    let score = classes + usize::from(password.len() >= 12);
    match score {
        0..=2 => PasswordStrength::Fair,
        3 => PasswordStrength::Good,
        _ => PasswordStrength::Strong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_passwords_are_weak() {
        assert_eq!(password_strength(""), PasswordStrength::Weak);
        assert_eq!(password_strength("Ab1!x"), PasswordStrength::Weak);
        assert_eq!(password_strength("1234567"), PasswordStrength::Weak);
    }

    #[test]
    fn single_class_is_fair() {
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::Fair);
        assert_eq!(password_strength("12345678"), PasswordStrength::Fair);
    }

    #[test]
    fn three_classes_are_good() {
        assert_eq!(password_strength("Secret123"), PasswordStrength::Good);
    }

    #[test]
    fn mixed_long_passwords_are_strong() {
        assert_eq!(password_strength("Secret123!"), PasswordStrength::Strong);
        assert_eq!(password_strength("correct-horse-Battery9"), PasswordStrength::Strong);
    }

    #[test]
    fn strength_ordering_supports_threshold_checks() {
        assert!(password_strength("Secret123!") >= PasswordStrength::Good);
        assert!(password_strength("short") < PasswordStrength::Fair);
    }
}
