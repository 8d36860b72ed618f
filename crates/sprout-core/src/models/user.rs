use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Maximum length of an email address (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// User identifier. The login endpoint may send either a number or a string.
///
/// Numbers are kept as JSON numbers, so ids beyond `i64` or with a
/// fractional part survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(Number),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Number(id.into())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}

/// Profile of the signed-in user. Replaced wholesale on every login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    /// Name to show in greetings, falling back to the email address.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Check that a string is a syntactically valid email address.
///
/// This is a structural check (one `@`, a non-empty local part, a dotted
/// domain with an alphabetic top-level label), not an RFC 5322 parser.
pub fn is_valid_email(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_EMAIL_LENGTH || s.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };

    if local.is_empty()
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
        || domain.contains('@')
    {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);

    labels_ok && tld_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@example.co.uk"));
        assert!(is_valid_email("user+tag@sub-domain.example.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@exa mple.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email("user@-example.com"));
        assert!(!is_valid_email("user..name@example.com"));
        assert!(!is_valid_email("user@example..com"));
    }

    #[test]
    fn test_user_id_accepts_number_or_string() {
        let numeric: User =
            serde_json::from_str(r#"{"id":1,"name":"A","email":"a@b.com"}"#).unwrap();
        assert_eq!(numeric.id, UserId::from(1));

        let text: User =
            serde_json::from_str(r#"{"id":"u-42","name":"A","email":"a@b.com"}"#).unwrap();
        assert_eq!(text.id, UserId::Text("u-42".to_string()));
    }

    #[test]
    fn test_user_id_accepts_numbers_outside_i64() {
        let big: User = serde_json::from_str(
            r#"{"id":18446744073709551615,"name":"A","email":"a@b.com"}"#,
        )
        .unwrap();
        assert_eq!(big.id, UserId::Number(u64::MAX.into()));
        assert_eq!(big.id.to_string(), "18446744073709551615");

        let fractional: User =
            serde_json::from_str(r#"{"id":1.5,"name":"A","email":"a@b.com"}"#).unwrap();
        assert_eq!(fractional.id.to_string(), "1.5");
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId::from(7).to_string(), "7");
        assert_eq!(UserId::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User {
            id: UserId::from(1),
            name: "  ".to_string(),
            email: "a@b.com".to_string(),
        };
        assert_eq!(user.display_name(), "a@b.com");
    }
}
