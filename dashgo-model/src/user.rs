//! Admin-facing user record
//!
//! The listing view renders one [`User`] per row: display name, e-mail and
//! the registration date.

use chrono::{DateTime, Utc};

use crate::ids::UserId;

/// A registered user as returned by the users endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    pub id: UserId,
    /// Full name as entered on creation
    pub name: String,
    pub email: String,
    /// Timestamp of account creation
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Registration date in long form, e.g. `January 7, 2023`.
    pub fn registration_date(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> User {
        User {
            id: UserId::from(1),
            name: "Natalia Lima".to_string(),
            email: "natalia@example.com".to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 1, 7, 15, 30, 0).unwrap(),
        }
    }

    #[test]
    fn registration_date_uses_long_month_without_padding() {
        assert_eq!(sample().registration_date(), "January 7, 2023");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn decodes_rfc3339_created_at() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"name":"Natalia Lima","email":"natalia@example.com","created_at":"2023-01-07T15:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user, sample());
    }
}
