//! User profile types for stashbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Display profile of a user, keyed by the external identity.
///
/// The email and name here are snapshotted into payment transaction
/// records at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// The owning user.
    pub user_id: UserId,

    /// Contact email.
    pub email: String,

    /// Given name.
    pub first_name: String,

    /// Family name.
    pub last_name: String,

    /// Optional avatar URL.
    pub photo_url: Option<String>,

    /// When the profile was first created.
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Full display name, `"first last"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_parts() {
        let profile = Profile {
            user_id: UserId::generate(),
            email: "jane@example.com".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            photo_url: None,
            created_at: Utc::now(),
        };
        assert_eq!(profile.display_name(), "Jane Doe");
    }
}
