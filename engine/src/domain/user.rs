//! The signed-in user.

use crate::validate::{require_text, Validate};
use crate::{error::Result, Entity};
use serde::{Deserialize, Serialize};

/// A user profile as returned by the session endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Profile edit. Also the partial update applied locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl Entity for User {
    type Id = String;
    type Patch = UserPatch;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(username) = &patch.username {
            self.username = username.clone();
        }
        if let Some(bio) = &patch.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(picture) = &patch.profile_picture {
            self.profile_picture = Some(picture.clone());
        }
    }
}

impl Validate for UserPatch {
    fn validate(&self) -> Result<()> {
        if let Some(username) = &self.username {
            require_text("username", username)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_minimal_user() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "username": "ada",
            "email": "ada@example.com"
        }))
        .unwrap();

        assert_eq!(user.id, "u1");
        assert!(user.bio.is_none());
    }

    #[test]
    fn patch_touches_given_fields() {
        let mut user: User = serde_json::from_value(json!({
            "_id": "u1",
            "username": "ada",
            "email": "ada@example.com",
            "profilePicture": "a.png"
        }))
        .unwrap();

        user.apply_patch(&UserPatch {
            bio: Some("engineer".into()),
            ..Default::default()
        });

        assert_eq!(user.bio.as_deref(), Some("engineer"));
        assert_eq!(user.username, "ada");
        assert_eq!(user.profile_picture.as_deref(), Some("a.png"));
    }

    #[test]
    fn blank_username_rejected() {
        let patch = UserPatch {
            username: Some(" ".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(UserPatch::default().validate().is_ok());
    }
}
