//! Photo sharing posts, likes and comments.

use crate::validate::{require_text, Validate};
use crate::{error::Result, Entity, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// A post in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Ids of users who liked the post.
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    /// Likes after `user_id` toggles their like.
    pub fn likes_toggled(&self, user_id: &str) -> Vec<String> {
        if self.liked_by(user_id) {
            self.likes
                .iter()
                .filter(|id| id.as_str() != user_id)
                .cloned()
                .collect()
        } else {
            let mut likes = self.likes.clone();
            likes.push(user_id.to_string());
            likes
        }
    }

    /// Comments with `comment` appended (or replaced, if already present).
    pub fn comments_with(&self, comment: Comment) -> Vec<Comment> {
        let mut comments = self.comments.clone();
        match comments.iter_mut().find(|c| c.id == comment.id) {
            Some(existing) => *existing = comment,
            None => comments.push(comment),
        }
        comments
    }
}

/// Partial update of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

impl Entity for Post {
    type Id = String;
    type Patch = PostPatch;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, patch: &PostPatch) {
        if let Some(caption) = &patch.caption {
            self.caption = caption.clone();
        }
        if let Some(likes) = &patch.likes {
            self.likes = likes.clone();
        }
        if let Some(comments) = &patch.comments {
            self.comments = comments.clone();
        }
    }
}

impl Validate for PostPatch {
    fn validate(&self) -> Result<()> {
        if let Some(caption) = &self.caption {
            require_text("caption", caption)?;
        }
        Ok(())
    }
}

/// New post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    #[serde(default)]
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Validate for CreatePost {
    fn validate(&self) -> Result<()> {
        if self.caption.trim().is_empty() && self.image.is_none() {
            return Err(Error::validation("post", "needs a caption or an image"));
        }
        Ok(())
    }
}

/// New comment body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub text: String,
}

impl Validate for NewComment {
    fn validate(&self) -> Result<()> {
        require_text("text", &self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post() -> Post {
        serde_json::from_value(json!({
            "_id": "p1",
            "caption": "sunset",
            "likes": ["u2"]
        }))
        .unwrap()
    }

    #[test]
    fn patch_rejects_blank_caption() {
        let patch = PostPatch {
            caption: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(patch.validate(), Err(Error::Validation { .. })));

        let likes_only = PostPatch {
            likes: Some(vec!["u1".into()]),
            ..Default::default()
        };
        assert!(likes_only.validate().is_ok());
    }

    #[test]
    fn toggling_likes() {
        let post = post();
        assert_eq!(post.likes_toggled("u1"), vec!["u2", "u1"]);
        assert!(post.likes_toggled("u2").is_empty());
    }

    #[test]
    fn comments_append_without_duplicates() {
        let post = post();
        let comment = Comment {
            id: "c1".into(),
            text: "nice".into(),
            author: Some("u2".into()),
        };

        let comments = post.comments_with(comment.clone());
        assert_eq!(comments.len(), 1);

        let mut post = post;
        post.apply_patch(&PostPatch {
            comments: Some(comments),
            ..Default::default()
        });
        assert_eq!(post.comments_with(comment).len(), 1);
    }

    #[test]
    fn create_post_needs_content() {
        let empty = CreatePost {
            caption: " ".into(),
            image: None,
        };
        assert!(empty.validate().is_err());

        let image_only = CreatePost {
            caption: String::new(),
            image: Some("data:image/png;base64,AAAA".into()),
        };
        assert!(image_only.validate().is_ok());
    }
}
