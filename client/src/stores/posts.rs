//! Post feed store.

use std::sync::Arc;

use stash_engine::domain::{Comment, CreatePost, NewComment, Post, PostPatch};
use stash_engine::{envelope, Position, Reconciliation, Validate};

use crate::binding::EpochToken;
use crate::error::Result;
use crate::store::{ErrorPolicy, Outcome, RemoteStore, Routes};
use crate::transport::{ApiRequest, Transport};

const POSTS_PATH: &str = "/api/v1/post";

/// The feed, newest first.
#[derive(Debug)]
pub struct PostStore {
    posts: RemoteStore<Post>,
}

impl PostStore {
    pub fn new(transport: Arc<dyn Transport>, policy: ErrorPolicy) -> Self {
        let routes = Routes::new(POSTS_PATH, "posts", "post").prepend();
        Self {
            posts: RemoteStore::new("posts", transport, routes, policy),
        }
    }

    pub async fn fetch_all(&self, token: &EpochToken) -> Outcome {
        let request = ApiRequest::get(format!("{}/all", POSTS_PATH));
        self.posts.fetch_with(request, "posts", token).await
    }

    pub async fn create(&self, post: &CreatePost, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::post(format!("{}/addpost", POSTS_PATH));
        self.posts
            .create_with(request, post, "post", Position::Prepend, token)
            .await
    }

    pub async fn remove(&self, id: &str, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::delete(format!("{}/delete/{}", POSTS_PATH, id));
        self.posts.remove_with(request, id.to_string(), token).await
    }

    /// Like or unlike a post as `user_id`, depending on whether they already
    /// like it.
    pub async fn toggle_like(&self, id: &str, user_id: &str, token: &EpochToken) -> Result<Outcome> {
        let liked = self
            .posts
            .get(&id.to_string())
            .is_some_and(|post| post.liked_by(user_id));
        let action = if liked { "dislike" } else { "like" };
        let request = ApiRequest::get(format!("{}/{}/{}", POSTS_PATH, id, action));
        let (id, user_id) = (id.to_string(), user_id.to_string());

        self.posts
            .confirm_with(
                request,
                None::<&serde_json::Value>,
                move |current| {
                    let post = current.get(&id)?;
                    // Already in the requested state
                    if post.liked_by(&user_id) != liked {
                        return None;
                    }
                    let likes = post.likes_toggled(&user_id);
                    Some(Reconciliation::Update {
                        id,
                        confirmed: None,
                        patch: PostPatch {
                            likes: Some(likes),
                            ..Default::default()
                        },
                    })
                },
                token,
            )
            .await
    }

    /// Comment on a post. The confirmed comment is appended to the post.
    pub async fn comment(&self, id: &str, text: &str, token: &EpochToken) -> Result<Outcome> {
        let input = NewComment {
            text: text.to_string(),
        };
        if let Err(e) = input.validate() {
            return self.posts.reject(e.into());
        }
        let request = match ApiRequest::post(format!("{}/{}/comment", POSTS_PATH, id)).json(&input) {
            Ok(request) => request,
            Err(e) => return self.posts.reject(e),
        };
        let id = id.to_string();

        self.posts
            .execute(
                token,
                "comment",
                request,
                |body| envelope::decode_payload::<Comment>(body, "comment"),
                move |comment, current| {
                    let comments = current.get(&id)?.comments_with(comment);
                    Some(Reconciliation::Update {
                        id,
                        confirmed: None,
                        patch: PostPatch {
                            comments: Some(comments),
                            ..Default::default()
                        },
                    })
                },
            )
            .await
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.entities()
    }

    pub fn get(&self, id: &str) -> Option<Post> {
        self.posts.get(&id.to_string())
    }

    pub fn store(&self) -> &RemoteStore<Post> {
        &self.posts
    }
}
