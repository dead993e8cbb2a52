//! Course store.

use std::sync::Arc;

use stash_engine::domain::{Course, CoursePatch, CourseProgress, CreateCourse};
use stash_engine::Reconciliation;

use crate::binding::EpochToken;
use crate::error::Result;
use crate::store::{ErrorPolicy, Outcome, RemoteStore, Routes};
use crate::transport::{ApiRequest, Transport};

const PUBLISHED_PATH: &str = "/api/v1/course/published";
const PROGRESS_PATH: &str = "/api/v1/progress";

/// Published courses with the signed-in user's progress.
#[derive(Debug)]
pub struct CourseStore {
    courses: RemoteStore<Course>,
}

impl CourseStore {
    pub fn new(transport: Arc<dyn Transport>, policy: ErrorPolicy) -> Self {
        let routes = Routes::new("/api/v1/course", "courses", "course");
        Self {
            courses: RemoteStore::new("courses", transport, routes, policy),
        }
    }

    pub async fn fetch_all(&self, token: &EpochToken) -> Outcome {
        self.courses
            .fetch_with(ApiRequest::get(PUBLISHED_PATH), "courses", token)
            .await
    }

    pub async fn create(&self, course: &CreateCourse, token: &EpochToken) -> Result<Outcome> {
        self.courses.create(course, token).await
    }

    pub async fn update(&self, id: &str, patch: &CoursePatch, token: &EpochToken) -> Result<Outcome> {
        self.courses.update_one(&id.to_string(), patch, token).await
    }

    pub async fn remove(&self, id: &str, token: &EpochToken) -> Result<Outcome> {
        self.courses.remove_one(&id.to_string(), token).await
    }

    /// Record that a lecture was watched. The course completes once every
    /// lecture has been viewed.
    pub async fn mark_lecture_viewed(&self, course_id: &str, lecture_id: &str, token: &EpochToken) -> Result<Outcome> {
        let request = ApiRequest::post(format!(
            "{}/{}/lecture/{}/view",
            PROGRESS_PATH, course_id, lecture_id
        ));
        let (course_id, lecture_id) = (course_id.to_string(), lecture_id.to_string());

        self.courses
            .confirm_with(
                request,
                None::<&serde_json::Value>,
                move |current| {
                    let course = current.get(&course_id)?;
                    let progress = course.progress_after_viewing(&lecture_id);
                    Some(progress_update(course_id, progress))
                },
                token,
            )
            .await
    }

    /// Mark a whole course complete or incomplete.
    pub async fn set_completed(&self, course_id: &str, completed: bool, token: &EpochToken) -> Result<Outcome> {
        let action = if completed { "complete" } else { "incomplete" };
        let request = ApiRequest::post(format!("{}/{}/{}", PROGRESS_PATH, course_id, action));
        let course_id = course_id.to_string();

        self.courses
            .confirm_with(
                request,
                None::<&serde_json::Value>,
                move |current| {
                    let progress = current.get(&course_id)?.progress_marked(completed);
                    Some(progress_update(course_id, progress))
                },
                token,
            )
            .await
    }

    pub fn courses(&self) -> Vec<Course> {
        self.courses.entities()
    }

    pub fn get(&self, id: &str) -> Option<Course> {
        self.courses.get(&id.to_string())
    }

    pub fn store(&self) -> &RemoteStore<Course> {
        &self.courses
    }
}

fn progress_update(id: String, progress: CourseProgress) -> Reconciliation<Course> {
    Reconciliation::Update {
        id,
        confirmed: None,
        patch: CoursePatch {
            progress: Some(progress),
            ..Default::default()
        },
    }
}
