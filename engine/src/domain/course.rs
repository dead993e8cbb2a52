//! Learning management: courses, lectures and per-user progress.

use crate::validate::{require_text, Validate};
use crate::{error::Result, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseLevel {
    Beginner,
    Medium,
    Advance,
}

/// A lecture inside a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub is_preview_free: bool,
}

/// The signed-in user's progress through a course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    #[serde(default)]
    pub viewed_lectures: Vec<String>,
    #[serde(default)]
    pub completed: bool,
}

impl CourseProgress {
    pub fn has_viewed(&self, lecture_id: &str) -> bool {
        self.viewed_lectures.iter().any(|id| id == lecture_id)
    }
}

/// A course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub level: Option<CourseLevel>,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub lectures: Vec<Lecture>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub progress: CourseProgress,
}

impl Course {
    /// Progress after viewing `lecture_id`. The course completes once every
    /// lecture has been viewed.
    pub fn progress_after_viewing(&self, lecture_id: &str) -> CourseProgress {
        let mut progress = self.progress.clone();
        if !progress.has_viewed(lecture_id) {
            progress.viewed_lectures.push(lecture_id.to_string());
        }
        progress.completed = !self.lectures.is_empty()
            && self
                .lectures
                .iter()
                .all(|lecture| progress.has_viewed(&lecture.id));
        progress
    }

    /// Progress after marking the whole course complete or incomplete.
    pub fn progress_marked(&self, completed: bool) -> CourseProgress {
        let viewed_lectures = if completed {
            self.lectures.iter().map(|l| l.id.clone()).collect()
        } else {
            Vec::new()
        };
        CourseProgress {
            viewed_lectures,
            completed,
        }
    }

    /// Share of lectures viewed, 0-100.
    pub fn percent_complete(&self) -> u8 {
        if self.lectures.is_empty() {
            return if self.progress.completed { 100 } else { 0 };
        }
        let viewed = self
            .lectures
            .iter()
            .filter(|lecture| self.progress.has_viewed(&lecture.id))
            .count();
        ((viewed * 100) / self.lectures.len()) as u8
    }
}

/// Partial update of a course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<CourseLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<CourseProgress>,
}

impl Entity for Course {
    type Id = String;
    type Patch = CoursePatch;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, patch: &CoursePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(subtitle) = &patch.subtitle {
            self.subtitle = Some(subtitle.clone());
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(level) = patch.level {
            self.level = Some(level);
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(published) = patch.is_published {
            self.is_published = published;
        }
        if let Some(progress) = &patch.progress {
            self.progress = progress.clone();
        }
    }
}

impl Validate for CoursePatch {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("courseTitle", title)?;
        }
        Ok(())
    }
}

/// New course, as created by an instructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    #[serde(rename = "courseTitle")]
    pub title: String,
    pub category: String,
}

impl Validate for CreateCourse {
    fn validate(&self) -> Result<()> {
        require_text("courseTitle", &self.title)?;
        require_text("category", &self.category)
    }
}
