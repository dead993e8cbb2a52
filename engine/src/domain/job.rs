//! Job portal listings and search filters.

use crate::validate::{require_positive, require_text, Validate};
use crate::{error::Result, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub salary: u64,
    pub location: String,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default = "default_positions")]
    pub position: u32,
    #[serde(default)]
    pub company: Option<String>,
    /// Ids of users who applied.
    #[serde(default)]
    pub applications: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_positions() -> u32 {
    1
}

impl Job {
    pub fn has_applied(&self, user_id: &str) -> bool {
        self.applications.iter().any(|id| id == user_id)
    }
}

/// Partial update of a job posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<String>>,
}

impl Entity for Job {
    type Id = String;
    type Patch = JobPatch;

    fn id(&self) -> &String {
        &self.id
    }

    fn apply_patch(&mut self, patch: &JobPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(salary) = patch.salary {
            self.salary = salary;
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(applications) = &patch.applications {
            self.applications = applications.clone();
        }
    }
}

impl Validate for JobPatch {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(position) = self.position {
            require_positive("position", u64::from(position))?;
        }
        Ok(())
    }
}

/// New job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostJob {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub salary: u64,
    pub location: String,
    pub job_type: String,
    pub position: u32,
    pub company_id: String,
}

impl Validate for PostJob {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        require_text("location", &self.location)?;
        require_text("companyId", &self.company_id)?;
        require_positive("position", u64::from(self.position))
    }
}

/// Search filters applied to the job list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
}

impl JobFilter {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether a job passes every set filter.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(keyword) = self.keyword.as_deref().map(str::trim) {
            if !keyword.is_empty() {
                let keyword = keyword.to_lowercase();
                let hit = job.title.to_lowercase().contains(&keyword)
                    || job.description.to_lowercase().contains(&keyword)
                    || job
                        .company
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&keyword));
                if !hit {
                    return false;
                }
            }
        }

        if let Some(location) = &self.location {
            if !job.location.eq_ignore_ascii_case(location) {
                return false;
            }
        }

        if self.min_salary.is_some_and(|min| job.salary < min) {
            return false;
        }
        if self.max_salary.is_some_and(|max| job.salary > max) {
            return false;
        }

        true
    }
}
