//! Task entries polled by the frontend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Course;

/// Random identifier of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status and result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub done: bool,
    pub success: bool,
    pub course: Option<Course>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskEntry {
    /// A freshly submitted, still running task
    pub fn pending() -> Self {
        let now = Utc::now();
        Self {
            done: false,
            success: false,
            course: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a successful run
    pub fn succeed(&mut self, course: Course) {
        self.done = true;
        self.success = true;
        self.course = Some(course);
        self.error = None;
        self.updated_at = Utc::now();
    }

    /// Record a failed run
    pub fn fail(&mut self, error: impl Into<String>) {
        self.done = true;
        self.success = false;
        self.course = None;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// The course, only when the run succeeded
    pub fn successful_course(&self) -> Option<&Course> {
        if self.success { self.course.as_ref() } else { None }
    }
}
