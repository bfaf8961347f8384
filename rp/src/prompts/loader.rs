//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::{Course, TimeConstraints, UserPreferences};

/// Context for the course planning prompt
#[derive(Debug, Clone, Serialize)]
pub struct CoursePromptContext {
    /// Formatted candidate list, one place per line
    pub places: String,
    pub theme: String,
    pub location: String,
    pub group_size: String,
    pub visit_date: String,
    pub visit_time: String,
    pub transportation: String,
    pub time_constraints: Option<TimeConstraints>,
    /// Weather summary line
    pub weather: Option<String>,
}

impl CoursePromptContext {
    pub fn new(places: String, preferences: &UserPreferences) -> Self {
        debug!(places_len = places.len(), theme = %preferences.theme, "CoursePromptContext::new: called");
        Self {
            places,
            theme: preferences.theme.clone(),
            location: preferences.location.clone(),
            group_size: preferences.group_size.clone(),
            visit_date: preferences.visit_date.clone(),
            visit_time: preferences.visit_time.clone(),
            transportation: preferences.transportation.clone(),
            time_constraints: None,
            weather: None,
        }
    }

    pub fn with_time_constraints(mut self, constraints: Option<TimeConstraints>) -> Self {
        self.time_constraints = constraints;
        self
    }

    pub fn with_weather(mut self, weather: Option<String>) -> Self {
        self.weather = weather;
        self
    }
}

/// Context for the course chat prompt
#[derive(Debug, Clone, Serialize)]
pub struct ChatPromptContext {
    pub location: String,
    /// Pretty-printed course JSON
    pub course_json: String,
}

impl ChatPromptContext {
    pub fn from_course(course: &Course) -> Result<Self> {
        debug!(place_count = course.places.len(), "ChatPromptContext::from_course: called");
        Ok(Self {
            location: course.location.clone().unwrap_or_default(),
            course_json: serde_json::to_string_pretty(course)?,
        })
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.routepick/prompts/`)
    user_dir: Option<PathBuf>,
}

fn engine() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    // Prompts are plain text, not HTML
    hbs.register_escape_fn(handlebars::no_escape);
    hbs
}

impl PromptLoader {
    /// Create a loader that checks `user_dir` before the embedded prompts
    pub fn new(user_dir: impl AsRef<Path>) -> Self {
        let user_dir = user_dir.as_ref();
        let exists = user_dir.is_dir();
        debug!(?user_dir, %exists, "PromptLoader::new: called");
        Self {
            hbs: engine(),
            user_dir: exists.then(|| user_dir.to_path_buf()),
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: engine(),
            user_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `{user_dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in user override");
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Render the course planning prompt
    pub fn course_prompt(&self, context: &CoursePromptContext) -> Result<String> {
        debug!("PromptLoader::course_prompt: called");
        self.render("course", context)
    }

    /// Render the chat prompt
    pub fn chat_prompt(&self, context: &ChatPromptContext) -> Result<String> {
        debug!("PromptLoader::chat_prompt: called");
        self.render("chat", context)
    }
}
