//! Prompt templates
//!
//! Handlebars templates for the planner and the chat assistant, loaded from
//! a user directory with embedded fallbacks.

mod embedded;
mod loader;

pub use embedded::get_embedded;
pub use loader::{ChatPromptContext, CoursePromptContext, PromptLoader};
