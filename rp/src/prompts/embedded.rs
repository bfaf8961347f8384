//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// System prompt for course planning
pub const COURSE: &str = include_str!("../../prompts/course.pmt");

/// System prompt for the course chat
pub const CHAT: &str = include_str!("../../prompts/chat.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "course" => Some(COURSE),
        "chat" => Some(CHAT),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_course() {
        let course = get_embedded("course").unwrap();
        assert!(course.contains("{{places}}"));
        assert!(course.contains("selected_places"));
        assert!(course.contains("sequence"));
    }

    #[test]
    fn test_get_embedded_chat() {
        assert!(get_embedded("chat").unwrap().contains("{{course_json}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
