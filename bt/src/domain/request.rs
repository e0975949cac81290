//! StoryRequest domain type

use serde::Serialize;
use std::fmt;
use tracing::debug;

/// What the user asked for, verbatim
///
/// Opaque text, immutable for the lifetime of a run. Any text is a valid
/// request, blank included; it classifies as general.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StoryRequest(String);

impl StoryRequest {
    /// Create a request from user input, kept as typed
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        debug!(len = text.len(), "StoryRequest::new: called");
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoryRequest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_keeps_text_verbatim() {
        let req = StoryRequest::new("  A story about a brave little turtle  ");
        assert_eq!(req.as_str(), "  A story about a brave little turtle  ");
        assert_eq!(req.to_string(), req.as_str());
    }

    #[test]
    fn test_blank_request_accepted() {
        assert_eq!(StoryRequest::new("").as_str(), "");
        assert_eq!(StoryRequest::new(" \n\t").as_str(), " \n\t");
    }

    #[test]
    fn test_request_serializes_as_string() {
        let req = StoryRequest::new("a cat");
        assert_eq!(serde_json::to_string(&req).unwrap(), "\"a cat\"");
    }
}
