//! StoryDraft domain type

use serde::Serialize;
use std::fmt;

/// How a draft came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DraftOrigin {
    /// First draft from the storyteller
    Generated,
    /// Automated revision driven by the judge
    Revised,
    /// Revision that also applied user feedback
    UserRevised,
}

impl fmt::Display for DraftOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => write!(f, "generated"),
            Self::Revised => write!(f, "revised"),
            Self::UserRevised => write!(f, "user-revised"),
        }
    }
}

/// One version of the story
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryDraft {
    /// Full story text exactly as the model returned it
    pub text: String,

    /// 0 for the first draft, incremented by every revision
    pub version: u32,

    pub origin: DraftOrigin,
}

impl StoryDraft {
    /// The first draft of a run
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: 0,
            origin: DraftOrigin::Generated,
        }
    }

    /// A new draft that replaces `self`
    pub fn succeed(&self, text: impl Into<String>, origin: DraftOrigin) -> Self {
        Self {
            text: text.into(),
            version: self.version + 1,
            origin,
        }
    }
}
