//! Rule-based request classifier
//!
//! Maps a free-text request onto one of six categories by keyword membership.
//! Rules are checked in table order and the first hit wins, so a request that
//! mentions both "sleep" and "ghost" is soothing, not sensitive.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Broad theme of a story request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Soothing,
    Adventure,
    Funny,
    Learning,
    Sensitive,
    General,
}

/// Keyword rules in priority order
///
/// `General` has no keywords; it is what is left when nothing matches.
pub const RULES: &[(Category, &[&str])] = &[
    (Category::Soothing, &["sleep", "calm", "relax", "goodnight", "soothing"]),
    (
        Category::Adventure,
        &["adventure", "quest", "journey", "explore", "dragon", "pirate"],
    ),
    (Category::Funny, &["funny", "silly", "joke", "hilarious", "laugh"]),
    (
        Category::Learning,
        &["teach", "learn", "lesson", "moral", "value", "kindness", "sharing"],
    ),
    (
        Category::Sensitive,
        &[
            "divorce", "death", "dead", "ghost", "haunted", "monster", "war", "battle", "kill", "murder", "scary",
            "afraid",
        ],
    ),
];

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Soothing,
        Category::Adventure,
        Category::Funny,
        Category::Learning,
        Category::Sensitive,
        Category::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Soothing => "soothing",
            Category::Adventure => "adventure",
            Category::Funny => "funny",
            Category::Learning => "learning",
            Category::Sensitive => "sensitive",
            Category::General => "general",
        }
    }

    /// Extra instructions handed to the storyteller for this category
    pub fn guidance(&self) -> &'static str {
        match self {
            Category::Soothing => {
                "Use an extra calm, sleepy tone with very gentle pacing and short, simple sentences."
            }
            Category::Adventure => {
                "Include a light, low-stakes adventure, but keep everything safe, non-violent and reassuring."
            }
            Category::Funny => {
                "Add light, child-friendly humor and silly moments, but avoid sarcasm or anything mean-spirited."
            }
            Category::Learning => "Emphasize a clear, simple lesson or moral, but keep the story fun and not preachy.",
            Category::Sensitive => {
                "The request touches on sensitive or potentially scary themes. \
                 Transform it into a completely safe, gentle, age-appropriate story. \
                 Remove heavy topics (for example divorce, death, war, ghosts that scare children) \
                 and replace them with comforting, child-friendly situations."
            }
            Category::General => "Default to a kind, gentle, age-appropriate bedtime tone.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Classify a request; pure, case-insensitive substring matching
pub fn classify(request: &str) -> Category {
    let text = request.to_lowercase();
    let category = RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General);
    debug!(%category, "classify: matched");
    category
}

/// Guidance for a category label; unknown labels get the general guidance
pub fn guidance_for(label: &str) -> &'static str {
    label
        .parse::<Category>()
        .unwrap_or(Category::General)
        .guidance()
}
