//! Progress notifications from the story loop

use crate::domain::StoryDraft;
use crate::story::Evaluation;

use super::Termination;

/// Something the loop just did
#[derive(Debug, Clone, Copy)]
pub enum LoopEvent<'a> {
    /// A new draft exists (first draft or any revision)
    DraftReady { draft: &'a StoryDraft },
    /// The judge scored the current draft
    Evaluated { evaluation: &'a Evaluation, round: u32 },
    /// An automated revision is about to run
    Revising { revision: u32, max_revisions: u32 },
    /// The automated phase ended
    Accepted { termination: Termination },
    /// User feedback is about to be applied
    ApplyingFeedback { feedback: &'a str },
    /// The feedback pass was judged and the run is over
    Finished,
}

/// Receives loop events as they happen
pub trait LoopObserver: Send {
    fn on_event(&mut self, event: &LoopEvent<'_>);
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl LoopObserver for NoopObserver {
    fn on_event(&mut self, _event: &LoopEvent<'_>) {}
}
