//! StoryLoop - drafts, judges and revises one story

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::observer::{LoopEvent, LoopObserver, NoopObserver};
use super::{LoopConfig, LoopState, Termination};
use crate::domain::{StoryDraft, StoryRequest};
use crate::error::BedtimeError;
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;
use crate::story::{Category, Evaluation, Judge, Reviser, StoryGenerator, classify, is_acceptable};

/// Final result of a run
#[derive(Debug, Clone, Serialize)]
pub struct StoryOutcome {
    pub request: StoryRequest,
    pub category: Category,
    pub story: StoryDraft,
    pub evaluation: Evaluation,
    pub termination: Termination,
    /// Automated revisions performed (the feedback pass is not counted)
    pub revisions: u32,
    /// Judge calls made, including the one after user feedback
    pub judgings: u32,
    pub user_feedback: Option<String>,
}

/// Story loop controller
///
/// Every transition is one `step()`; `run()` steps until the automated
/// phase is accepted and `apply_feedback()` drives the optional last pass.
pub struct StoryLoop {
    request: StoryRequest,
    config: LoopConfig,
    generator: StoryGenerator,
    judge: Judge,
    reviser: Reviser,
    observer: Box<dyn LoopObserver>,

    state: LoopState,

    /// Automated revisions performed so far
    revisions: u32,

    judgings: u32,
    draft: Option<StoryDraft>,
    evaluation: Option<Evaluation>,
    termination: Option<Termination>,
    user_feedback: Option<String>,
}

impl StoryLoop {
    /// Create a loop for one request; the client is shared by all three steps
    pub fn new(request: StoryRequest, llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, config: LoopConfig) -> Self {
        debug!(
            threshold = config.acceptance_threshold,
            max_revisions = config.max_revisions,
            "StoryLoop::new: called"
        );
        Self {
            generator: StoryGenerator::new(llm.clone(), prompts.clone(), config.generation),
            judge: Judge::new(llm.clone(), prompts.clone(), config.judging),
            reviser: Reviser::new(llm, prompts, config.revision),
            request,
            config,
            observer: Box::new(NoopObserver),
            state: LoopState::Drafting,
            revisions: 0,
            judgings: 0,
            draft: None,
            evaluation: None,
            termination: None,
            user_feedback: None,
        }
    }

    /// Report progress to `observer`
    pub fn with_observer(mut self, observer: Box<dyn LoopObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn revisions(&self) -> u32 {
        self.revisions
    }

    pub fn judgings(&self) -> u32 {
        self.judgings
    }

    pub fn draft(&self) -> Option<&StoryDraft> {
        self.draft.as_ref()
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    fn invalid(&self, action: &'static str) -> BedtimeError {
        BedtimeError::InvalidState {
            action,
            state: self.state.to_string(),
        }
    }

    fn current_draft(&self) -> Result<&StoryDraft, BedtimeError> {
        self.draft.as_ref().ok_or_else(|| self.invalid("continue without a draft"))
    }

    fn current_evaluation(&self) -> Result<&Evaluation, BedtimeError> {
        self.evaluation
            .as_ref()
            .ok_or_else(|| self.invalid("revise without an evaluation"))
    }

    /// Perform exactly one transition and return the new state
    ///
    /// Stepping an accepted or finished loop is an error; use
    /// `apply_feedback` to leave `Accepted`. A failed step leaves the
    /// state unchanged.
    pub async fn step(&mut self) -> Result<LoopState, BedtimeError> {
        debug!(state = %self.state, "StoryLoop::step: called");
        let next = match self.state {
            LoopState::Drafting => {
                let draft = self.generator.generate(&self.request).await?;
                self.observer.on_event(&LoopEvent::DraftReady { draft: &draft });
                self.draft = Some(draft);
                LoopState::Judging
            }
            LoopState::Judging => {
                let evaluation = self.judge.evaluate(&self.request, self.current_draft()?).await?;
                self.judgings += 1;
                self.observer.on_event(&LoopEvent::Evaluated {
                    evaluation: &evaluation,
                    round: self.judgings,
                });
                let passed = is_acceptable(&evaluation, self.config.acceptance_threshold);
                self.evaluation = Some(evaluation);

                if passed {
                    self.accept(Termination::Passed)
                } else if self.revisions < self.config.max_revisions {
                    self.revisions += 1;
                    self.observer.on_event(&LoopEvent::Revising {
                        revision: self.revisions,
                        max_revisions: self.config.max_revisions,
                    });
                    LoopState::Revising
                } else {
                    self.accept(Termination::Exhausted)
                }
            }
            LoopState::Revising => {
                let revised = self
                    .reviser
                    .revise(&self.request, self.current_draft()?, self.current_evaluation()?, None)
                    .await?;
                self.observer.on_event(&LoopEvent::DraftReady { draft: &revised });
                self.draft = Some(revised);
                LoopState::Judging
            }
            LoopState::UserRevision => {
                let feedback = self.user_feedback.as_deref();
                let revised = self
                    .reviser
                    .revise(
                        &self.request,
                        self.current_draft()?,
                        self.current_evaluation()?,
                        feedback,
                    )
                    .await?;
                self.observer.on_event(&LoopEvent::DraftReady { draft: &revised });
                self.draft = Some(revised);
                LoopState::FinalJudging
            }
            LoopState::FinalJudging => {
                // Judged for information only; the acceptance gate does not apply here
                let evaluation = self.judge.evaluate(&self.request, self.current_draft()?).await?;
                self.judgings += 1;
                self.observer.on_event(&LoopEvent::Evaluated {
                    evaluation: &evaluation,
                    round: self.judgings,
                });
                self.evaluation = Some(evaluation);
                self.observer.on_event(&LoopEvent::Finished);
                LoopState::Finished
            }
            LoopState::Accepted(_) | LoopState::Finished => return Err(self.invalid("step")),
        };

        info!(from = %self.state, to = %next, revisions = self.revisions, "Story loop transition");
        self.state = next;
        Ok(next)
    }

    fn accept(&mut self, termination: Termination) -> LoopState {
        info!(%termination, judgings = self.judgings, revisions = self.revisions, "Automated phase accepted");
        self.termination = Some(termination);
        self.observer.on_event(&LoopEvent::Accepted { termination });
        LoopState::Accepted(termination)
    }

    /// Run the automated phase to acceptance
    pub async fn run(&mut self) -> Result<StoryOutcome, BedtimeError> {
        debug!("StoryLoop::run: called");
        if !matches!(self.state, LoopState::Drafting | LoopState::Judging | LoopState::Revising) {
            return Err(self.invalid("run"));
        }
        while !self.state.is_accepted() {
            self.step().await?;
        }
        self.outcome()
    }

    /// Apply one round of user feedback after the automated phase
    ///
    /// Blank feedback declines the pass and returns `Ok(None)`, leaving the
    /// loop accepted. Otherwise the draft is revised with the feedback,
    /// judged once more and the loop finishes regardless of the new score.
    pub async fn apply_feedback(&mut self, feedback: &str) -> Result<Option<StoryOutcome>, BedtimeError> {
        debug!(len = feedback.len(), "StoryLoop::apply_feedback: called");
        if !self.state.is_accepted() {
            return Err(self.invalid("apply feedback"));
        }

        let feedback = feedback.trim();
        if feedback.is_empty() {
            info!("User declined feedback");
            return Ok(None);
        }

        self.observer.on_event(&LoopEvent::ApplyingFeedback { feedback });
        self.user_feedback = Some(feedback.to_string());
        info!(from = %self.state, to = %LoopState::UserRevision, "Story loop transition");
        self.state = LoopState::UserRevision;

        while !self.state.is_finished() {
            self.step().await?;
        }
        self.outcome().map(Some)
    }

    /// Snapshot of the result once the automated phase is over
    pub fn outcome(&self) -> Result<StoryOutcome, BedtimeError> {
        let termination = match (self.state, self.termination) {
            (LoopState::Accepted(t), _) => t,
            (LoopState::Finished, Some(t)) => t,
            _ => return Err(self.invalid("report an outcome")),
        };

        Ok(StoryOutcome {
            request: self.request.clone(),
            category: classify(self.request.as_str()),
            story: self.current_draft()?.clone(),
            evaluation: self.current_evaluation()?.clone(),
            termination,
            revisions: self.revisions,
            judgings: self.judgings,
            user_feedback: self.user_feedback.clone(),
        })
    }
}
