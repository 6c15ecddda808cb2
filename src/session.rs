//! Session loop: runs stages until the workflow terminates or suspends.
//!
//! The loop is the only caller of the stage functions. It owns nothing but
//! references: the record is handed in, advanced, and handed back so the
//! driver can persist it across the confirm suspension (possibly across
//! process restarts - a suspended session is a JSON snapshot, not a blocked
//! thread).

use crate::config::WorkflowConfig;
use crate::confirm::{self, UserResponse};
use crate::prompt_format::PromptBuilder;
use crate::stages::{run_analyze, run_compose, run_context, run_send, Collaborators};
use crate::state::EmailState;
use crate::structured_logger::StructuredLogger;
use crate::supervisor::{narrate, next_stage, Stage};
use anyhow::Result;

/// What the session loop handed back to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Suspended at the confirm boundary; the record carries the draft and
    /// the driver must collect one human response.
    AwaitingReply,
    Complete(SessionOutcome),
}

/// Terminal classification of a completed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Sent,
    Cancelled,
    SendFailed,
}

impl SessionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Sent => "sent",
            SessionOutcome::Cancelled => "cancelled",
            SessionOutcome::SendFailed => "send_failed",
        }
    }
}

/// Classifies a terminal record. `None` while the record is in flight.
pub fn classify_outcome(state: &EmailState) -> Option<SessionOutcome> {
    if state.sent {
        Some(SessionOutcome::Sent)
    } else if state.done && state.approved {
        // Approved but unsent and terminal: the send stage failed.
        Some(SessionOutcome::SendFailed)
    } else if state.done {
        Some(SessionOutcome::Cancelled)
    } else {
        None
    }
}

pub struct Session<'a> {
    collab: Collaborators<'a>,
    config: &'a WorkflowConfig,
    logger: Option<&'a StructuredLogger>,
}

impl<'a> Session<'a> {
    pub fn new(
        collab: Collaborators<'a>,
        config: &'a WorkflowConfig,
        logger: Option<&'a StructuredLogger>,
    ) -> Self {
        Self {
            collab,
            config,
            logger,
        }
    }

    /// Runs stages until the record terminates or suspends at Confirm.
    ///
    /// Stage failures never surface here; they are already folded into the
    /// record as error markers. The returned error space is reserved for
    /// driver-level problems and is currently empty.
    pub async fn advance(&self, state: &mut EmailState) -> Result<SessionStatus> {
        loop {
            let stage = next_stage(state);
            if let Some(logger) = self.logger {
                logger.log_stage_selected(stage);
            }
            tracing::debug!(stage = %stage, message_id = %state.message_id, "stage selected");

            if stage == Stage::Terminal {
                // classify_outcome is total on terminal records.
                let outcome = classify_outcome(state).unwrap_or(SessionOutcome::Cancelled);
                if let Some(logger) = self.logger {
                    logger.log_outcome(outcome.label());
                }
                return Ok(SessionStatus::Complete(outcome));
            }

            state.push_agent(narrate(stage, state));
            self.narrate_gloss(stage, state).await;

            match stage {
                Stage::Analyze => {
                    let update = run_analyze(state, &self.collab).await;
                    state.apply(update);
                }
                Stage::Context => {
                    let update = run_context(state, &self.collab).await;
                    state.apply(update);
                }
                Stage::Compose => {
                    let update = run_compose(state, &self.collab).await;
                    state.apply(update);
                }
                Stage::Confirm => {
                    state.push_agent(confirm::review_prompt(state));
                    if let Some(logger) = self.logger {
                        logger.log_suspended(state.revision_count);
                    }
                    return Ok(SessionStatus::AwaitingReply);
                }
                Stage::Send => {
                    let update = run_send(state, &self.collab).await;
                    state.apply(update);
                }
                Stage::Terminal => unreachable!("terminal handled above"),
            }

            if let Some(logger) = self.logger {
                logger.log_stage_complete(stage);
            }
        }
    }

    /// Feeds one human response through the confirmation bridge and
    /// re-enters the loop.
    ///
    /// # Errors
    ///
    /// Empty/whitespace input is rejected without touching the record; the
    /// caller re-prompts.
    pub async fn resume(&self, state: &mut EmailState, raw: &str) -> Result<SessionStatus> {
        if let Some(outcome) = classify_outcome(state) {
            // Terminal records are frozen; a late response changes nothing.
            return Ok(SessionStatus::Complete(outcome));
        }

        let response = confirm::parse_response(raw)?;

        if let UserResponse::Feedback(_) = &response {
            if let Some(cap) = self.config.max_revisions {
                if state.revision_count >= cap {
                    state.push_agent(format!(
                        "Revision limit of {} reached. Reply APPROVE to send or CANCEL to discard.",
                        cap
                    ));
                    if let Some(logger) = self.logger {
                        logger.log_response_received("feedback_rejected_revision_cap");
                    }
                    return Ok(SessionStatus::AwaitingReply);
                }
            }
        }

        let kind = match &response {
            UserResponse::Approve => "approve",
            UserResponse::Cancel => "cancel",
            UserResponse::Feedback(_) => "feedback",
        };
        if let Some(logger) = self.logger {
            logger.log_response_received(kind);
        }

        confirm::apply_response(state, &response);
        self.advance(state).await
    }

    /// Advisory generative gloss on a decision. The output only ever lands
    /// in the conversation log; failures are dropped silently.
    async fn narrate_gloss(&self, stage: Stage, state: &mut EmailState) {
        if !self.config.narration.enabled {
            return;
        }
        let prompt = PromptBuilder::new()
            .stage("narrate")
            .instructions(
                "In one short sentence, describe this step of an email reply \
                 workflow for a status line.",
            )
            .input("step", stage.label())
            .input("revision-count", &state.revision_count.to_string())
            .build();
        if let Ok(gloss) = self.collab.generator.generate(&prompt).await {
            state.push_agent(gloss);
        }
    }
}
