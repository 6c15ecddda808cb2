//! Deterministic stage routing for the reply workflow.
//!
//! The transition table below is the authoritative control flow: a strict
//! Analyze -> Context -> Compose -> Confirm -> Send pipeline with one
//! back-edge (Confirm -> Compose on pending feedback) and one escape hatch
//! (explicit cancellation at the confirm boundary). Narration is a derived
//! artifact computed after the decision; nothing here consults a generator.

use crate::state::EmailState;

/// The next unit of work selected for a workflow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyze,
    Context,
    Compose,
    Confirm,
    Send,
    Terminal,
}

impl Stage {
    /// Short label for logs and status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Analyze => "analyze",
            Stage::Context => "context",
            Stage::Compose => "compose",
            Stage::Confirm => "confirm",
            Stage::Send => "send",
            Stage::Terminal => "terminal",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Selects the next stage for a record. First matching rule wins.
///
/// Each rule's precondition is the previous stage's postcondition, so the
/// pipeline is strictly ordered except for the revision back-edge. Error
/// markers count as present content: a failed stage still unblocks its
/// successor rather than stalling the pipeline.
pub fn next_stage(state: &EmailState) -> Stage {
    if state.sent || state.done {
        Stage::Terminal
    } else if state.analysis.is_empty() {
        Stage::Analyze
    } else if state.calendar_context.is_empty() {
        Stage::Context
    } else if state.draft.is_empty() {
        Stage::Compose
    } else if !state.pending_feedback.is_empty() && !state.approved {
        // Revision path: compose sees the pending feedback and branches to
        // its revision prompt instead of the initial-draft prompt.
        Stage::Compose
    } else if !state.approved {
        Stage::Confirm
    } else if !state.sent {
        Stage::Send
    } else {
        Stage::Terminal
    }
}

/// Human-readable status line for a decision, appended to the conversation
/// log. Purely derived from the chosen stage; discarding it changes nothing.
pub fn narrate(stage: Stage, state: &EmailState) -> String {
    match stage {
        Stage::Analyze => {
            "Supervisor: starting with email reading and analysis.".to_string()
        }
        Stage::Context => {
            "Supervisor: email analyzed, gathering calendar context.".to_string()
        }
        Stage::Compose if !state.pending_feedback.is_empty() => {
            "Supervisor: feedback received, revising draft.".to_string()
        }
        Stage::Compose => "Supervisor: context gathered, drafting reply.".to_string(),
        Stage::Confirm => "Supervisor: draft ready, awaiting your approval.".to_string(),
        Stage::Send => "Supervisor: approved, sending reply.".to_string(),
        Stage::Terminal if state.sent => {
            "Supervisor: workflow complete, reply sent.".to_string()
        }
        Stage::Terminal => "Supervisor: workflow complete.".to_string(),
    }
}
