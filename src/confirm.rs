//! Confirmation bridge: turns one raw human response into a record update.
//!
//! Runs before the supervisor re-evaluates, so the next decision already
//! sees the approval, cancellation, or pending feedback.

use crate::state::EmailState;
use anyhow::{bail, Result};

/// Normalized human response at the confirm boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserResponse {
    Approve,
    Cancel,
    Feedback(String),
}

/// Parses a raw response string.
///
/// `APPROVE` and `CANCEL` match case-insensitively after trimming; any other
/// non-empty text is revision feedback, preserved verbatim (trimmed).
///
/// # Errors
///
/// Empty or whitespace-only input is invalid: the caller must re-prompt
/// without touching the record.
pub fn parse_response(raw: &str) -> Result<UserResponse> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("Empty response; reply with APPROVE, CANCEL, or revision feedback");
    }
    match trimmed.to_uppercase().as_str() {
        "APPROVE" => Ok(UserResponse::Approve),
        "CANCEL" => Ok(UserResponse::Cancel),
        _ => Ok(UserResponse::Feedback(trimmed.to_string())),
    }
}

/// Applies a normalized response to the record.
///
/// Feedback and approval are mutually exclusive outcomes: feedback always
/// resets `approved`, and approval clears any stale feedback.
pub fn apply_response(state: &mut EmailState, response: &UserResponse) {
    match response {
        UserResponse::Approve => {
            state.approved = true;
            state.pending_feedback.clear();
            state.push_human("APPROVE");
            state.push_agent("Reply approved. Proceeding to send.");
        }
        UserResponse::Cancel => {
            state.push_human("CANCEL");
            state.push_agent("Reply cancelled. Nothing was sent.");
            state.done = true;
        }
        UserResponse::Feedback(text) => {
            state.pending_feedback = text.clone();
            state.approved = false;
            state.push_human(text.clone());
            state.push_agent("Feedback received. Revising draft.");
        }
    }
}

/// Text presented to the human at the suspension point: the draft, its
/// addressing, and the accepted responses.
pub fn review_prompt(state: &EmailState) -> String {
    format!(
        "Please review the draft reply.\n\nTo: {}\nRe: {}\n\nDraft:\n{}\n\n---\n\
         Reply APPROVE to send as is, CANCEL to discard, or type feedback to revise.",
        state.sender, state.subject, state.draft
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::{next_stage, Stage};

    fn reviewable_record() -> EmailState {
        let mut state = EmailState::new("m1");
        state.analysis = "a".to_string();
        state.calendar_context = "c".to_string();
        state.draft = "Hello John,".to_string();
        state
    }

    #[test]
    fn test_parse_approve_is_case_insensitive_and_trimmed() {
        assert_eq!(parse_response("APPROVE").unwrap(), UserResponse::Approve);
        assert_eq!(parse_response("  approve  ").unwrap(), UserResponse::Approve);
        assert_eq!(parse_response("Approve").unwrap(), UserResponse::Approve);
    }

    #[test]
    fn test_parse_cancel() {
        assert_eq!(parse_response("cancel").unwrap(), UserResponse::Cancel);
        assert_eq!(parse_response(" CANCEL\n").unwrap(), UserResponse::Cancel);
    }

    #[test]
    fn test_parse_feedback_preserves_text() {
        assert_eq!(
            parse_response("make it shorter").unwrap(),
            UserResponse::Feedback("make it shorter".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(parse_response("").is_err());
        assert!(parse_response("   \n\t").is_err());
    }

    #[test]
    fn test_empty_input_does_not_mutate_record() {
        let state = reviewable_record();
        let before = serde_json::to_string(&state).unwrap();
        assert!(parse_response("  ").is_err());
        let after = serde_json::to_string(&state).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_apply_approve_routes_to_send() {
        let mut state = reviewable_record();
        apply_response(&mut state, &UserResponse::Approve);
        assert!(state.approved);
        assert!(state.pending_feedback.is_empty());
        assert_eq!(next_stage(&state), Stage::Send);
    }

    #[test]
    fn test_apply_cancel_is_terminal_and_unsent() {
        let mut state = reviewable_record();
        apply_response(&mut state, &UserResponse::Cancel);
        assert!(state.done);
        assert!(!state.sent);
        assert!(!state.approved);
        assert_eq!(next_stage(&state), Stage::Terminal);
    }

    #[test]
    fn test_apply_feedback_routes_back_to_compose() {
        let mut state = reviewable_record();
        apply_response(
            &mut state,
            &UserResponse::Feedback("make it shorter".to_string()),
        );
        assert_eq!(state.pending_feedback, "make it shorter");
        assert!(!state.approved);
        assert_eq!(next_stage(&state), Stage::Compose);
    }

    #[test]
    fn test_feedback_then_approve_clears_feedback() {
        let mut state = reviewable_record();
        apply_response(&mut state, &UserResponse::Feedback("tweak".to_string()));
        apply_response(&mut state, &UserResponse::Approve);
        assert!(state.approved);
        assert!(state.pending_feedback.is_empty());
    }

    #[test]
    fn test_responses_land_in_conversation_log() {
        let mut state = reviewable_record();
        apply_response(&mut state, &UserResponse::Feedback("tweak".to_string()));
        assert!(state
            .conversation
            .iter()
            .any(|e| e.speaker == crate::state::Speaker::Human && e.text == "tweak"));
    }
}
