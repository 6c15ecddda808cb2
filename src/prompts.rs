//! Prompt construction for the generation stages.
//!
//! All prompts go through [`PromptBuilder`] so the generator always sees the
//! same XML section layout. The wording follows the analyst / calendar /
//! writer roles of the pipeline; the orchestrator never inspects the output
//! beyond presence.

use crate::prompt_format::PromptBuilder;
use crate::providers::EmailMessage;
use crate::state::EmailState;

/// Analysis prompt for a freshly fetched message.
pub fn analysis_prompt(message: &EmailMessage) -> String {
    PromptBuilder::new()
        .stage("analyze")
        .instructions(
            "As an email analyst, analyze this incoming email. Cover: the main \
             purpose and intent, key requests or action items, urgency level \
             (high/medium/low), sentiment and tone, important dates or deadlines, \
             what kind of response is expected, and whether a calendar check is \
             needed. Be specific and actionable.",
        )
        .input("subject", &message.subject)
        .input("from", &message.sender)
        .input("date", &message.received_at)
        .input("email-body", &message.body)
        .build()
}

/// Calendar-context prompt combining the analysis with listed events.
pub fn context_prompt(state: &EmailState, events_text: &str) -> String {
    PromptBuilder::new()
        .stage("context")
        .instructions(
            "As a calendar analyst, review the email and the calendar to provide \
             context for a reply: relevant availability, conflicting commitments, \
             the best time slots to offer, and a suggested scheduling approach. \
             Be specific with dates and times.",
        )
        .input("email-analysis", &state.analysis)
        .input("email-body", &state.body)
        .input("calendar", events_text)
        .build()
}

/// Initial draft prompt.
pub fn compose_prompt(state: &EmailState) -> String {
    PromptBuilder::new()
        .stage("compose")
        .instructions(
            "As an email writer, draft a professional reply to this email. \
             Acknowledge the request, provide relevant information based on the \
             calendar context, suggest specific times or dates if applicable, and \
             include an appropriate greeting and closing.",
        )
        .input("subject", &state.subject)
        .input("from", &state.sender)
        .input("email-body", &state.body)
        .input("email-analysis", &state.analysis)
        .input("calendar-context", &state.calendar_context)
        .constraint("Provide only the email body, no subject line")
        .build()
}

/// Revision prompt: previous draft plus the human's feedback.
pub fn revision_prompt(state: &EmailState) -> String {
    PromptBuilder::new()
        .stage("compose")
        .instructions(
            "As an email writer, revise the previous draft based on the user's \
             feedback. Incorporate all of the feedback, keep a professional tone, \
             and still address every point from the original email.",
        )
        .input("subject", &state.subject)
        .input("from", &state.sender)
        .input("email-body", &state.body)
        .input("previous-draft", &state.draft)
        .input("user-feedback", &state.pending_feedback)
        .constraint("Provide only the email body, no subject line")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            subject: "Meeting Request".to_string(),
            sender: "john@example.com".to_string(),
            body: "Can we meet Tuesday?".to_string(),
            received_at: "2026-08-29T09:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_analysis_prompt_carries_message_fields() {
        let prompt = analysis_prompt(&message());
        assert!(prompt.contains("<stage>analyze</stage>"));
        assert!(prompt.contains("Meeting Request"));
        assert!(prompt.contains("john@example.com"));
        assert!(prompt.contains("Can we meet Tuesday?"));
    }

    #[test]
    fn test_compose_and_revision_prompts_differ() {
        let mut state = EmailState::new("m1");
        state.subject = "Meeting Request".to_string();
        state.sender = "john@example.com".to_string();
        state.body = "Can we meet Tuesday?".to_string();
        state.analysis = "Wants a meeting".to_string();
        state.calendar_context = "Tuesday afternoon is free".to_string();

        let initial = compose_prompt(&state);
        assert!(initial.contains("calendar-context"));
        assert!(!initial.contains("previous-draft"));

        state.draft = "Hi John,".to_string();
        state.pending_feedback = "make it shorter".to_string();
        let revision = revision_prompt(&state);
        assert!(revision.contains("previous-draft"));
        assert!(revision.contains("make it shorter"));
    }
}
