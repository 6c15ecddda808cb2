use super::{error_marker, Collaborators};
use crate::prompts::{compose_prompt, revision_prompt};
use crate::state::{EmailState, StageUpdate};

/// Generates the reply draft.
///
/// With pending feedback this is a revision: the revision prompt carries the
/// previous draft plus the feedback, the revision counter increments, and
/// the feedback is consumed. Without feedback it is the initial draft and
/// the counter resets to zero. Feedback is cleared even when generation
/// fails, so a broken generator cannot loop the revision edge forever.
pub async fn run_compose(state: &EmailState, collab: &Collaborators<'_>) -> StageUpdate {
    let revising = !state.pending_feedback.is_empty();
    tracing::debug!(message_id = %state.message_id, revising, "compose stage");

    let prompt = if revising {
        revision_prompt(state)
    } else {
        compose_prompt(state)
    };

    match collab.generator.generate(&prompt).await {
        Ok(draft) => {
            let (count, note) = if revising {
                let count = state.revision_count + 1;
                (count, format!("Reply composer: draft revised (revision #{})", count))
            } else {
                (0, "Reply composer: draft ready for review".to_string())
            };
            StageUpdate {
                note: Some(note),
                draft: Some(draft),
                revision_count: Some(count),
                pending_feedback: Some(String::new()),
                ..Default::default()
            }
        }
        Err(err) => {
            let marker = error_marker(&err);
            StageUpdate {
                note: Some(format!("Reply composer: drafting failed: {}", marker)),
                draft: Some(marker),
                pending_feedback: Some(String::new()),
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::{ScriptedCalendar, ScriptedGenerator, ScriptedMail};

    fn contextualized_state() -> EmailState {
        let mut state = EmailState::new("m1");
        state.subject = "Meeting Request".to_string();
        state.sender = "john@example.com".to_string();
        state.body = "Can we meet Tuesday?".to_string();
        state.analysis = "wants a meeting".to_string();
        state.calendar_context = "Tuesday afternoon is busy".to_string();
        state
    }

    #[tokio::test]
    async fn test_first_draft_resets_revision_count() {
        let mail = ScriptedMail::working();
        let calendar = ScriptedCalendar { fail: false };
        let generator = ScriptedGenerator::replying("Hi John, how about Wednesday?");
        let collab = Collaborators {
            mail: &mail,
            calendar: &calendar,
            generator: &generator,
        };

        let mut state = contextualized_state();
        let update = run_compose(&state, &collab).await;
        state.apply(update);

        assert_eq!(state.draft, "Hi John, how about Wednesday?");
        assert_eq!(state.revision_count, 0);
        assert!(state.pending_feedback.is_empty());
    }

    #[tokio::test]
    async fn test_revision_increments_and_consumes_feedback() {
        let mail = ScriptedMail::working();
        let calendar = ScriptedCalendar { fail: false };
        let generator = ScriptedGenerator::replying("Hi John, Wednesday works.");
        let collab = Collaborators {
            mail: &mail,
            calendar: &calendar,
            generator: &generator,
        };

        let mut state = contextualized_state();
        state.draft = "Hi John, how about Wednesday afternoon at your convenience?".to_string();
        state.pending_feedback = "make it shorter".to_string();

        let update = run_compose(&state, &collab).await;
        state.apply(update);

        assert_eq!(state.draft, "Hi John, Wednesday works.");
        assert_eq!(state.revision_count, 1);
        assert!(state.pending_feedback.is_empty());

        // The revision prompt carried the old draft and the feedback.
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("at your convenience"));
        assert!(prompts[0].contains("make it shorter"));
    }

    #[tokio::test]
    async fn test_failure_clears_feedback_and_marks_draft() {
        let mail = ScriptedMail::working();
        let calendar = ScriptedCalendar { fail: false };
        let generator = ScriptedGenerator::failing();
        let collab = Collaborators {
            mail: &mail,
            calendar: &calendar,
            generator: &generator,
        };

        let mut state = contextualized_state();
        state.draft = "old draft".to_string();
        state.pending_feedback = "tweak".to_string();

        let update = run_compose(&state, &collab).await;
        state.apply(update);

        assert!(state.draft.starts_with("Error:"));
        assert!(state.pending_feedback.is_empty());
        // Failed revision does not count as a completed one.
        assert_eq!(state.revision_count, 0);
    }
}
