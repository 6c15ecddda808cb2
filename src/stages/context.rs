use super::{error_marker, Collaborators};
use crate::prompts::context_prompt;
use crate::providers::{format_events, TimeWindow};
use crate::state::{EmailState, StageUpdate};

/// Days of calendar lookahead offered to the context prompt.
const LOOKAHEAD_DAYS: i64 = 7;

/// Lists upcoming events and generates calendar context for the reply.
///
/// The generated context is prefixed with the raw event listing so the
/// compose stage (and the human reviewing the draft) can see both.
pub async fn run_context(state: &EmailState, collab: &Collaborators<'_>) -> StageUpdate {
    tracing::debug!(message_id = %state.message_id, "context stage");

    let events = match collab
        .calendar
        .list_events(TimeWindow::next_days(LOOKAHEAD_DAYS))
        .await
    {
        Ok(events) => events,
        Err(err) => {
            let marker = error_marker(&err);
            return StageUpdate {
                note: Some(format!("Calendar checker: failed to list events: {}", marker)),
                calendar_context: Some(marker),
                ..Default::default()
            };
        }
    };

    let events_text = format_events(&events);
    let prompt = context_prompt(state, &events_text);
    let (context, note) = match collab.generator.generate(&prompt).await {
        Ok(text) => (
            format!("{}\nContext analysis:\n{}", events_text, text),
            format!(
                "Calendar checker: context gathered from {} event(s)",
                events.len()
            ),
        ),
        Err(err) => {
            let marker = error_marker(&err);
            let note = format!("Calendar checker: context generation failed: {}", marker);
            (marker, note)
        }
    };

    StageUpdate {
        note: Some(note),
        calendar_context: Some(context),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::{ScriptedCalendar, ScriptedGenerator, ScriptedMail};

    fn analyzed_state() -> EmailState {
        let mut state = EmailState::new("m1");
        state.analysis = "wants a meeting".to_string();
        state.body = "Can we meet Tuesday?".to_string();
        state
    }

    #[tokio::test]
    async fn test_context_combines_events_and_generation() {
        let mail = ScriptedMail::working();
        let calendar = ScriptedCalendar { fail: false };
        let generator = ScriptedGenerator::replying("Tuesday afternoon conflicts");
        let collab = Collaborators {
            mail: &mail,
            calendar: &calendar,
            generator: &generator,
        };

        let mut state = analyzed_state();
        let update = run_context(&state, &collab).await;
        state.apply(update);

        assert!(state.calendar_context.contains("Client presentation"));
        assert!(state.calendar_context.contains("Tuesday afternoon conflicts"));

        // The prompt saw both the analysis and the listed events.
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("wants a meeting"));
        assert!(prompts[0].contains("Client presentation"));
    }

    #[tokio::test]
    async fn test_calendar_failure_leaves_error_marker() {
        let mail = ScriptedMail::working();
        let calendar = ScriptedCalendar { fail: true };
        let generator = ScriptedGenerator::replying("unused");
        let collab = Collaborators {
            mail: &mail,
            calendar: &calendar,
            generator: &generator,
        };

        let mut state = analyzed_state();
        let update = run_context(&state, &collab).await;
        state.apply(update);

        assert!(state.calendar_context.starts_with("Error:"));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_error_marker() {
        let mail = ScriptedMail::working();
        let calendar = ScriptedCalendar { fail: false };
        let generator = ScriptedGenerator::failing();
        let collab = Collaborators {
            mail: &mail,
            calendar: &calendar,
            generator: &generator,
        };

        let mut state = analyzed_state();
        let update = run_context(&state, &collab).await;
        state.apply(update);

        assert!(state.calendar_context.starts_with("Error:"));
    }
}
