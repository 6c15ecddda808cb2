use super::{error_marker, Collaborators};
use crate::prompts::analysis_prompt;
use crate::state::{EmailState, StageUpdate};

/// Fetches the message being replied to and generates its analysis.
///
/// Header fields are extracted exactly once, on the first successful fetch.
/// A fetch or generation failure leaves an error marker in `analysis` so
/// the field is never empty afterwards.
pub async fn run_analyze(state: &EmailState, collab: &Collaborators<'_>) -> StageUpdate {
    tracing::debug!(message_id = %state.message_id, "analyze stage");

    let message = match collab.mail.fetch(&state.message_id).await {
        Ok(message) => message,
        Err(err) => {
            let marker = error_marker(&err);
            return StageUpdate {
                note: Some(format!("Email reader: failed to read email: {}", marker)),
                analysis: Some(marker),
                ..Default::default()
            };
        }
    };

    let prompt = analysis_prompt(&message);
    let (analysis, note) = match collab.generator.generate(&prompt).await {
        Ok(text) => {
            let note = format!(
                "Email reader: analyzed \"{}\" from {}",
                message.subject, message.sender
            );
            (text, note)
        }
        Err(err) => {
            let marker = error_marker(&err);
            let note = format!("Email reader: analysis failed: {}", marker);
            (marker, note)
        }
    };

    StageUpdate {
        note: Some(note),
        subject: Some(message.subject),
        sender: Some(message.sender),
        body: Some(message.body),
        received_at: Some(message.received_at),
        analysis: Some(analysis),
        ..Default::default()
    }
}
