use super::Collaborators;
use crate::providers::OutgoingReply;
use crate::state::{EmailState, StageUpdate};

/// Sends the approved draft back to the original sender.
///
/// The one stage whose failure is terminal: an undeliverable reply marks
/// the record done without `sent`, and is never retried automatically.
pub async fn run_send(state: &EmailState, collab: &Collaborators<'_>) -> StageUpdate {
    tracing::debug!(message_id = %state.message_id, to = %state.sender, "send stage");

    let reply = OutgoingReply {
        to: state.sender.clone(),
        subject: format!("Re: {}", state.subject),
        body: state.draft.clone(),
        in_reply_to: state.message_id.clone(),
    };

    match collab.mail.send(&reply).await {
        Ok(delivery_id) => StageUpdate {
            note: Some(format!(
                "Email sender: reply sent to {} (delivery id {})",
                reply.to, delivery_id
            )),
            sent: Some(true),
            done: Some(true),
            ..Default::default()
        },
        Err(err) => StageUpdate {
            note: Some(format!("Email sender: failed to send reply: {:#}", err)),
            sent: Some(false),
            done: Some(true),
            ..Default::default()
        },
    }
}
