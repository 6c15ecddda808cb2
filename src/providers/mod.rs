//! External collaborator contracts: mail and calendar providers.
//!
//! The workflow core only depends on these traits. Production
//! implementations (Gmail, CalDAV, ...) live behind them; the fixture
//! implementations in [`fixture`] stand in when no provider is configured.

pub mod fixture;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// A fetched inbound message, header fields already extracted.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub sender: String,
    pub body: String,
    pub received_at: String,
}

/// An outbound reply handed to the mail provider for delivery.
#[derive(Debug, Clone)]
pub struct OutgoingReply {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Provider id of the message being replied to, for threading.
    pub in_reply_to: String,
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Fetches a message by its provider id.
    async fn fetch(&self, message_id: &str) -> Result<EmailMessage>;

    /// Sends a composed reply. Returns the provider's delivery id.
    async fn send(&self, reply: &OutgoingReply) -> Result<String>;
}

/// Half-open time window for event listing.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window from now through `days` days ahead.
    pub fn next_days(days: i64) -> Self {
        let start = Utc::now();
        Self {
            start,
            end: start + Duration::days(days),
        }
    }
}

/// One calendar event, already ordered by start time by the provider.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub start: String,
    pub title: String,
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Lists events within the window, ordered by start. May be empty.
    async fn list_events(&self, window: TimeWindow) -> Result<Vec<CalendarEvent>>;
}

/// Renders events into the plain-text block the context prompt consumes.
pub fn format_events(events: &[CalendarEvent]) -> String {
    let mut out = String::from("Calendar events (next 7 days):\n");
    if events.is_empty() {
        out.push_str("No upcoming events scheduled.\n");
    } else {
        for event in events {
            out.push_str(&format!("- {}: {}\n", event.start, event.title));
        }
    }
    out
}
