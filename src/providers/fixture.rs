//! Fixture providers used when no real mail or calendar backend is
//! configured. The data mirrors a typical scheduling request so the full
//! pipeline stays exercisable end to end without credentials.

use super::{CalendarEvent, CalendarProvider, EmailMessage, MailProvider, OutgoingReply, TimeWindow};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

/// In-memory mail provider serving one canned message and recording sends.
pub struct FixtureMail {
    sent: Mutex<Vec<OutgoingReply>>,
}

impl FixtureMail {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Replies recorded by `send`, for driver summaries and tests.
    pub fn sent_replies(&self) -> Vec<OutgoingReply> {
        self.sent.lock().expect("fixture mail lock poisoned").clone()
    }
}

impl Default for FixtureMail {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailProvider for FixtureMail {
    async fn fetch(&self, _message_id: &str) -> Result<EmailMessage> {
        Ok(EmailMessage {
            subject: "Meeting Request for Project Discussion".to_string(),
            sender: "john.doe@example.com".to_string(),
            body: "Hi,\n\nI would like to schedule a meeting next week to discuss \
                   the Q4 project timeline and deliverables. Do you have availability \
                   on Tuesday or Wednesday afternoon?\n\nLooking forward to hearing \
                   from you.\n\nBest regards,\nJohn"
                .to_string(),
            received_at: Utc::now().to_rfc3339(),
        })
    }

    async fn send(&self, reply: &OutgoingReply) -> Result<String> {
        let mut sent = self.sent.lock().expect("fixture mail lock poisoned");
        sent.push(reply.clone());
        Ok(format!("fixture-delivery-{}", sent.len()))
    }
}

/// Calendar provider serving a fixed week of commitments.
pub struct FixtureCalendar;

#[async_trait]
impl CalendarProvider for FixtureCalendar {
    async fn list_events(&self, _window: TimeWindow) -> Result<Vec<CalendarEvent>> {
        Ok(vec![
            CalendarEvent {
                start: "Monday 10:00".to_string(),
                title: "Team standup".to_string(),
            },
            CalendarEvent {
                start: "Tuesday 14:00".to_string(),
                title: "Client presentation".to_string(),
            },
            CalendarEvent {
                start: "Wednesday 11:00".to_string(),
                title: "Budget review".to_string(),
            },
            CalendarEvent {
                start: "Thursday 15:00".to_string(),
                title: "Project deadline review".to_string(),
            },
        ])
    }
}
