use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Who produced a conversation entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Human,
    Agent,
}

/// One entry in the append-only conversation log.
///
/// The log exists for audit and UI replay. The transition policy in
/// `supervisor` never reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// The single mutable record driving one email-reply session.
///
/// Created with only `message_id` populated; stage functions fill in the
/// rest via [`StageUpdate`]s merged through [`EmailState::apply`]. Once
/// `done` is true the record is frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailState {
    pub conversation: Vec<ConversationEntry>,

    /// Opaque mail-provider identifier of the message being replied to.
    pub message_id: String,

    // Header fields, extracted once by the analyze stage.
    pub subject: String,
    pub sender: String,
    pub body: String,
    pub received_at: String,

    /// Analysis text; non-empty marks the analyze stage complete.
    pub analysis: String,
    /// Calendar context text; non-empty marks the context stage complete.
    pub calendar_context: String,
    /// Current reply draft, overwritten on each compose run.
    pub draft: String,
    /// Free-text revision instructions from the human; consumed and cleared
    /// by the compose stage.
    pub pending_feedback: String,

    pub approved: bool,
    pub sent: bool,
    pub done: bool,

    /// Number of feedback-driven recompositions. Zero for the first draft.
    pub revision_count: u32,

    #[serde(default)]
    pub session_id: String,

    /// Timestamp of the last snapshot (RFC3339). Empty on legacy snapshots.
    #[serde(default)]
    pub updated_at: String,
}

/// A set of field replacements produced by one stage run.
///
/// Stages never mutate the record directly; they return one of these and
/// the session merges it, which keeps the terminal freeze in one place.
#[derive(Debug, Clone, Default)]
pub struct StageUpdate {
    /// Text appended to the conversation log as an agent entry.
    pub note: Option<String>,
    pub subject: Option<String>,
    pub sender: Option<String>,
    pub body: Option<String>,
    pub received_at: Option<String>,
    pub analysis: Option<String>,
    pub calendar_context: Option<String>,
    pub draft: Option<String>,
    pub pending_feedback: Option<String>,
    pub revision_count: Option<u32>,
    pub sent: Option<bool>,
    pub done: Option<bool>,
}

impl EmailState {
    /// Creates a fresh record for one email-processing session.
    pub fn new(message_id: &str) -> Self {
        Self {
            conversation: Vec::new(),
            message_id: message_id.to_string(),
            subject: String::new(),
            sender: String::new(),
            body: String::new(),
            received_at: String::new(),
            analysis: String::new(),
            calendar_context: String::new(),
            draft: String::new(),
            pending_feedback: String::new(),
            approved: false,
            sent: false,
            done: false,
            revision_count: 0,
            session_id: Uuid::new_v4().to_string(),
            updated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Merges a stage's field updates into the record.
    ///
    /// Terminal records are frozen: updates against a record with `done`
    /// already set are dropped entirely.
    pub fn apply(&mut self, update: StageUpdate) {
        if self.done {
            return;
        }
        if let Some(note) = update.note {
            self.push_agent(note);
        }
        if let Some(subject) = update.subject {
            self.subject = subject;
        }
        if let Some(sender) = update.sender {
            self.sender = sender;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        if let Some(received_at) = update.received_at {
            self.received_at = received_at;
        }
        if let Some(analysis) = update.analysis {
            self.analysis = analysis;
        }
        if let Some(calendar_context) = update.calendar_context {
            self.calendar_context = calendar_context;
        }
        if let Some(draft) = update.draft {
            self.draft = draft;
        }
        if let Some(feedback) = update.pending_feedback {
            self.pending_feedback = feedback;
        }
        if let Some(count) = update.revision_count {
            self.revision_count = count;
        }
        if let Some(sent) = update.sent {
            self.sent = sent;
        }
        if let Some(done) = update.done {
            self.done = done;
        }
    }

    pub fn push_human(&mut self, text: impl Into<String>) {
        self.conversation.push(ConversationEntry {
            speaker: Speaker::Human,
            text: text.into(),
        });
    }

    pub fn push_agent(&mut self, text: impl Into<String>) {
        self.conversation.push(ConversationEntry {
            speaker: Speaker::Agent,
            text: text.into(),
        });
    }

    pub fn ensure_session_id(&mut self) {
        if self.session_id.is_empty() {
            self.session_id = Uuid::new_v4().to_string();
        }
    }

    /// Sets the updated_at timestamp to the current time.
    /// Call this before saving so the snapshot reflects its save time.
    pub fn set_updated_at(&mut self) {
        self.updated_at = Utc::now().to_rfc3339();
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session snapshot: {}", path.display()))?;
        let mut state: EmailState = serde_json::from_str(&content)
            .with_context(|| "Failed to parse session snapshot as JSON")?;
        state.ensure_session_id();
        Ok(state)
    }

    pub fn save_atomic(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)
            .with_context(|| "Failed to serialize session snapshot to JSON")?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .with_context(|| format!("Failed to write temp snapshot: {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp snapshot to: {}", path.display()))?;
        Ok(())
    }
}
