//! Home-based storage paths for session persistence.
//!
//! Everything lives under `~/.reply-agent/`:
//! - `sessions/<session-id>/state.json` - the at-rest workflow snapshot
//! - `sessions/<session-id>/events.jsonl` - structured event log

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const REPLY_AGENT_DIR: &str = ".reply-agent";

/// Returns the agent home directory, creating it if needed: `~/.reply-agent/`
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the
/// directory cannot be created.
pub fn reply_agent_home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory for session storage")?;
    let dir = home.join(REPLY_AGENT_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create agent directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the sessions directory, creating it if needed.
pub fn sessions_dir() -> Result<PathBuf> {
    let dir = reply_agent_home_dir()?.join("sessions");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create sessions directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the directory for one session, creating it if needed.
pub fn session_dir(session_id: &str) -> Result<PathBuf> {
    let dir = sessions_dir()?.join(session_id);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;
    Ok(dir)
}

/// Snapshot path: `~/.reply-agent/sessions/<session-id>/state.json`
pub fn session_state_path(session_id: &str) -> Result<PathBuf> {
    Ok(session_dir(session_id)?.join("state.json"))
}

/// Event log path: `~/.reply-agent/sessions/<session-id>/events.jsonl`
pub fn session_events_path(session_id: &str) -> Result<PathBuf> {
    Ok(session_dir(session_id)?.join("events.jsonl"))
}
