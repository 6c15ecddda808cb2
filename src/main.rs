mod config;
mod confirm;
mod generate;
mod prompt_format;
mod prompts;
mod providers;
mod session;
mod session_paths;
mod stages;
mod state;
mod structured_logger;
mod supervisor;

use anyhow::{Context, Result};
use clap::Parser;
use config::WorkflowConfig;
use generate::CliGenerator;
use providers::fixture::{FixtureCalendar, FixtureMail};
use session::{Session, SessionStatus};
use stages::Collaborators;
use state::EmailState;
use structured_logger::StructuredLogger;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;

#[derive(Parser)]
#[command(name = "reply")]
#[command(about = "Email reply workflow orchestrator with human confirmation")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Mail-provider id of the message to reply to
    message_id: Option<String>,

    /// Resume a suspended session by its session id
    #[arg(long)]
    resume: Option<String>,

    /// One response for a resumed session (APPROVE/CANCEL/feedback);
    /// without it, responses are read interactively from stdin
    #[arg(long)]
    response: Option<String>,

    /// Workflow config file (defaults to ./reply.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> WorkflowConfig {
    if let Some(path) = &cli.config {
        match WorkflowConfig::load(path) {
            Ok(cfg) => {
                eprintln!("[reply] Loaded config from {}", path.display());
                return cfg;
            }
            Err(e) => {
                eprintln!("[reply] Warning: failed to load config: {}", e);
            }
        }
    } else {
        let default_path = PathBuf::from("reply.yaml");
        if default_path.exists() {
            match WorkflowConfig::load(&default_path) {
                Ok(cfg) => {
                    eprintln!("[reply] Loaded default reply.yaml");
                    return cfg;
                }
                Err(e) => {
                    eprintln!("[reply] Warning: failed to load reply.yaml: {}", e);
                }
            }
        }
    }
    WorkflowConfig::default()
}

/// Prints conversation entries added since the last call.
fn print_new_entries(state: &EmailState, printed: &mut usize) {
    for entry in &state.conversation[*printed..] {
        match entry.speaker {
            state::Speaker::Agent => println!("{}\n", entry.text),
            state::Speaker::Human => println!("> {}\n", entry.text),
        }
    }
    *printed = state.conversation.len();
}

async fn read_response(
    reader: &mut tokio::io::BufReader<tokio::io::Stdin>,
) -> Result<Option<String>> {
    let mut line = String::new();
    eprint!("[reply] Your response (APPROVE/CANCEL/feedback): ");
    let bytes = reader
        .read_line(&mut line)
        .await
        .context("Failed to read response from stdin")?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

async fn drive(
    session: &Session<'_>,
    state: &mut EmailState,
    logger: &StructuredLogger,
    one_shot_response: Option<String>,
    mut status: SessionStatus,
) -> Result<()> {
    let snapshot_path = session_paths::session_state_path(&state.session_id)?;
    let mut printed = 0usize;
    let mut one_shot = one_shot_response;
    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin());

    loop {
        print_new_entries(state, &mut printed);
        state.set_updated_at();
        state.save_atomic(&snapshot_path)?;

        match status {
            SessionStatus::Complete(outcome) => {
                eprintln!("[reply] Session {}: {}", state.session_id, outcome.label());
                return Ok(());
            }
            SessionStatus::AwaitingReply => {
                let raw = if let Some(response) = one_shot.take() {
                    response
                } else {
                    match read_response(&mut stdin).await? {
                        Some(raw) => raw,
                        None => {
                            eprintln!(
                                "[reply] Input closed. Session suspended; resume with: \
                                 reply --resume {}",
                                state.session_id
                            );
                            return Ok(());
                        }
                    }
                };

                // The response opens a new run; bump first so its events
                // carry the new run id.
                logger.increment_run_id();
                status = match session.resume(state, &raw).await {
                    Ok(status) => status,
                    Err(e) => {
                        eprintln!("[reply] {}", e);
                        continue;
                    }
                };
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli);

    if !config.use_fixtures {
        anyhow::bail!(
            "No real mail/calendar providers are wired in yet; set use_fixtures: true"
        );
    }
    let mail = FixtureMail::new();
    let calendar = FixtureCalendar;
    let generator = CliGenerator::new(
        config.generator.command.clone(),
        config.generator.args.clone(),
    )
    .with_timeout(std::time::Duration::from_secs(config.generator.timeout_secs));

    let (mut state, resumed) = if let Some(session_id) = &cli.resume {
        let path = session_paths::session_state_path(session_id)?;
        eprintln!("[reply] Resuming session {}", session_id);
        (EmailState::load(&path)?, true)
    } else {
        let message_id = cli
            .message_id
            .clone()
            .context("A message id is required to start a session (or --resume to continue one)")?;
        eprintln!("[reply] Starting session for message {}", message_id);
        (EmailState::new(&message_id), false)
    };

    let events_path = session_paths::session_events_path(&state.session_id)?;
    let logger = StructuredLogger::new(&state.session_id, &events_path)?;

    let session = Session::new(
        Collaborators {
            mail: &mail,
            calendar: &calendar,
            generator: &generator,
        },
        &config,
        Some(&logger),
    );

    let (status, one_shot) = if resumed {
        match &cli.response {
            // A supplied response resumes immediately; interactive resumes
            // re-present the pending review prompt first. A snapshot that
            // already terminated just reports its outcome.
            Some(raw) => {
                logger.increment_run_id();
                (session.resume(&mut state, raw).await?, None)
            }
            None => match session::classify_outcome(&state) {
                Some(outcome) => (SessionStatus::Complete(outcome), None),
                None => (SessionStatus::AwaitingReply, None),
            },
        }
    } else {
        (session.advance(&mut state).await?, cli.response.clone())
    };

    drive(&session, &mut state, &logger, one_shot, status).await
}
