//! Line-oriented reviewer console
//!
//! Reads commands from stdin and drives the orchestrator. Stage triggers are
//! spawned so the prompt stays responsive; a second trigger while a stage is
//! running is rejected by the busy indicator and reported like any other
//! notice. On `quit` or end of input the console waits for spawned stages
//! before it returns.

pub mod commands;
pub mod terminal;

use nsw_common::params::{ParameterKey, ParameterSet};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::task::JoinSet;

use crate::orchestrator::{history_label, WorkflowOrchestrator, RESET_CONFIRMATION};
use crate::render::{html::to_html, text::to_text};
use commands::{parse, Command, ParseError, HELP};

/// Console settings taken from configuration
#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    pub default_export_path: PathBuf,
}

/// Run the console until `quit` or end of input
pub async fn run<R>(orchestrator: WorkflowOrchestrator, input: R, options: ConsoleOptions) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut stages = JoinSet::new();
    println!("Novel Scene Workshop reviewer console. Type 'help' for commands.");

    while let Some(line) = lines.next_line().await? {
        let command = match parse(&line) {
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Reset => {
                let confirmed = ask(&mut lines, RESET_CONFIRMATION).await?;
                let orchestrator = orchestrator.clone();
                stages.spawn(async move {
                    let _ = orchestrator.reset(&move |_: &str| confirmed).await;
                });
            }
            other => execute(&orchestrator, other, &options, &mut stages).await,
        }
    }

    tracing::debug!(pending = stages.len(), "Waiting for spawned stages");
    while let Some(joined) = stages.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "Stage task ended abnormally");
        }
    }
    orchestrator.flush_ratings().await;
    tracing::info!("Console closed");
    Ok(())
}

async fn ask<R>(lines: &mut Lines<BufReader<R>>, question: &str) -> std::io::Result<bool>
where
    R: AsyncRead + Unpin,
{
    println!("{} [y/N]", question);
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn execute(
    orchestrator: &WorkflowOrchestrator,
    command: Command,
    options: &ConsoleOptions,
    stages: &mut JoinSet<()>,
) {
    match command {
        Command::Set { field, value } => {
            if let Err(e) = orchestrator.set_form_field(&field, &value).await {
                println!("{}", e.notice());
            }
        }
        Command::Show => print!("{}", to_text(&*orchestrator.display().await)),
        Command::Html => print!("{}", to_html(&*orchestrator.display().await)),
        Command::Generate => {
            let orchestrator = orchestrator.clone();
            stages.spawn(async move {
                let _ = orchestrator.generate().await;
            });
        }
        Command::Optimize => {
            let orchestrator = orchestrator.clone();
            stages.spawn(async move {
                let _ = orchestrator.optimize().await;
            });
        }
        Command::Bbo => {
            let orchestrator = orchestrator.clone();
            stages.spawn(async move {
                let _ = orchestrator.bbo_step().await;
            });
        }
        Command::Rate { id, rating } => match orchestrator.resolve_candidate_id(&id).await {
            Some(candidate_id) => {
                if let Err(e) = orchestrator.submit_rating(candidate_id, rating) {
                    println!("{}", e.notice());
                }
            }
            None => println!("No candidate with id {}", id),
        },
        Command::Draft => {
            let orchestrator = orchestrator.clone();
            stages.spawn(async move {
                let _ = orchestrator.generate_draft().await;
            });
        }
        Command::EditArticle(text) => orchestrator.set_draft_article(text).await,
        Command::Instruction(text) => orchestrator.set_instruction(text).await,
        Command::Final => {
            let orchestrator = orchestrator.clone();
            stages.spawn(async move {
                let _ = orchestrator.generate_final().await;
            });
        }
        Command::Export(path) => {
            let path = path.unwrap_or_else(|| options.default_export_path.clone());
            if let Err(e) = orchestrator.export_final(&path).await {
                println!("{}", e.notice());
            }
        }
        Command::Status => print_status(orchestrator).await,
        Command::Help => println!("{}", HELP),
        Command::Reset | Command::Quit => {}
    }
}

async fn print_status(orchestrator: &WorkflowOrchestrator) {
    let session = orchestrator.snapshot().await;
    println!("Session {} (started {})", session.session_id, session.started_at.to_rfc3339());
    println!("Step: {:?}", session.step);
    println!("Busy: {:?}", orchestrator.busy_state());
    println!("Topic: {}", session.form.topic_main);
    println!("{}", history_label(session.history_count));
    println!("Candidates: {} ({} recommended)", session.candidates.len(), session.selected_count());
    for line in parameter_lines(&session.form.params) {
        println!("{}", line);
    }
    if !session.draft.summary.is_empty() {
        println!("\n--- Summary ---\n{}", session.draft.summary);
    }
    if !session.draft.article.is_empty() {
        println!("\n--- Draft article ---\n{}", session.draft.article);
    }
    if !session.draft.instruction.is_empty() {
        println!("\n--- Instruction ---\n{}", session.draft.instruction);
    }
    if !session.draft.final_text.is_empty() {
        println!("\n--- Final article ---\n{}", session.draft.final_text);
    }
}

/// Parameter listing grouped by family, in form order
fn parameter_lines(params: &ParameterSet) -> Vec<String> {
    let mut lines = Vec::with_capacity(ParameterKey::ALL.len() + 3);
    let mut family = None;
    for key in ParameterKey::ALL {
        if family != Some(key.family()) {
            family = Some(key.family());
            lines.push(format!("{}:", key.family().label()));
        }
        let value = match key {
            ParameterKey::Length => format!("{}", params.get(key)),
            _ => format!("{:.2}", params.get(key)),
        };
        let name = key.wire_key().strip_prefix("p_").unwrap_or(key.wire_key());
        lines.push(format!("  {:<46} {:<12} {}", key.label(), name, value));
    }
    lines
}
