//! Welli Clinician Assistant — Demo CLI
//!
//! Drives the two assistant chat surfaces from the command line. Every reply
//! goes through a real chat session, so the thinking delay applies unless
//! `--delay-ms` overrides it.
//!
//! Usage:
//!   cargo run -p demo -- run-all --delay-ms 0
//!   cargo run -p demo -- ask --patient 1 "Identify possible causes for the patient's headaches"
//!   cargo run -p demo -- explain --surface medical "chest pain and diabetes"
//!   cargo run -p demo -- chat --surface patient --patient 3
//!   cargo run -p demo -- rules --surface medical
//!   cargo run -p demo -- patients --search diabetes

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use welli_contracts::{
    error::{WelliError, WelliResult},
    session::SubmitOutcome,
};
use welli_core::config::AssistantConfig;
use welli_ref_dashboard::{
    mock_data::{find_patient, search_patients},
    scenarios::{medical_page, patient_panel, shared_table},
    ChatSurface, SurfaceKind,
};
use welli_responder::{template, KeywordResponder};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Welli — clinician dashboard assistant demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Welli clinician assistant demo",
    long_about = "Runs the Welli assistant chat surfaces: scripted scenarios,\n\
                  one-shot questions, an interactive chat, and rule table inspection."
)]
struct Cli {
    /// Assistant config TOML (thinking delay, custom rule tables).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the thinking delay in milliseconds.
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: the per-patient assistant panel.
    PatientPanel,
    /// Scenario 2: the standalone medical assistant page.
    MedicalPage,
    /// Scenario 3: both surfaces on one rule table.
    SharedTable,
    /// Ask one question and print the reply.
    Ask {
        #[command(flatten)]
        target: Target,
        /// Print the reply as JSON.
        #[arg(long)]
        json: bool,
        message: String,
    },
    /// Show which rule a message would match, without waiting.
    Explain {
        #[command(flatten)]
        target: Target,
        message: String,
    },
    /// Chat interactively on stdin. Type /quit to leave.
    Chat {
        #[command(flatten)]
        target: Target,
    },
    /// List the rules of a surface's table in evaluation order.
    Rules {
        #[arg(long, value_enum, default_value_t = Surface::Patient)]
        surface: Surface,
    },
    /// List the mock patient directory.
    Patients {
        /// Filter by name or condition.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Surface {
    Patient,
    Medical,
}

#[derive(clap::Args)]
struct Target {
    /// Which chat surface to talk to.
    #[arg(long, value_enum, default_value_t = Surface::Patient)]
    surface: Surface,
    /// Patient id for the patient panel. Unknown ids fall back to the first patient.
    #[arg(long, default_value = "1")]
    patient: String,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match load_config(&cli) {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> WelliResult<AssistantConfig> {
    let mut config = match &cli.config {
        Some(path) => AssistantConfig::from_file(path)?,
        None => AssistantConfig::default(),
    };
    if let Some(delay_ms) = cli.delay_ms {
        config.thinking_delay_ms = delay_ms;
    }
    debug!(thinking_delay_ms = config.thinking_delay_ms, "assistant config loaded");
    Ok(config)
}

async fn run(command: Command, config: AssistantConfig) -> WelliResult<()> {
    match command {
        Command::RunAll => {
            print_banner();
            patient_panel::run_scenario(&config).await?;
            medical_page::run_scenario(&config).await?;
            shared_table::run_scenario(&config).await?;
            println!("All scenarios completed successfully.");
            Ok(())
        }
        Command::PatientPanel => patient_panel::run_scenario(&config).await,
        Command::MedicalPage => medical_page::run_scenario(&config).await,
        Command::SharedTable => shared_table::run_scenario(&config).await,
        Command::Ask { target, json, message } => ask(&config, &target, &message, json).await,
        Command::Explain { target, message } => explain(&config, &target, &message),
        Command::Chat { target } => chat(&config, &target).await,
        Command::Rules { surface } => list_rules(&config, surface),
        Command::Patients { search, json } => list_patients(search.as_deref(), json),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn responder_for(config: &AssistantConfig, surface: Surface) -> WelliResult<KeywordResponder> {
    match surface {
        Surface::Patient => KeywordResponder::for_patient_panel(config),
        Surface::Medical => KeywordResponder::for_medical_page(config),
    }
}

fn open_surface(config: &AssistantConfig, target: &Target) -> WelliResult<ChatSurface> {
    let responder = Arc::new(responder_for(config, target.surface)?);
    Ok(match target.surface {
        Surface::Patient => ChatSurface::patient_panel(&find_patient(&target.patient), responder, config),
        Surface::Medical => ChatSurface::medical_page(responder, config),
    })
}

async fn ask(config: &AssistantConfig, target: &Target, message: &str, json: bool) -> WelliResult<()> {
    let surface = open_surface(config, target)?;

    if surface.send(message)? != SubmitOutcome::Accepted {
        println!("(nothing to send)");
        return Ok(());
    }

    // `None` only when the session reached Closed before the reply landed.
    let reply = surface.wait_for_reply().await.ok_or_else(|| WelliError::SessionClosed {
        session_id: surface.session().id().to_string(),
    })?;

    if json {
        println!("{}", to_json(&reply)?);
    } else {
        println!("{}", reply.content);
    }
    Ok(())
}

fn explain(config: &AssistantConfig, target: &Target, message: &str) -> WelliResult<()> {
    let responder = responder_for(config, target.surface)?;
    let selection = responder.select(message);

    match selection.rule_id {
        Some(rule_id) => {
            let rule = responder.table().rules.iter().find(|r| r.id == rule_id);
            println!("table:   {}", responder.table().name);
            println!("rule:    {}", rule_id);
            if let Some(rule) = rule {
                println!("match:   {}", rule.matches.describe());
            }
        }
        None => {
            println!("table:   {}", responder.table().name);
            println!("rule:    (fallback)");
        }
    }
    println!(
        "subject: {}",
        if template::mentions_subject(selection.template) { "interpolated" } else { "not used" }
    );
    Ok(())
}

async fn chat(config: &AssistantConfig, target: &Target) -> WelliResult<()> {
    let surface = open_surface(config, target)?;
    let kind = surface.kind();

    println!("{}", kind.title());
    println!("{}", "=".repeat(kind.title().len()));
    for message in surface.messages() {
        println!("{}\n", message.content);
    }
    println!("Suggested questions (type the number to send one):");
    for (index, suggestion) in kind.suggestions().iter().enumerate() {
        println!("  [{}] {}", index + 1, suggestion);
    }
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let Some(line) = lines.next() else { break };
        let line = line.map_err(|e| WelliError::Io {
            reason: format!("failed to read stdin: {}", e),
        })?;
        let input = line.trim();
        if input == "/quit" {
            break;
        }

        let outcome = match input.parse::<usize>() {
            Ok(n) if surface.suggestions_visible() && n >= 1 => surface.send_suggestion(n - 1)?,
            _ => surface.send(&line)?,
        };
        if outcome != SubmitOutcome::Accepted {
            continue;
        }

        println!("{}...", kind.pending_label());
        if let Some(reply) = surface.wait_for_reply().await {
            println!("\n{}\n", reply.content);
        }
    }

    surface.close();
    println!("{}", kind.disclaimer());
    Ok(())
}

fn list_rules(config: &AssistantConfig, surface: Surface) -> WelliResult<()> {
    let responder = responder_for(config, surface)?;
    let table = responder.table();

    println!("Rule table '{}' (first match wins)", table.name);
    for (index, rule) in table.rules.iter().enumerate() {
        println!("  {:>2}. {:<26} {}", index + 1, rule.id, rule.matches.describe());
        if !rule.description.is_empty() {
            println!("      {}", rule.description);
        }
    }
    println!("   -. {:<26} (no rule matched)", "fallback");
    Ok(())
}

fn list_patients(search: Option<&str>, json: bool) -> WelliResult<()> {
    let patients = search_patients(search.unwrap_or(""));

    if json {
        println!("{}", to_json(&patients)?);
        return Ok(());
    }

    for p in &patients {
        println!(
            "  {:>2}  {:<16} {:>3}  {:<7} {:<16} last visit {}",
            p.id, p.name, p.age, p.gender, p.condition, p.last_visit
        );
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> WelliResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| WelliError::Serialization {
        reason: e.to_string(),
    })
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Welli — Clinician Dashboard Assistant");
    println!("Scripted Demo");
    println!("=====================================");
    println!();
    println!("Per submitted message:");
    println!("  [1] Blank input is ignored; a message sent while a reply is pending is ignored");
    println!("  [2] The message is appended and the session enters AwaitingResponse");
    println!("  [3] After the thinking delay, the first matching keyword rule picks a template");
    println!("  [4] The patient's name is interpolated and the reply is appended");
    println!();
    println!("Surfaces: {} / {}", SurfaceKind::PatientPanel.title(), SurfaceKind::MedicalPage.title());
    println!();
}
