//! railqa application binary - composition root.
//!
//! 1. Load configuration from TOML and apply CLI/env overrides
//! 2. Build the HTTP gateway to the backend
//! 3. Dispatch to the question, generation or health command

mod cli;
mod system;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use railqa_chat::{AnswerLine, ConversationSession, Message, SubmitOutcome};
use railqa_core::platform::{DirectorySaver, UrlOpener};
use railqa_core::RailqaConfig;
use railqa_gateway::{Gateway, HttpGateway, Probe};
use railqa_generate::{GenerateOutcome, GenerationOutput, GenerationWorkflow, EXAMPLE_DESCRIPTIONS};
use railqa_health::{HealthMonitor, HealthState};

use cli::{CliArgs, Command};
use system::{SystemBrowser, SystemClipboard};

/// Path of the reference document served by the backend.
const NETWORK_STATEMENT_PATH: &str = "/NetworkStatement2026.pdf";

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

fn print_message(message: &Message) {
    println!("{}:", message.kind);
    for line in message.rendered() {
        match line {
            AnswerLine::Heading(text) => println!("  ## {}", text),
            AnswerLine::Body(text) => println!("  {}", text),
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_health(state: &HealthState) {
    for probe in Probe::ALL {
        println!("{:<12} {}", probe.label(), state.get(probe));
    }
}

async fn run_ask(
    gateway: Arc<dyn Gateway>,
    config: &RailqaConfig,
    question: &str,
    show_context: bool,
    json: bool,
) -> AppResult<ExitCode> {
    let session = ConversationSession::new(gateway).with_timeout(config.gateway.request_timeout());
    let outcome = session.submit_question(question).await;

    let Some(reply) = session.transcript().pop() else {
        return Ok(ExitCode::FAILURE);
    };
    if json {
        print_json(&reply)?;
    } else {
        print_message(&reply);
        if show_context {
            if let Some(ref context) = reply.context {
                println!("\nContext ({} sources):", reply.sources.unwrap_or(0));
                println!("{}", context);
            }
        }
    }

    Ok(match outcome {
        SubmitOutcome::Answered => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn run_chat(gateway: Arc<dyn Gateway>, config: &RailqaConfig) -> AppResult<ExitCode> {
    let session = ConversationSession::new(gateway).with_timeout(config.gateway.request_timeout());
    let clipboard = SystemClipboard::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Ask about the network statement. Commands: /copy N, /clear, /quit");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/clear", _) => {
                session.clear_all();
                println!("Conversation cleared.");
            }
            ("/copy", arg) => {
                let Some(index) = arg.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1))
                else {
                    println!("Usage: /copy N");
                    continue;
                };
                match session.copy_message(index, &clipboard) {
                    Ok(()) => println!("Copied message {}.", index + 1),
                    Err(e) => println!("Copy failed: {}", e),
                }
            }
            _ => {
                let before = session.transcript().len();
                if session.submit_question(line).await == SubmitOutcome::Ignored {
                    continue;
                }
                for message in session.transcript().iter().skip(before + 1) {
                    print_message(message);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

struct GenerateArgs {
    description: Option<String>,
    example: Option<usize>,
    copy: bool,
    download: Option<std::path::PathBuf>,
    open: bool,
    json: bool,
}

async fn run_generate(
    gateway: Arc<dyn Gateway>,
    config: &RailqaConfig,
    args: GenerateArgs,
) -> AppResult<ExitCode> {
    let workflow = GenerationWorkflow::new(gateway)
        .with_timeout(config.gateway.request_timeout())
        .with_viewer(config.viewer.clone());

    match (args.description, args.example) {
        (Some(description), _) => workflow.set_draft(&description),
        (None, Some(n)) => {
            let Some(title) = n.checked_sub(1).and_then(|i| workflow.use_example(i)) else {
                eprintln!("No example {}. Available:", n);
                for (i, (title, _)) in EXAMPLE_DESCRIPTIONS.iter().enumerate() {
                    eprintln!("  {}. {}", i + 1, title);
                }
                return Ok(ExitCode::FAILURE);
            };
            tracing::info!(example = title, "Using example description");
        }
        (None, None) => {
            eprintln!("Provide a description or --example N.");
            return Ok(ExitCode::FAILURE);
        }
    }

    let outcome = workflow.submit_draft().await;
    let output = workflow.output();
    if args.json {
        print_json(&output)?;
    }

    let script = match (&outcome, &output) {
        (GenerateOutcome::Generated, Some(GenerationOutput::Success { script })) => script.clone(),
        _ => {
            if !args.json {
                if let Some(GenerationOutput::Failure { reason }) = &output {
                    eprintln!("Error: {}", reason);
                }
            }
            return Ok(ExitCode::FAILURE);
        }
    };
    if !args.json {
        println!("{}", script);
    }

    if let Some(dir) = args.download {
        let path = workflow.download_output(&DirectorySaver::new(dir))?;
        eprintln!("Saved {}", path.display());
    }
    if args.open {
        workflow.open_in_external_viewer(&SystemBrowser)?;
        eprintln!("Opened diagram in external viewer.");
    }
    if args.copy {
        workflow.copy_output(&SystemClipboard::new())?;
        eprintln!("Copied script to clipboard.");
        #[cfg(target_os = "linux")]
        hold_copied_script(script).await?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Serve the copied script until something else is copied or the user
/// interrupts. The selection is owned by this process.
#[cfg(target_os = "linux")]
async fn hold_copied_script(script: String) -> AppResult<()> {
    eprintln!("Keeping the script on the clipboard until something else is copied (Ctrl-C to stop).");
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        let _ = done_tx.send(system::hold_selection(&script));
    });
    tokio::select! {
        held = done_rx => {
            if let Ok(result) = held {
                result?;
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, releasing clipboard selection");
        }
    }
    Ok(())
}

async fn run_status(
    gateway: Arc<dyn Gateway>,
    config: &RailqaConfig,
    watch: bool,
    json: bool,
) -> AppResult<ExitCode> {
    let monitor = HealthMonitor::new(gateway, config);

    if !watch {
        let state = monitor.poll_once().await;
        if json {
            print_json(&state)?;
        } else {
            print_health(&state);
        }
        return Ok(if state.all_online() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let mut rx = monitor.subscribe();
    let handle = monitor.activate();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *rx.borrow_and_update();
                if json {
                    println!("{}", serde_json::to_string(&state)?);
                } else {
                    println!("---");
                    print_health(&state);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping health polling");
                break;
            }
        }
    }
    handle.deactivate();
    Ok(ExitCode::SUCCESS)
}

fn run_open_document(base_url: &str) -> AppResult<ExitCode> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), NETWORK_STATEMENT_PATH);
    SystemBrowser.open(&url)?;
    println!("Opened {}", url);
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> AppResult<ExitCode> {
    let args = CliArgs::parse();

    // Configuration is read before tracing so the configured level applies.
    let config_file = args.resolve_config_path();
    let loaded = config_file
        .exists()
        .then(|| RailqaConfig::load(&config_file));
    let mut config = match loaded {
        Some(Ok(ref config)) => config.clone(),
        _ => RailqaConfig::default(),
    };

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    match loaded {
        Some(Ok(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(Err(e)) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::debug!(path = %config_file.display(), "No config file, using defaults"),
    }

    config.gateway.base_url = args.resolve_base_url(&config.gateway.base_url);
    config.validate()?;

    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::from_config(&config.gateway)?);
    tracing::debug!(base_url = %config.gateway.base_url, "Gateway ready");

    match args.command {
        Command::Ask { question, context } => {
            run_ask(gateway, &config, &question.join(" "), context, args.json).await
        }
        Command::Chat => run_chat(gateway, &config).await,
        Command::Generate {
            description,
            example,
            copy,
            download,
            out_dir,
            open,
        } => {
            let download = download.then(|| {
                cli::resolve_download_dir(out_dir.as_ref(), &config.general.download_dir)
            });
            let generate = GenerateArgs {
                description,
                example,
                copy,
                download,
                open,
                json: args.json,
            };
            run_generate(gateway, &config, generate).await
        }
        Command::Status { watch } => run_status(gateway, &config, watch, args.json).await,
        Command::OpenDocument => run_open_document(&config.gateway.base_url),
    }
}
