use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tokio::sync::mpsc;

use chama_chat::config;
use chama_chat::events::{ChatEvent, TerminalEventHandler, dispatch_event};
use chama_chat::{Pacing, SessionContext, TurnOutcome, TurnSequencer, WebhookGateway, logging};

#[derive(Parser)]
#[command(name = "chama-chat")]
#[command(version)]
#[command(about = "Terminal client for the Chama Gêmea consultation chat")]
struct Args {
    /// Single message to send (non-interactive mode)
    #[arg(short, long)]
    message: Option<String>,

    /// Open the conversation with the free-consultation greeting
    #[arg(long)]
    start: bool,

    /// Webhook endpoint override
    #[arg(long)]
    url: Option<String>,

    /// Page section tag attached to every turn
    #[arg(long)]
    section: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    let settings = config::load().resolve(args.url, args.section);

    let gateway = Arc::new(WebhookGateway::new(
        settings.webhook_url,
        settings.request_timeout,
    )?);
    let session = SessionContext::new(settings.section);

    // One-shot runs skip the typing theater; the REPL keeps it.
    let pacing = if args.message.is_some() {
        Pacing::instant()
    } else {
        Pacing::default()
    };

    let (events_tx, events_rx) = mpsc::unbounded_channel::<ChatEvent>();
    let sequencer = TurnSequencer::new(gateway, session.clone(), pacing, Some(events_tx));

    let printer = tokio::spawn(async move {
        let mut handler = TerminalEventHandler::new();
        let mut events_rx = events_rx;
        while let Some(event) = events_rx.recv().await {
            dispatch_event(&mut handler, &event);
        }
    });

    eprintln!(
        "{} v{} | sessão {}",
        "chama-chat".bold(),
        env!("CARGO_PKG_VERSION").cyan(),
        session.id().yellow()
    );
    eprintln!();

    if args.start {
        sequencer.start_consultation().await;
    }

    if let Some(message) = args.message {
        sequencer.submit(&message).await;
    } else {
        run_repl(&sequencer).await?;
    }

    // Dropping the sequencer closes the events channel; the printer
    // drains whatever is left and exits.
    drop(sequencer);
    let _ = printer.await;

    Ok(())
}

async fn run_repl(sequencer: &TurnSequencer) -> Result<()> {
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("você".to_string()),
        DefaultPromptSegment::Empty,
    );

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                if input == "/quit" || input == "/exit" || input == "/q" {
                    break;
                }

                if input == "/session" {
                    println!("{}", sequencer.session().id());
                    continue;
                }

                if input == "/start" {
                    sequencer.start_consultation().await;
                    continue;
                }

                if input == "/help" || input == "/h" {
                    eprintln!("Commands:");
                    eprintln!("  /q, /quit, /exit  Exit the chat");
                    eprintln!("  /start            Begin the free consultation");
                    eprintln!("  /session          Show the session identifier");
                    eprintln!("  /h, /help         Show this help message");
                    eprintln!();
                    continue;
                }

                match sequencer.submit(input).await {
                    TurnOutcome::Completed { .. } | TurnOutcome::EmptyInput => {}
                    TurnOutcome::Busy => {
                        eprintln!("{}", "[aguarde a resposta chegar]".yellow());
                    }
                }
            }
            Ok(Signal::CtrlC) => {
                eprintln!("[interrompido]");
            }
            Ok(Signal::CtrlD) => {
                break;
            }
            Err(err) => {
                eprintln!("[erro de leitura: {err}]");
                break;
            }
        }
    }

    Ok(())
}
