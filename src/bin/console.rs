//! Terminal front end for the intake agent
//!
//! Typed-only: a terminal has no speech collaborators, which the runtime
//! reports once at startup.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voice_intake::config::AppConfig;
use voice_intake::dialogue::FlowState;
use voice_intake::relay::Relay;
use voice_intake::runtime::{
    self, Event, Mode, NoSpeechInput, NoSpeechOutput, Role, RuntimeHandle, UiEvent,
};

const HELP: &str = "Commands: /mode browser|pro, /reset, /stop, /summary, /quit";

enum Command {
    Say(String),
    SwitchMode(Mode),
    Reset,
    StopSpeaking,
    Summary,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("mode"), Some(mode)) => mode.parse().map(Command::SwitchMode),
        (Some("reset"), None) => Ok(Command::Reset),
        (Some("stop"), None) => Ok(Command::StopSpeaking),
        (Some("summary"), None) => Ok(Command::Summary),
        (Some("quit" | "exit"), None) => Ok(Command::Quit),
        (Some("help"), None) => Ok(Command::Help),
        _ => Err(format!("Unknown command '{line}'. {HELP}")),
    }
}

fn print_event(event: &UiEvent) {
    match event {
        UiEvent::MessageAppended(message) => {
            let who = match message.role {
                Role::User => "du",
                Role::Agent => "agent",
            };
            println!("[{who}] {}", message.text);
        }
        UiEvent::TranscriptCleared => println!("--- neues Gespräch ---"),
        UiEvent::ModeChanged(mode) => println!("(mode: {mode})"),
        UiEvent::Notice(text) => println!("(!) {text}"),
        UiEvent::StatusChanged(_)
        | UiEvent::FlowChanged(_)
        | UiEvent::SummaryChanged(_)
        | UiEvent::CaptureText { .. } => {}
    }
}

/// Route typed text: the contact step takes its own command
async fn say(handle: &RuntimeHandle, text: String) -> Result<(), runtime::RuntimeClosed> {
    let snapshot = handle.snapshot().await?;
    if snapshot.mode == Mode::Browser && snapshot.flow_state == FlowState::AskContact {
        handle.send(Event::SubmitContact { raw: text }).await
    } else {
        handle.submit(text).await
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_intake=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = AppConfig::from_env();
    let relay = Relay::from_config(&config.relay)?;
    tracing::info!(model = %relay.model_id(), mode = %config.initial_mode, "Starting console");

    let (handle, mut ui) = runtime::spawn_subscribed(
        config.runtime_settings(),
        relay,
        NoSpeechOutput,
        NoSpeechInput,
    );

    let printer = tokio::spawn(async move {
        loop {
            match ui.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Console fell behind on events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(Command::Say(text)) => say(&handle, text).await?,
            Ok(Command::SwitchMode(mode)) => handle.send(Event::SwitchMode { mode }).await?,
            Ok(Command::Reset) => handle.send(Event::Reset).await?,
            Ok(Command::StopSpeaking) => handle.send(Event::StopSpeaking).await?,
            Ok(Command::Summary) => {
                let snapshot = handle.snapshot().await?;
                if snapshot.summary.is_empty() {
                    println!("(noch keine Zusammenfassung)");
                } else {
                    println!("{}", snapshot.summary);
                }
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(message) => println!("{message}"),
        }
    }

    handle.send(Event::Shutdown).await?;
    printer.abort();
    Ok(())
}
