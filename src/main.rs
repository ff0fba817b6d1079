use anyhow::Result;
use ceramic_studio::app::App;
use ceramic_studio::client::{ApiClient, ChatSession};
use ceramic_studio::intent::IntentClassifier;
use ceramic_studio::models::{Config, Role};
use ceramic_studio::poller::{JobPoller, PollPolicy};
use ceramic_studio::server;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ceramic-studio")]
#[command(about = "Chat and pattern-design orchestrator for a ceramic studio")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Overrides PORT from the environment.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send one message to a running server and print the replies.
    Chat {
        message: String,
        #[arg(long, default_value = "http://localhost:5000")]
        server: String,
        /// Seconds between image status checks.
        #[arg(long, default_value_t = 3, value_parser = parse_interval_secs)]
        interval: u64,
        /// Status checks before giving up on an image.
        #[arg(long, default_value_t = 40)]
        max_attempts: u32,
    },
}

fn parse_interval_secs(input: &str) -> std::result::Result<u64, String> {
    match input.parse::<u64>() {
        Ok(0) => Err("Interval must be at least 1 second".to_string()),
        Ok(secs) => Ok(secs),
        Err(_) => Err(format!("Invalid interval '{}'. Expected whole seconds", input)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ceramic_studio=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    match args.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => run_server(port).await,
        Command::Chat {
            message,
            server,
            interval,
            max_attempts,
        } => {
            let policy = PollPolicy {
                interval: Duration::from_secs(interval),
                max_attempts,
            };
            run_chat(&server, &message, policy).await
        }
    }
}

async fn run_server(port_override: Option<u16>) -> Result<()> {
    info!("Starting ceramic-studio");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let port = port_override.unwrap_or(config.port);
    let app = Arc::new(App::from_config(&config));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    if let Err(e) = server::serve(listener, app).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run_chat(server: &str, message: &str, policy: PollPolicy) -> Result<()> {
    let session = ChatSession::new(
        ApiClient::new(server)?,
        IntentClassifier::default(),
        JobPoller::new(policy),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    for reply in session.send(message, &cancel).await {
        let speaker = match reply.role {
            Role::User => "user",
            Role::Bot => "bot",
        };
        if reply.is_image {
            println!("{}: [image] {}", speaker, reply.text);
        } else {
            println!("{}: {}", speaker, reply.text);
        }
    }
    Ok(())
}
