use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "formgate")]
#[command(version, about = "Contact form gateway - files submissions as GitHub issues")]
pub struct Cli {
    /// Directory holding formgate.toml (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway
    Serve {
        /// Port to serve on (overrides config and FORMGATE_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind (overrides config and FORMGATE_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Enable dev mode (permissive CORS for a local frontend dev server)
        #[arg(long)]
        dev: bool,
    },
    /// Submit a contact form to a running gateway
    Send {
        /// Base URL of the gateway
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        gateway: String,

        /// Message body (required)
        #[arg(short, long)]
        message: String,

        #[arg(short, long, default_value = "")]
        name: String,

        #[arg(short, long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(short, long, default_value = "")]
        subject: String,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the resolved configuration (secrets redacted)
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default formgate.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Serve { port, host, dev } => {
            cmd::cmd_serve(&project_dir, *port, host.clone(), *dev).await?;
        }
        Commands::Send {
            gateway,
            message,
            name,
            email,
            phone,
            subject,
        } => {
            cmd::cmd_send(gateway, message, name, email, phone, subject).await?;
        }
        Commands::Config { command } => {
            cmd::cmd_config(&project_dir, command.clone())?;
        }
    }

    Ok(())
}
