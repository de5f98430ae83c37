use anyhow::Result;
use clap::{Parser, Subcommand};
use counsel_backend::catalog;
use counsel_config::Config;
use counsel_service::{ConsultRequest, Consultant};
use counsel_types::ProviderId;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "counsel", about = "counsel — ask another model for a second opinion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one consultation and print the reply.
    Ask {
        /// The prompt text.
        prompt: String,
        /// Model identifier (see `counsel models`).
        #[arg(short, long)]
        model: String,
        /// File to include as context (repeatable).
        #[arg(short, long = "file", value_name = "PATH")]
        files: Vec<String>,
        /// Include the current working-tree diff as context.
        #[arg(long)]
        diff: bool,
        /// Resume a prior conversation by thread id.
        #[arg(short, long, value_name = "ID")]
        thread: Option<String>,
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// List the model catalog.
    Models,
    /// Show the resolved backend preference per provider family.
    Backends {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ask {
            prompt,
            model,
            files,
            diff,
            thread,
            config,
        } => cmd_ask(prompt, model, files, diff, thread, config).await,
        Commands::Models => {
            cmd_models();
            Ok(())
        }
        Commands::Backends { config } => cmd_backends(config),
    }
}

async fn cmd_ask(
    prompt: String,
    model: String,
    files: Vec<String>,
    diff: bool,
    thread: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let consultant = Consultant::new(load_config(config_path)?);
    let reply = consultant
        .consult(ConsultRequest {
            prompt,
            model,
            file_paths: files,
            include_diff: diff,
            thread_id: thread,
        })
        .await?;
    println!("{reply}");
    Ok(())
}

fn cmd_models() {
    for family in ProviderId::all() {
        println!("{family}:");
        for model in catalog::models(*family) {
            match counsel_service::cost::price_for(&model) {
                Some(price) => println!(
                    "  {model}  (${:.2} in / ${:.2} out per 1M tokens)",
                    price.input, price.output
                ),
                None => println!("  {model}"),
            }
        }
    }
}

fn cmd_backends(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    for family in ProviderId::all() {
        println!("{family}: {}", config.backend(*family));
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    Config::from_file(&path).map_err(|e| anyhow::anyhow!("config error: {e}"))
}

fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".counsel").join("config.yaml")
}
