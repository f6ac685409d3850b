//! # warren
//!
//! Command-line entry point: spawn a subagent through the configured
//! gateway, or inspect how a session key is classified.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use warren_gateway::HttpGateway;
use warren_runtime::{
    Cleanup, RunRegistry, SessionDepthIndex, SpawnContext, SpawnOrchestrator, SpawnRequest,
};
use warren_sessions::{
    DeliveryContext, SessionKind, ThreadId, classify_session_kind, derive_channel,
    resolve_display_session_key, resolve_internal_session_key, resolve_main_session_alias,
};
use warren_settings::WarrenSettings;

/// Warren subagent spawner.
#[derive(Parser, Debug)]
#[command(name = "warren", about = "Spawn subagent sessions through the gateway")]
struct Cli {
    /// Settings file (defaults to `~/.warren/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Spawn a child session and print the result as JSON.
    Spawn(SpawnArgs),
    /// Classify a session key and print its kind and channel.
    Classify(ClassifyArgs),
}

#[derive(clap::Args, Debug)]
struct SpawnArgs {
    /// Task for the child.
    #[arg(long)]
    task: String,
    /// Display label.
    #[arg(long)]
    label: Option<String>,
    /// Target agent id.
    #[arg(long = "agent")]
    agent_id: Option<String>,
    /// Model override (`provider/model`).
    #[arg(long)]
    model: Option<String>,
    /// Thinking level override.
    #[arg(long)]
    thinking: Option<String>,
    /// Run timeout in seconds.
    #[arg(long = "timeout", allow_negative_numbers = true)]
    timeout_seconds: Option<f64>,
    /// `delete` or `keep`.
    #[arg(long)]
    cleanup: Option<String>,
    /// Requester session key (defaults to the main session).
    #[arg(long)]
    session: Option<String>,
    /// Requester channel.
    #[arg(long)]
    channel: Option<String>,
    /// Requester recipient address.
    #[arg(long)]
    to: Option<String>,
    /// Requester account id.
    #[arg(long)]
    account: Option<String>,
    /// Requester thread id.
    #[arg(long)]
    thread: Option<String>,
    /// JSON file of stored session depths.
    #[arg(long)]
    depth_store: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ClassifyArgs {
    /// Session key to classify.
    key: String,
    /// Kind reported by the gateway, if any.
    #[arg(long)]
    gateway_kind: Option<String>,
    /// Explicit channel.
    #[arg(long)]
    channel: Option<String>,
    /// Last channel used by the session.
    #[arg(long)]
    last_channel: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Classification {
    key: String,
    internal_key: String,
    display_key: String,
    kind: SessionKind,
    channel: String,
}

impl SpawnArgs {
    fn request(&self) -> SpawnRequest {
        SpawnRequest {
            task: self.task.clone(),
            label: self.label.clone(),
            agent_id: self.agent_id.clone(),
            model: self.model.as_deref().map(Into::into),
            thinking: self.thinking.clone(),
            run_timeout_seconds: self.timeout_seconds,
            cleanup: Cleanup::parse(self.cleanup.as_deref()),
        }
    }

    fn context(&self) -> SpawnContext {
        SpawnContext {
            requester_session_key: self.session.clone(),
            origin: DeliveryContext {
                channel: self.channel.clone(),
                account_id: self.account.clone(),
                to: self.to.clone(),
                thread_id: self.thread.as_deref().map(parse_thread_id),
            },
            ..SpawnContext::default()
        }
    }
}

fn parse_thread_id(raw: &str) -> ThreadId {
    let raw = raw.trim();
    raw.parse::<i64>()
        .map_or_else(|_| ThreadId::from(raw), ThreadId::Number)
}

fn load_settings(path: Option<&Path>) -> Result<WarrenSettings> {
    let path = path.map_or_else(warren_settings::settings_path, Path::to_path_buf);
    warren_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

fn classify(settings: &WarrenSettings, args: &ClassifyArgs) -> Classification {
    let alias = resolve_main_session_alias(&settings.session);
    let internal_key = resolve_internal_session_key(&args.key, &alias.alias, &alias.main_key);
    let kind = classify_session_kind(
        &internal_key,
        args.gateway_kind.as_deref(),
        &alias.alias,
        &alias.main_key,
    );
    let channel = derive_channel(
        &internal_key,
        kind,
        args.channel.as_deref(),
        args.last_channel.as_deref(),
    );
    Classification {
        key: args.key.clone(),
        display_key: resolve_display_session_key(&internal_key, &alias.alias, &alias.main_key),
        internal_key,
        kind,
        channel,
    }
}

async fn run_spawn(settings: WarrenSettings, args: &SpawnArgs) -> Result<ExitCode> {
    let gateway = HttpGateway::from_settings(&settings.gateway)
        .context("Failed to create gateway client")?;
    let depths = match &args.depth_store {
        Some(path) => SessionDepthIndex::load_from_path(path)
            .with_context(|| format!("Failed to load depth store {}", path.display()))?,
        None => SessionDepthIndex::new(),
    };
    let timeout = std::time::Duration::from_millis(settings.gateway.timeout_ms);

    let orchestrator = SpawnOrchestrator::new(
        Arc::new(settings),
        Arc::new(gateway),
        Arc::new(RunRegistry::new()),
    )
    .with_depth_store(Arc::new(depths))
    .with_call_timeout(timeout);

    let result = orchestrator.spawn(args.request(), args.context()).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.is_accepted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;
    warren_core::logging::init_subscriber(&settings.logging.level, settings.logging.json);
    tracing::debug!(gateway = %settings.gateway.url, "settings loaded");

    match &cli.command {
        Command::Spawn(args) => run_spawn(settings, args).await,
        Command::Classify(args) => {
            let classification = classify(&settings, args);
            println!("{}", serde_json::to_string_pretty(&classification)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
