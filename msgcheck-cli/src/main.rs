use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use msgcheck_monitor::{
    AccountCheck, Check, CheckConfig, CheckResult, ClusterCheck, CredentialCheck, MessageCheck,
    VitalsCheck,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod render;

use render::{render, OutputFormat};

#[derive(Parser)]
#[command(name = "msgcheck")]
#[command(about = "Messaging cluster health checks with Nagios compatible output")]
#[command(version)]
struct Cli {
    /// Threshold configuration file (TOML)
    #[arg(short, long, global = true, env = "MSGCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Nagios)]
    format: OutputFormat,

    /// Evaluate as of this RFC 3339 instant instead of the current time
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SnapshotArgs {
    /// JSON snapshot to evaluate, `-` reads standard input
    #[arg(short, long, default_value = "-")]
    snapshot: String,
}

impl SnapshotArgs {
    /// A literal `null` snapshot means nothing was received
    fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let raw = if self.snapshot == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read snapshot from stdin")?;
            buf
        } else {
            fs::read_to_string(&self.snapshot)
                .with_context(|| format!("failed to read snapshot {}", self.snapshot))?
        };

        serde_json::from_str(&raw).with_context(|| format!("invalid snapshot {}", self.snapshot))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Server vitals: required features, uptime, CPU, memory and client load
    Vitals {
        #[command(flatten)]
        input: SnapshotArgs,
        /// Expected server name
        #[arg(long)]
        name: Option<String>,
    },
    /// Account resource usage against server limits
    Account {
        #[command(flatten)]
        input: SnapshotArgs,
    },
    /// Consensus group leadership and peer state
    Cluster {
        #[command(flatten)]
        input: SnapshotArgs,
        /// Expected number of peers including the leader
        #[arg(long)]
        expected_peers: Option<usize>,
    },
    /// Credential expiry
    Credential {
        #[command(flatten)]
        input: SnapshotArgs,
        /// Credentials without expiry are critical
        #[arg(long)]
        require_expiry: bool,
    },
    /// Age of the last message on a stream subject
    Message {
        #[command(flatten)]
        input: SnapshotArgs,
        #[arg(long)]
        stream: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        /// Read the body as Unix seconds instead of the publish time
        #[arg(long)]
        body_timestamp: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Vitals { .. } => "vitals",
            Commands::Account { .. } => "account",
            Commands::Cluster { .. } => "cluster",
            Commands::Credential { .. } => "credential",
            Commands::Message { .. } => "message",
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CheckConfig> {
    let config = match path {
        Some(path) => CheckConfig::load(path)?,
        None => CheckConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn run<C>(check: C, input: &SnapshotArgs, now: DateTime<Utc>) -> Result<CheckResult>
where
    C: Check,
    C::Snapshot: DeserializeOwned,
{
    let snapshot: Option<C::Snapshot> = input.load()?;
    debug!(check = check.name(), received = snapshot.is_some(), "evaluating snapshot");

    let mut result = CheckResult::new();
    check.check(&mut result, snapshot.as_ref(), now)?;
    Ok(result)
}

fn execute(cli: &Cli) -> Result<CheckResult> {
    let config = load_config(cli.config.as_deref())?;
    let now = cli.now.unwrap_or_else(Utc::now);

    match &cli.command {
        Commands::Vitals { input, name } => {
            let mut options = config.vitals_options();
            if name.is_some() {
                options.name = name.clone();
            }
            run(VitalsCheck::new(options), input, now)
        }
        Commands::Account { input } => run(AccountCheck::new(config.account_options()), input, now),
        Commands::Cluster { input, expected_peers } => {
            let mut options = config.cluster_options();
            if expected_peers.is_some() {
                options.expected_peers = *expected_peers;
            }
            run(ClusterCheck::new(options), input, now)
        }
        Commands::Credential { input, require_expiry } => {
            let mut options = config.credential_options();
            options.requires_expiry |= *require_expiry;
            run(CredentialCheck::new(options), input, now)
        }
        Commands::Message {
            input,
            stream,
            subject,
            body_timestamp,
        } => {
            let mut options = config.message_options();
            if let Some(stream) = stream {
                options.stream = stream.clone();
            }
            if let Some(subject) = subject {
                options.subject = subject.clone();
            }
            options.body_as_timestamp |= *body_timestamp;
            run(MessageCheck::new(options), input, now)
        }
    }
}

fn unknown(check: &str, err: &anyhow::Error) -> ! {
    error!(check, "check could not be evaluated: {:#}", err);
    println!("{} UNKNOWN {:#}", check.to_uppercase(), err);
    process::exit(3);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let check = cli.command.name();

    let result = match execute(&cli) {
        Ok(result) => result,
        Err(e) => unknown(check, &e),
    };

    match render(check, &result, cli.format) {
        Ok(output) => println!("{}", output),
        Err(e) => unknown(check, &e),
    }

    process::exit(result.status().exit_code());
}
