//! kvbridge CLI Client
//!
//! Command-line interface for sending commands through the core engine.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kvbridge::network::Transport;
use kvbridge::protocol::{Command, RequestType, Value};
use kvbridge::routing::{ByAddressRoute, Route, SlotType};
use kvbridge::{BridgeError, Client, ClientConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// kvbridge CLI
#[derive(Parser, Debug)]
#[command(name = "kvbridge-cli")]
#[command(about = "CLI for a key-value core engine")]
#[command(version)]
struct Args {
    /// Engine Unix socket path
    #[arg(short, long, conflicts_with = "tcp")]
    socket: Option<String>,

    /// Engine TCP address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    tcp: String,

    /// Route: all-nodes | all-primaries | random | key:<key>[@replica] |
    /// slot:<id>[@replica] | addr:<host:port>
    #[arg(short, long, value_parser = parse_route)]
    route: Option<Route>,

    /// Request timeout in milliseconds (0 waits forever)
    #[arg(long, default_value = "250")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Ping the engine
    Ping,

    /// Send an arbitrary command (name first)
    Custom {
        #[arg(required = true, num_args = 1..)]
        args: Vec<String>,
    },
}

/// Split an optional `@primary` / `@replica` suffix off a slot route target
fn split_slot_type(target: &str) -> Result<(&str, SlotType), String> {
    match target.rsplit_once('@') {
        Some((value, "replica")) => Ok((value, SlotType::Replica)),
        Some((value, "primary")) => Ok((value, SlotType::Primary)),
        Some((_, other)) => Err(format!("unknown slot type `{}`", other)),
        None => Ok((target, SlotType::Primary)),
    }
}

fn parse_route(text: &str) -> Result<Route, String> {
    match text {
        "all-nodes" => return Ok(Route::AllNodes),
        "all-primaries" => return Ok(Route::AllPrimaries),
        "random" => return Ok(Route::RandomNode),
        _ => {}
    }

    let Some((kind, target)) = text.split_once(':') else {
        return Err(format!("unrecognized route `{}`", text));
    };

    match kind {
        "key" => {
            let (key, slot_type) = split_slot_type(target)?;
            Ok(Route::slot_key(slot_type, key))
        }
        "slot" => {
            let (id, slot_type) = split_slot_type(target)?;
            let id = id
                .parse::<u16>()
                .map_err(|_| format!("slot id `{}` is not a number", id))?;
            Route::slot_id(slot_type, id).map_err(|e| e.to_string())
        }
        "addr" => ByAddressRoute::parse(target)
            .map(Route::from)
            .map_err(|e| e.to_string()),
        _ => Err(format!("unrecognized route kind `{}`", kind)),
    }
}

fn build_command(command: Commands) -> Command {
    match command {
        Commands::Get { key } => Command::new(RequestType::Get).arg(key),
        Commands::Set { key, value } => Command::new(RequestType::Set).arg(key).arg(value),
        Commands::Del { key } => Command::new(RequestType::Del).arg(key),
        Commands::Ping => Command::new(RequestType::Ping),
        Commands::Custom { args } => Command::custom(args),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Nil => "(nil)".to_string(),
        Value::Okay => "OK".to_string(),
        Value::Int(i) => format!("(integer) {}", i),
        Value::Boolean(b) => format!("(boolean) {}", b),
        Value::Simple(s) => s.clone(),
        Value::Bulk(bytes) => format!("\"{}\"", String::from_utf8_lossy(bytes)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}) {}", i + 1, render(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Map(entries) => entries
            .iter()
            .map(|(k, v)| format!("{} => {}", render(k), render(v)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn run<S: Transport>(client: Client<S>, command: Command, route: Option<&Route>) -> ExitCode {
    match client.execute(command, route) {
        Ok(value) => {
            println!("{}", render(&value));
            ExitCode::SUCCESS
        }
        Err(BridgeError::Request { message, .. }) => {
            println!("(error) {}", message);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .request_timeout_ms(args.timeout_ms)
        .build();
    let command = build_command(args.command);
    let route = args.route.as_ref();

    if let Some(route) = route {
        tracing::debug!("Routing to {}", route);
    }

    match args.socket {
        #[cfg(unix)]
        Some(path) => match Client::connect_unix(&path, config) {
            Ok(client) => run(client, command, route),
            Err(e) => {
                tracing::error!("Failed to connect to {}: {}", path, e);
                ExitCode::FAILURE
            }
        },
        #[cfg(not(unix))]
        Some(_) => {
            tracing::error!("Unix sockets are not supported on this platform");
            ExitCode::FAILURE
        }
        None => match Client::connect_tcp(args.tcp.as_str(), config) {
            Ok(client) => run(client, command, route),
            Err(e) => {
                tracing::error!("Failed to connect to {}: {}", args.tcp, e);
                ExitCode::FAILURE
            }
        },
    }
}
