#![forbid(unsafe_code)]

mod console;
mod hotseat;

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::Parser;
use reversi_p2p_lib::{
    config::validate_config, discover_and_connect, load_from_path, run_session, Config, GameError,
    LineTransport, Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Reversi (Othello) peer-to-peer client")]
struct Cli {
    /// Run a local two-player hotseat game (no networking)
    #[arg(long)]
    hotseat: bool,

    /// Find a peer via UDP broadcast and play a networked game
    #[arg(long)]
    play: bool,

    /// UDP broadcast address (e.g. 255.255.255.255)
    #[arg(long, value_name = "ADDR")]
    broadcast_addr: Option<Ipv4Addr>,

    /// UDP broadcast port in [9000..9100]
    #[arg(long, value_name = "PORT")]
    broadcast_port: Option<u16>,

    /// Seconds to wait in each discovery/accept window (default: 5.0)
    #[arg(long, value_name = "SECS")]
    discover_window: Option<f64>,

    /// Path to an optional configuration TOML file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(long)]
    verbose: bool,

    /// Log in JSON lines (one object per line)
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let mut cfg = match cli.config.as_ref().map(load_from_path).transpose() {
        Ok(cfg) => cfg.unwrap_or_default(),
        Err(err) => {
            error!(%err, "failed to load configuration");
            return 1;
        }
    };
    if let Some(addr) = cli.broadcast_addr {
        cfg.discovery.broadcast_addr = Some(addr);
    }
    if let Some(port) = cli.broadcast_port {
        cfg.discovery.broadcast_port = Some(port);
    }
    if let Some(window) = cli.discover_window {
        cfg.discovery.window_secs = window;
    }
    if let Err(err) = validate_config(&cfg) {
        error!(%err, "invalid configuration");
        return 1;
    }

    if cli.hotseat {
        // Hotseat mode ignores broadcast options.
        return match hotseat::run_hotseat(&mut console::ConsoleUi::new()) {
            Ok(()) => 0,
            Err(err) => {
                error!(%err, "hotseat game failed");
                1
            }
        };
    }

    if !cli.play {
        eprintln!("Nothing to do: pass --hotseat for a local game or --play for a networked one.");
        return 2;
    }

    let (Some(addr), Some(port)) = (cfg.discovery.broadcast_addr, cfg.discovery.broadcast_port)
    else {
        eprintln!("Error: --broadcast-addr and --broadcast-port are required unless --hotseat is set.");
        return 2;
    };

    match run_network_game(&cfg, addr, port).await {
        Ok((black, white)) => {
            info!(black, white, "game finished");
            0
        }
        Err(GameError::UserAbort) => {
            info!("user quit, exiting");
            0
        }
        Err(err) => {
            error!(%err, "session ended with error");
            1
        }
    }
}

async fn run_network_game(cfg: &Config, addr: Ipv4Addr, port: u16) -> Result<(u32, u32)> {
    info!(
        window_secs = cfg.discovery.window_secs,
        "starting discovery"
    );
    let found = discover_and_connect(addr, port, cfg.window()).await?;
    info!(
        role = %found.role,
        peer = %found.peer,
        gameplay_port = found.gameplay_port,
        "matched"
    );

    let mut tg = LineTransport::with_timeout(found.stream, cfg.session_timeout());
    let mut ui = console::ConsoleUi::new();
    run_session(&mut tg, found.role, &mut ui).await
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
