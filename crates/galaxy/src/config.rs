//! Server configuration.

use clap::Parser;
use galaxy_room::RoomConfig;

/// Port used when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 3000;

/// Interface the listener binds to unless `--bind` says otherwise.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Command-line settings for the `galaxy-party` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "galaxy-party")]
#[command(about = "Authoritative server for the galaxy-party dice duel")]
#[command(version)]
pub struct ServerArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Full listen address, e.g. 127.0.0.1:4000 (overrides --port)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServerArgs {
    pub fn bind_addr(&self) -> String {
        match &self.bind {
            Some(addr) => addr.clone(),
            None => format!("{DEFAULT_HOST}:{}", self.port),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    pub room: RoomConfig,
}

impl From<&ServerArgs> for ServerConfig {
    fn from(args: &ServerArgs) -> Self {
        Self {
            bind_addr: args.bind_addr(),
            room: RoomConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("{DEFAULT_HOST}:{DEFAULT_PORT}"),
            room: RoomConfig::default(),
        }
    }
}
