#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod game;
pub mod net;
pub mod protocol;
pub mod session;

pub use config::{load_from_path, Config, DiscoveryConfig, TimeoutConfig};
pub use error::{GameError, Result};
pub use game::board::{Board, Cell, Color};
pub use net::discovery::{discover_and_connect, Discovered, MatchKey, Role};
pub use net::line::LineTransport;
pub use protocol::{Message, OutcomeToken};
pub use session::{run_session, Ui, UiEvent};
