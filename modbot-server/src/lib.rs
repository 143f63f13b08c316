pub mod case;
pub mod closer;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod platform;
pub mod registry;
pub mod scoring;
pub mod state_machine;
pub mod webhook;

use tokio::sync::Mutex;

pub use engine::{Engine, EngineConfig};
pub use platform::{ChatPlatform, HttpPlatform};
pub use scoring::{HttpScorer, Scorer};

/// Shared server state.
///
/// The engine sits behind a mutex: webhook deliveries are processed one at a
/// time, so every case sees a consistent registry and queue.
pub struct AppState {
    pub engine: Mutex<Engine>,
    pub webhook_secret: String,
}
