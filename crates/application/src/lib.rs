//! Coordination layer for the performance overlay.
//!
//! [`PerformanceMonitor`] wires the permission gateway, overlay service,
//! metrics sampler, settings store and game-mode controller together and
//! mirrors every state change onto an [`EventBus`](perfmon_events::EventBus).

mod config;
mod constants;
mod error;
mod game_mode;
mod monitor;

pub use config::{default_config_path, MonitorConfig};
pub use constants::*;
pub use error::{ConfigError, MonitorError};
pub use game_mode::{GameModeController, GameModeState};
pub use monitor::{Collaborators, MonitorBuilder, PerformanceMonitor};
