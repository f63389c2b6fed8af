pub mod cli_renderer;
pub mod config;
pub mod entity;
pub mod game;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod spawner;

pub use cli_renderer::{CliRenderer, Viewport};
pub use config::{Config, ConfigError};
pub use entity::{FallingItem, ItemKind, Paddle};
pub use game::{Game, GameState, SessionCounters};
pub use geometry::{overlaps, Rect};
pub use input::{Action, InputTracker, TickInput};
pub use renderer::{Input, Renderer};
