pub use app::App;
pub use config::{AppConfig, Shape, DEFAULT_CONFIG_PATH};
pub use game::GameLoop;

mod app;
pub mod config;
mod game;
mod graphics;
