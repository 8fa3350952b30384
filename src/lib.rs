pub mod app;
pub mod carousel;
pub mod cli;
pub mod config;
pub mod content;
pub mod filter;
pub mod gate;
pub mod highlight;
pub mod ui;
pub mod viewer;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use content::{Letter, LetterLoader};
