pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod inspect;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod warehouse;
