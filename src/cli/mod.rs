pub mod commands;
pub mod handlers;

pub use commands::{BatchLine, Cli, Commands};
pub use handlers::{run, Session};
