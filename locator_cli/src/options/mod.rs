mod args;
mod sub_command;

pub use args::Cli;
pub use sub_command::{CacheCommand, Commands};
