//! Line-oriented channels for talking to the bot.

pub mod cli;

pub use cli::CliChannel;
