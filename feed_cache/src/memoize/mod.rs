mod config;
mod memoizer;
mod single_flight;

pub use config::MemoizerConfig;
pub use memoizer::Memoizer;
