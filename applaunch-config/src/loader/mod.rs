pub mod layers;

mod builder;
mod config;
mod manager;
mod merge;

#[cfg(test)]
mod tests;

pub use builder::{ConfigBuilder, parse_override};
pub use config::ApplaunchConfig;
pub use manager::{CONFIG_PATH_ENV, ConfigManager, ConfigPaths};
pub use merge::merge_toml_values;
