/// TOML configuration (`prism.toml`) and its manager.
pub mod toml_config;
