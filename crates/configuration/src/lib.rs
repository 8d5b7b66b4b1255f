use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, KpiAssumptions, ServerSettings};

/// Loads the application configuration from the `config.toml` file.
///
/// The file is optional: every setting is a business-assumption knob with a
/// well-known default (1% commission, 70% renewal ratio, and so on), so a
/// missing file yields the default configuration rather than an error.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml").required(false))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;

    Ok(config)
}
