use crate::domain::settings::PayrollSettings;
use crate::error::Result;
use std::io::IsTerminal;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loads payroll settings from a JSON file, or the defaults when no file is
/// given. Fields missing from the file keep their default value.
pub fn load_settings(path: Option<&Path>) -> Result<PayrollSettings> {
    let settings = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let settings: PayrollSettings = serde_json::from_str(&raw)?;
            info!("Loaded payroll settings from {}", path.display());
            settings
        }
        None => PayrollSettings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

/// Logs go to stderr so stdout only carries CSV output. `RUST_LOG` overrides
/// the default `info` level.
pub fn init_tracing() {
    let stderr = std::io::stderr();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(stderr.is_terminal())
                .with_writer(std::io::stderr),
        )
        .init();
}
