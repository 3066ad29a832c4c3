//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing-subscriber`. El nivel viene de la configuración,
//! pero `RUST_LOG` tiene prioridad si está definido. Las líneas del access
//! log usan el target `http_engine::access`, así que se pueden filtrar
//! aparte (ej: `RUST_LOG=info,http_engine::access=off`).

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Formato de salida de los logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Legible, para desarrollo
    #[default]
    Pretty,

    /// Una línea JSON por evento
    Json,
}

/// Traduce el nivel configurado; cualquier valor desconocido es `INFO`
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Instala el subscriber global
///
/// Falla si ya había uno instalado.
pub fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let level = parse_level(level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_names(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_log_format_values() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
        assert!(LogFormat::from_str("xml", true).is_err());
    }

    #[test]
    fn test_init_only_once() {
        // Único test del crate que instala el subscriber global
        assert!(init_logging("info", LogFormat::Json).is_ok());
        assert!(init_logging("info", LogFormat::Pretty).is_err());
    }
}
