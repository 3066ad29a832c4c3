//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del binario con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_engine --port 8080 --port 8081 \
//!   --host any \
//!   --root ./public \
//!   --log-format json
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORTS=8080,8081 HTTP_HOST=local ./http_engine
//! ```

use crate::http::parser::{ReaderLimits, CHUNK_SIZE};
use crate::logging::LogFormat;
use crate::server::Host;
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "http_engine")]
#[command(about = "Servidor HTTP/1.1 síncrono: una conexión, un request, una respuesta")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puertos de escucha; se levanta una instancia por puerto
    #[arg(
        short,
        long = "port",
        default_value = "8080",
        env = "HTTP_PORTS",
        value_delimiter = ','
    )]
    pub ports: Vec<u16>,

    /// Interfaz de escucha: any (0.0.0.0) o local (127.0.0.1)
    #[arg(long, value_enum, default_value = "local", env = "HTTP_HOST")]
    pub host: Host,

    /// Directorio de archivos estáticos
    #[arg(long, default_value = "./public", env = "HTTP_ROOT")]
    pub root: PathBuf,

    // === Logging ===

    /// Nivel de log: trace, debug, info, warn o error
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Formato de log
    #[arg(long = "log-format", value_enum, default_value = "pretty", env = "LOG_FORMAT")]
    pub log_format: LogFormat,

    // === Límites ===

    /// Máximo de bytes de la sección de headers
    #[arg(long = "max-header-bytes", default_value = "16384", env = "MAX_HEADER_BYTES")]
    pub max_header_bytes: usize,

    /// Máximo de bytes de un payload de formulario
    #[arg(long = "max-payload-bytes", default_value = "1048576", env = "MAX_PAYLOAD_BYTES")]
    pub max_payload_bytes: usize,

    /// Cada cuánto se consulta el socket de escucha, en milisegundos
    #[arg(long = "poll-interval-ms", default_value = "50", env = "POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección de una instancia (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use http_engine::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(8080), "127.0.0.1:8080");
    /// ```
    pub fn address(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.ports.is_empty() {
            return Err("At least one port is required".to_string());
        }

        let mut seen = HashSet::new();
        for port in &self.ports {
            if *port != 0 && !seen.insert(*port) {
                return Err(format!("Port {} is listed more than once", port));
            }
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Log level must be one of {}",
                LOG_LEVELS.join(", ")
            ));
        }

        if self.max_header_bytes < CHUNK_SIZE {
            return Err(format!("Max header bytes must be >= {}", CHUNK_SIZE));
        }

        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be > 0".to_string());
        }

        Ok(())
    }

    /// Límites de lectura para cada instancia
    pub fn server_limits(&self) -> ReaderLimits {
        ReaderLimits {
            max_header_bytes: self.max_header_bytes,
            max_payload_bytes: self.max_payload_bytes,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        let addresses: Vec<String> = self.ports.iter().map(|port| self.address(*port)).collect();

        info!(
            addresses = %addresses.join(", "),
            root = %self.root.display(),
            max_header_bytes = self.max_header_bytes,
            max_payload_bytes = self.max_payload_bytes,
            poll_interval_ms = self.poll_interval_ms,
            "configuration loaded"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        let limits = ReaderLimits::default();
        Self {
            ports: vec![8080],
            host: Host::Local,
            root: PathBuf::from("./public"),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            max_header_bytes: limits.max_header_bytes,
            max_payload_bytes: limits.max_payload_bytes,
            poll_interval_ms: 50,
        }
    }
}
