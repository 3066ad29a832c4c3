//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Todo lo que rodea al protocolo:
//!
//! - `tcp`: el loop de aceptación y el ciclo de cada conexión
//! - `host`: las dos direcciones de escucha soportadas
//! - `shutdown`: registro de instancias y apagado por señales
//! - `access_log`: una línea de log por request

pub mod access_log;
pub mod host;
pub mod shutdown;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use host::Host;
pub use shutdown::{ServerHandle, ShutdownCoordinator, ShutdownReport};
pub use tcp::Server;

#[cfg(unix)]
pub use shutdown::listen_for_signals;
