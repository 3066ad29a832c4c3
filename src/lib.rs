//! # HTTP Engine
//! src/lib.rs
//!
//! Motor HTTP/1.1 síncrono implementado sobre `std::net`. Cada conexión
//! lleva exactamente un request y una respuesta; la aplicación solo aporta
//! dos callbacks.
//!
//! ## Arquitectura
//!
//! El motor está dividido en módulos especializados:
//! - `http`: parsing del request, URLs, respuestas y tablas del protocolo
//! - `server`: loop de aceptación, access log y apagado coordinado
//! - `config`: argumentos CLI y variables de entorno
//! - `logging`: inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http_engine::http::Request;
//! use http_engine::server::{Host, Server};
//!
//! let server = Server::new(
//!     |request: &mut Request| {
//!         request.response_mut().set_content_string("Hello, World!");
//!         Ok(true)
//!     },
//!     |request: &mut Request, code: u16, message: &str| {
//!         request.response_mut().set_status(code);
//!         request.response_mut().set_content_string(message);
//!         true
//!     },
//! );
//!
//! server.listen(
//!     Host::Local,
//!     8080,
//!     |addr| println!("Escuchando en {}", addr),
//!     |error| eprintln!("No se pudo escuchar: {}", error),
//! );
//! ```

pub mod config;
pub mod http;
pub mod logging;
pub mod server;
