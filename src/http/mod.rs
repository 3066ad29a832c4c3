//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.1 desde cero, sin usar librerías de
//! alto nivel. Incluye:
//!
//! - Lectura y parsing de requests desde el socket
//! - Descomposición de URLs
//! - Construcción y envío de responses
//! - Tablas de status codes y content-types
//!
//! Fuera de alcance: conexiones persistentes, chunked transfer encoding,
//! HTTP/2 y TLS. Cada conexión lleva exactamente un request y una response.
//!
//! ### Formato de Request
//!
//! ```text
//! POST /path?query=value HTTP/1.1\r\n
//! Host: example.com\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 7\r\n
//! \r\n
//! a=1&b=2
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 13\r\n
//! \r\n
//! Hello, World!
//! ```

pub mod content_type; // Tabla de tipos MIME
pub mod error;        // Taxonomía de errores
pub mod parser;       // Lectura del socket y parsing
pub mod request;      // Request parseado y request del handler
pub mod response;     // Construcción y envío de responses
pub mod status;       // Códigos de estado HTTP
pub mod url;          // Descomposición de URLs

// Re-exportamos los tipos principales para facilitar su uso
pub use content_type::ContentType;
pub use error::{ErrorKind, HttpError};
pub use request::{Method, ParsedRequest, Request};
pub use response::Response;
pub use status::StatusCode;
pub use url::Url;
