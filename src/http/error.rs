//! # Errores del motor HTTP
//! src/http/error.rs
//!
//! Todos los errores por request se representan con un único tipo,
//! [`HttpError`], que lleva la categoría ([`ErrorKind`]), el código HTTP
//! que le corresponde y un mensaje legible.
//!
//! | Categoría     | Origen                                         | Código típico |
//! |---------------|------------------------------------------------|---------------|
//! | `Transport`   | accept / recv / write / close                  | -             |
//! | `Parse`       | método desconocido, payload inválido           | 400, 413, 501 |
//! | `Application` | el handler retornó `false` o un error propio   | cualquiera    |
//! | `Resource`    | archivo inexistente o ilegible en `send_file`  | 404, 500      |
//! | `Internal`    | status o content-type fuera de las tablas      | 500           |

use std::fmt;
use std::io;

/// Categoría cerrada de errores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Falla de I/O sobre el socket; la conexión se abandona
    Transport,

    /// Request recibido pero no procesable (se enruta al error handler)
    Parse,

    /// Error reportado por el handler de la aplicación
    Application,

    /// Error al servir un archivo
    Resource,

    /// Defecto de programación (ej: status code inexistente)
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Parse => "parse",
            ErrorKind::Application => "application",
            ErrorKind::Resource => "resource",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Error con código HTTP y mensaje
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    kind: ErrorKind,
    code: u16,
    message: String,
}

impl HttpError {
    /// Crea un error arbitrario
    pub fn new(kind: ErrorKind, code: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }

    /// Error de transporte. El código es 0 porque nunca llega al cliente.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, 0, message)
    }

    /// Error de transporte a partir de un `io::Error`, con contexto
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::{ErrorKind, HttpError};
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
    /// let err = HttpError::from_io("Failed to receive message from socket", &io);
    /// assert_eq!(err.kind(), ErrorKind::Transport);
    /// assert_eq!(err.message(), "Failed to receive message from socket: reset");
    /// ```
    pub fn from_io(context: &str, err: &io::Error) -> Self {
        Self::transport(format!("{}: {}", context, err))
    }

    pub fn parse(code: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, code, message)
    }

    /// Error de aplicación que el handler puede retornar con `?`
    pub fn application(code: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Application, code, message)
    }

    pub fn not_found(display_name: &str) -> Self {
        Self::new(
            ErrorKind::Resource,
            404,
            format!("Resource {} not found", display_name),
        )
    }

    pub fn unreadable() -> Self {
        Self::new(ErrorKind::Resource, 500, "Internal server error")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, 500, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Código HTTP asociado
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Transport => write!(f, "{}", self.message),
            _ => write!(f, "{} ({} error {})", self.message, self.kind.as_str(), self.code),
        }
    }
}

impl std::error::Error for HttpError {}
