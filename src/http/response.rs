//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! El handler arma la respuesta con setters y la envía con [`Response::send`].
//!
//! ## Formato en el cable
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! X-Custom: value\r\n          (headers del handler, en orden de inserción)
//! Content-Type: text/plain\r\n
//! Content-Length: 13\r\n
//! \r\n
//! Hello, World!
//! ```
//!
//! `Content-Length` siempre se calcula del body al momento de enviar. Los
//! headers `Content-Type` y `Content-Length` que el handler ponga a mano con
//! [`Response::set_header`] no se emiten; se usan los campos dedicados.
//!
//! ## Envío único
//!
//! Solo el primer `send()` escribe en el socket; los siguientes retornan el
//! mismo resultado sin tocar la conexión. El servidor llama a
//! [`Response::finish`] al terminar cada request, de modo que toda conexión
//! recibe exactamente una respuesta aunque el handler no haya enviado nada.

use super::{ContentType, HttpError, StatusCode};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Respuesta HTTP en construcción, ligada a una conexión
pub struct Response {
    /// Destino de los bytes (el socket del cliente)
    sink: Box<dyn Write + Send>,

    /// Código de estado; cualquier valor se acepta hasta serializar
    status: u16,

    /// Headers en orden de inserción
    headers: Vec<(String, String)>,

    content_type: ContentType,

    body: Vec<u8>,

    /// Resultado del primer envío (`None` = todavía no se envió)
    outcome: Option<bool>,

    /// Status y tamaño de body que salieron por el cable
    written: Option<(u16, usize)>,
}

impl Response {
    /// Crea una respuesta 200 `text/plain` vacía que escribirá en `sink`
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink,
            status: 200,
            headers: Vec::new(),
            content_type: ContentType::default(),
            body: Vec::new(),
            outcome: None,
            written: None,
        }
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Agrega un header o reemplaza su valor conservando la posición original
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.headers.iter_mut().find(|(key, _)| key == name) {
            entry.1 = value.to_string();
        } else {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
    }

    /// Establece el cuerpo de la respuesta desde un string
    pub fn set_content_string(&mut self, content: &str) {
        self.body = content.as_bytes().to_vec();
    }

    /// Establece el cuerpo de la respuesta desde bytes (archivos binarios)
    pub fn set_content_bytes(&mut self, content: Vec<u8>) {
        self.body = content;
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Tamaño del body en bytes
    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn is_sent(&self) -> bool {
        self.outcome.is_some()
    }

    /// Status y tamaño de body del envío exitoso, si lo hubo
    ///
    /// No cambia aunque después se modifique la respuesta.
    pub fn written(&self) -> Option<(u16, usize)> {
        self.written
    }

    /// Serializa la respuesta al formato del cable
    ///
    /// Falla con un error `Internal` si el status no está en la tabla; en
    /// ese caso no se produce ningún byte.
    pub fn to_bytes(&self) -> Result<Vec<u8>, HttpError> {
        let status = StatusCode::from_u16(self.status).ok_or_else(|| {
            HttpError::internal(format!("Unknown HTTP status code {}", self.status))
        })?;

        let mut result = Vec::with_capacity(128 + self.body.len());

        // 1. Status line
        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", status).as_bytes());

        // 2. Headers del handler
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("Content-Type") || name.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        // 3. Headers calculados
        result.extend_from_slice(format!("Content-Type: {}\r\n", self.content_type).as_bytes());
        result.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());

        // 4. Línea vacía + body
        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        Ok(result)
    }

    /// Serializa y escribe la respuesta en la conexión
    ///
    /// * `Ok(true)` - se escribió completa
    /// * `Ok(false)` - la escritura falló (error de transporte, ya logueado)
    /// * `Err(_)` - la respuesta no es serializable; no se escribió nada
    ///
    /// Solo la primera llamada escribe.
    pub fn send(&mut self) -> Result<bool, HttpError> {
        if let Some(outcome) = self.outcome {
            debug!(status = self.status, "response already sent, skipping");
            return Ok(outcome);
        }

        let bytes = self.to_bytes()?;

        let written = self
            .sink
            .write_all(&bytes)
            .and_then(|_| self.sink.flush());

        let outcome = match written {
            Ok(()) => {
                self.written = Some((self.status, self.body.len()));
                true
            }
            Err(e) => {
                warn!(error = %HttpError::from_io("Failed to write response to socket", &e), "transport error");
                false
            }
        };

        self.outcome = Some(outcome);
        Ok(outcome)
    }

    /// Envía la respuesta si el handler no lo hizo
    ///
    /// Es el cierre que el servidor ejecuta en todos los caminos.
    pub fn finish(&mut self) -> Result<bool, HttpError> {
        match self.outcome {
            Some(outcome) => Ok(outcome),
            None => self.send(),
        }
    }

    /// Sirve un archivo del disco, detectando su content-type
    ///
    /// Ver [`Response::send_file_as`].
    pub fn send_file(&mut self, path: impl AsRef<Path>, display_name: &str) -> Result<bool, HttpError> {
        self.send_file_as(path, None, display_name)
    }

    /// Sirve un archivo del disco
    ///
    /// Un directorio se resuelve a su `index.html`. `display_name` es el
    /// nombre que aparece en el mensaje de error (normalmente el path de la
    /// URL, no el del disco).
    ///
    /// # Errores
    ///
    /// * 404 si el archivo (o el `index.html` del directorio) no existe
    /// * 500 si existe pero no se puede leer
    pub fn send_file_as(
        &mut self,
        path: impl AsRef<Path>,
        content_type: Option<ContentType>,
        display_name: &str,
    ) -> Result<bool, HttpError> {
        let mut path = path.as_ref().to_path_buf();

        if path.is_dir() {
            path.push("index.html");
        }

        if !path.exists() {
            return Err(HttpError::not_found(display_name));
        }

        let contents = fs::read(&path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to read file");
            HttpError::unreadable()
        })?;

        let content_type = content_type.unwrap_or_else(|| ContentType::detect(&path));

        self.set_status(200);
        self.set_content_type(content_type);
        self.set_content_bytes(contents);
        self.send()
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("content_type", &self.content_type)
            .field("size", &self.body.len())
            .field("sent", &self.outcome)
            .finish()
    }
}
