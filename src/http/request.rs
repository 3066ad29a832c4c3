//! # Requests HTTP
//! src/http/request.rs
//!
//! Dos representaciones del mismo request:
//!
//! 1. [`ParsedRequest`]: lo que salió del cable, tal cual (método, target,
//!    versión, headers y payload de formulario). Inmutable.
//! 2. [`Request`]: la vista que recibe el handler. Tiene la [`Url`] ya
//!    descompuesta y es dueña exclusiva de la [`Response`] que se está armando.

use super::{Response, Url};
use std::collections::HashMap;

/// Métodos HTTP reconocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,

    /// Cualquier otro token; el servidor lo rechaza con 501
    UNKNOWN,
}

impl Method {
    /// Resuelve el token de la request line contra la tabla de métodos
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::Method;
    /// assert_eq!(Method::from_token("PATCH"), Method::PATCH);
    /// assert_eq!(Method::from_token("get"), Method::UNKNOWN);
    /// assert_eq!(Method::from_token("FROB"), Method::UNKNOWN);
    /// ```
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "CONNECT" => Method::CONNECT,
            "OPTIONS" => Method::OPTIONS,
            "TRACE" => Method::TRACE,
            "PATCH" => Method::PATCH,
            _ => Method::UNKNOWN,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request tal como se leyó del socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// Método resuelto (`UNKNOWN` si no está en la tabla)
    method: Method,

    /// Token original del método, para mensajes de error y logs
    method_token: String,

    /// Request-target (ej: "/a/b?x=1")
    target: String,

    /// Versión del protocolo (ej: "HTTP/1.1")
    version: String,

    /// Headers; ante nombres repetidos gana el último
    headers: HashMap<String, String>,

    /// Payload de formulario decodificado (solo POST)
    payload: Option<HashMap<String, String>>,
}

impl ParsedRequest {
    pub fn new(
        method_token: &str,
        target: &str,
        version: &str,
        headers: HashMap<String, String>,
        payload: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            method: Method::from_token(method_token),
            method_token: method_token.to_string(),
            target: target.to_string(),
            version: version.to_string(),
            headers,
            payload,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn method_token(&self) -> &str {
        &self.method_token
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico
    ///
    /// Busca primero el nombre exacto y después sin distinguir mayúsculas.
    pub fn header(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.headers.get(name) {
            return Some(value.as_str());
        }
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn payload(&self) -> Option<&HashMap<String, String>> {
        self.payload.as_ref()
    }

    /// Construye la [`Url`] a partir del target y los headers reenviados
    pub fn url(&self) -> Url {
        Url::new(
            self.header("X-Forwarded-Proto").unwrap_or(""),
            self.header("Host").unwrap_or(""),
            &self.target,
        )
    }
}

/// Request entregado al handler
pub struct Request {
    parsed: ParsedRequest,
    url: Url,
    response: Response,
}

impl Request {
    pub fn new(parsed: ParsedRequest, response: Response) -> Self {
        let url = parsed.url();
        Self {
            parsed,
            url,
            response,
        }
    }

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.parsed.method()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn version(&self) -> &str {
        self.parsed.version()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.parsed.header(name)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        self.parsed.headers()
    }

    /// Campos del formulario enviado por POST, si los hay
    pub fn payload(&self) -> Option<&HashMap<String, String>> {
        self.parsed.payload()
    }

    /// Un campo específico del formulario
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.parsed
            .payload()
            .and_then(|payload| payload.get(name))
            .map(|s| s.as_str())
    }

    pub fn parsed(&self) -> &ParsedRequest {
        &self.parsed
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Acceso mutable a la respuesta que se va a enviar
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parsed.method())
            .field("target", &self.parsed.target())
            .field("status", &self.response.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_method_table() {
        for token in ["GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH"] {
            let method = Method::from_token(token);
            assert_ne!(method, Method::UNKNOWN);
            assert_eq!(method.as_str(), token);
        }
        assert_eq!(Method::from_token(""), Method::UNKNOWN);
    }

    #[test]
    fn test_parsed_request_keeps_unknown_token() {
        let parsed = ParsedRequest::new("FROB", "/", "HTTP/1.1", HashMap::new(), None);
        assert_eq!(parsed.method(), Method::UNKNOWN);
        assert_eq!(parsed.method_token(), "FROB");
    }

    #[test]
    fn test_header_lookup_case_insensitive_fallback() {
        let parsed = ParsedRequest::new(
            "GET",
            "/",
            "HTTP/1.1",
            headers(&[("host", "example.com")]),
            None,
        );
        assert_eq!(parsed.header("host"), Some("example.com"));
        assert_eq!(parsed.header("Host"), Some("example.com"));
        assert_eq!(parsed.header("X-Missing"), None);
    }

    #[test]
    fn test_url_from_forwarded_headers() {
        let parsed = ParsedRequest::new(
            "GET",
            "/docs/index.html?v=2",
            "HTTP/1.1",
            headers(&[("Host", "example.com"), ("X-Forwarded-Proto", "https")]),
            None,
        );
        let url = parsed.url();
        assert_eq!(url.href(), "https://example.com/docs/index.html?v=2");
        assert_eq!(url.path(), &["docs", "index.html"].map(String::from));
    }

    #[test]
    fn test_request_exposes_payload() {
        let mut form = HashMap::new();
        form.insert("name".to_string(), "ada".to_string());
        let parsed = ParsedRequest::new("POST", "/submit", "HTTP/1.1", HashMap::new(), Some(form));
        let request = Request::new(parsed, Response::new(Box::new(std::io::sink())));

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.form_value("name"), Some("ada"));
        assert_eq!(request.form_value("other"), None);
        assert_eq!(request.response().status(), 200);
    }
}
