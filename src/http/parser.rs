//! # Lectura y Parsing de Requests
//! src/http/parser.rs
//!
//! Lee un request HTTP/1.1 directamente del socket.
//!
//! ## Fases
//!
//! 1. **Headers**: se lee en bloques de [`CHUNK_SIZE`] bytes hasta encontrar
//!    `\r\n\r\n`. Un `read` que retorna 0 o falla aborta la conexión.
//! 2. **Request line**: `METHOD target HTTP/version` separado por espacios;
//!    tokens extra se ignoran y los faltantes quedan vacíos.
//! 3. **Headers**: `Name: value`, separados en el primer `:`. Un nombre
//!    repetido sobrescribe al anterior.
//! 4. **Payload** (solo POST): exactamente `Content-Length` bytes de un
//!    formulario `application/x-www-form-urlencoded`.
//!
//! Los errores de transporte se retornan como `Err`. Los problemas del
//! request en sí (método desconocido, payload inválido) no cortan el
//! parsing: viajan como `rejection` junto al request para que el servidor
//! se los pase al error handler.

use super::url::parse_form;
use super::{HttpError, Method, ParsedRequest};
use std::collections::HashMap;
use std::io::{self, Read};
use tracing::{debug, trace};

/// Tamaño de cada lectura del socket mientras se buscan los headers
pub const CHUNK_SIZE: usize = 256;

/// Separador entre headers y body
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Límites de lectura por request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderLimits {
    /// Máximo de bytes de la sección de headers (request line incluida)
    pub max_header_bytes: usize,

    /// Máximo `Content-Length` aceptado para formularios
    pub max_payload_bytes: usize,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            max_header_bytes: 16 * 1024,
            max_payload_bytes: 1024 * 1024,
        }
    }
}

/// Resultado de leer un request del socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    /// Todo lo que se pudo parsear
    pub parsed: ParsedRequest,

    /// Motivo por el que el request no debe llegar al handler normal
    pub rejection: Option<HttpError>,
}

/// Lee y parsea un request completo
///
/// # Ejemplo
///
/// ```
/// use http_engine::http::parser::{read_request, ReaderLimits};
/// use http_engine::http::Method;
///
/// let mut wire: &[u8] = b"GET /hello?x=1 HTTP/1.1\r\nHost: h\r\n\r\n";
/// let incoming = read_request(&mut wire, &ReaderLimits::default()).unwrap();
///
/// assert_eq!(incoming.parsed.method(), Method::GET);
/// assert_eq!(incoming.parsed.target(), "/hello?x=1");
/// assert_eq!(incoming.parsed.header("Host"), Some("h"));
/// assert!(incoming.rejection.is_none());
/// ```
pub fn read_request<R: Read>(stream: &mut R, limits: &ReaderLimits) -> Result<Incoming, HttpError> {
    let (head, leftover) = read_head(stream, limits.max_header_bytes)?;
    let head = String::from_utf8_lossy(&head);

    let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    // 1. Request line
    let request_line = lines.next().unwrap_or("");
    let mut tokens = request_line.split_whitespace();
    let method_token = tokens.next().unwrap_or("");
    let target = tokens.next().unwrap_or("");
    let version = tokens.next().unwrap_or("");

    // 2. Headers
    let headers = parse_headers(lines);

    debug!(
        method = method_token,
        target = target,
        version = version,
        headers_count = headers.len(),
        "request head parsed"
    );

    // 3. Payload
    let mut rejection = None;
    let mut payload = None;

    if method_token == "POST" {
        match form_length(&headers, limits) {
            Ok(length) => {
                let body = read_body(stream, leftover, length)?;
                payload = Some(parse_form(&String::from_utf8_lossy(&body)));
            }
            Err(e) => rejection = Some(e),
        }
    }

    let parsed = ParsedRequest::new(method_token, target, version, headers, payload);

    if parsed.method() == Method::UNKNOWN {
        rejection = Some(HttpError::parse(
            501,
            format!(
                "The requested method '{}' is not implemented by this server",
                method_token
            ),
        ));
    }

    Ok(Incoming { parsed, rejection })
}

/// Lee hasta encontrar `\r\n\r\n`
///
/// Retorna la sección de headers (sin el terminador) y los bytes que ya se
/// leyeron del body.
fn read_head<R: Read>(stream: &mut R, max_header_bytes: usize) -> Result<(Vec<u8>, Vec<u8>), HttpError> {
    let mut buffer = Vec::with_capacity(CHUNK_SIZE);
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut searched = 0;

    loop {
        if let Some(pos) = find(&buffer[searched..], HEADER_TERMINATOR) {
            let end = searched + pos;
            if end > max_header_bytes {
                return Err(headers_too_large(max_header_bytes));
            }
            let leftover = buffer.split_off(end + HEADER_TERMINATOR.len());
            buffer.truncate(end);
            return Ok((buffer, leftover));
        }
        // El terminador puede quedar partido entre dos lecturas
        searched = buffer.len().saturating_sub(HEADER_TERMINATOR.len() - 1);

        if buffer.len() > max_header_bytes {
            return Err(headers_too_large(max_header_bytes));
        }

        let bytes_read = match stream.read(&mut chunk) {
            Ok(0) => {
                return Err(HttpError::transport(
                    "Failed to receive message from socket: connection closed",
                ))
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HttpError::from_io("Failed to receive message from socket", &e)),
        };

        trace!(bytes_read, "read chunk");
        buffer.extend_from_slice(&chunk[..bytes_read]);
    }
}

fn headers_too_large(max_header_bytes: usize) -> HttpError {
    HttpError::transport(format!("Request headers exceed {} bytes", max_header_bytes))
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (name, value) = match line.find(':') {
            Some(colon_pos) => (&line[..colon_pos], &line[colon_pos + 1..]),
            None => (line, ""),
        };

        headers.insert(name.to_string(), value.trim_start_matches(' ').to_string());
    }

    headers
}

fn header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Valida los headers de un POST y retorna cuántos bytes de payload leer
fn form_length(headers: &HashMap<String, String>, limits: &ReaderLimits) -> Result<usize, HttpError> {
    let bad_request = || HttpError::parse(400, "Bad request");

    let length: usize = header(headers, "Content-Length")
        .ok_or_else(bad_request)?
        .trim()
        .parse()
        .map_err(|_| bad_request())?;

    let content_type = header(headers, "Content-Type").ok_or_else(bad_request)?;
    let media_type = content_type.split(';').next().unwrap_or("").trim();

    if !media_type.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        return Err(HttpError::parse(
            501,
            format!(
                "Parsing '{}' payloads not implemented by this server",
                content_type
            ),
        ));
    }

    if length > limits.max_payload_bytes {
        return Err(HttpError::parse(413, "Payload Too Large"));
    }

    Ok(length)
}

/// Completa el body hasta `length` bytes usando primero lo que ya se leyó
fn read_body<R: Read>(stream: &mut R, mut leftover: Vec<u8>, length: usize) -> Result<Vec<u8>, HttpError> {
    if leftover.len() >= length {
        leftover.truncate(length);
        return Ok(leftover);
    }

    let already = leftover.len();
    leftover.resize(length, 0);
    stream
        .read_exact(&mut leftover[already..])
        .map_err(|e| HttpError::from_io("Failed to receive payload from socket", &e))?;

    Ok(leftover)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ErrorKind;

    /// Reader que entrega los datos en pedazos chicos, como un socket lento
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn parse(raw: &[u8]) -> Result<Incoming, HttpError> {
        let mut wire = raw;
        read_request(&mut wire, &ReaderLimits::default())
    }

    #[test]
    fn test_parse_simple_get() {
        let incoming = parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(incoming.parsed.method(), Method::GET);
        assert_eq!(incoming.parsed.target(), "/");
        assert_eq!(incoming.parsed.version(), "HTTP/1.1");
        assert!(incoming.parsed.headers().is_empty());
        assert!(incoming.parsed.payload().is_none());
        assert!(incoming.rejection.is_none());
    }

    #[test]
    fn test_parse_headers() {
        let incoming = parse(b"GET / HTTP/1.1\r\nHost: localhost:8080\r\nUser-Agent:   curl/8.0\r\nX-Empty:\r\n\r\n").unwrap();
        let parsed = incoming.parsed;

        assert_eq!(parsed.header("Host"), Some("localhost:8080"));
        assert_eq!(parsed.header("User-Agent"), Some("curl/8.0"));
        assert_eq!(parsed.header("X-Empty"), Some(""));
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let incoming = parse(b"GET / HTTP/1.1\r\nX-A: 1\r\nX-A: 2\r\n\r\n").unwrap();
        assert_eq!(incoming.parsed.header("X-A"), Some("2"));
    }

    #[test]
    fn test_header_value_keeps_later_colons() {
        let incoming = parse(b"GET / HTTP/1.1\r\nReferer: http://a:1/b\r\n\r\n").unwrap();
        assert_eq!(incoming.parsed.header("Referer"), Some("http://a:1/b"));
    }

    #[test]
    fn test_extra_request_line_tokens_ignored() {
        let incoming = parse(b"GET /a HTTP/1.1 trailing junk\r\n\r\n").unwrap();
        assert_eq!(incoming.parsed.target(), "/a");
        assert_eq!(incoming.parsed.version(), "HTTP/1.1");
    }

    #[test]
    fn test_missing_tokens_are_empty() {
        let incoming = parse(b"GET\r\n\r\n").unwrap();
        assert_eq!(incoming.parsed.method(), Method::GET);
        assert_eq!(incoming.parsed.target(), "");
        assert_eq!(incoming.parsed.version(), "");
    }

    #[test]
    fn test_unknown_method_is_501() {
        let incoming = parse(b"FROB / HTTP/1.1\r\n\r\n").unwrap();
        let rejection = incoming.rejection.unwrap();

        assert_eq!(incoming.parsed.method(), Method::UNKNOWN);
        assert_eq!(rejection.kind(), ErrorKind::Parse);
        assert_eq!(rejection.code(), 501);
        assert!(rejection.message().contains("'FROB'"));
    }

    #[test]
    fn test_headers_split_across_reads() {
        let raw = b"GET /slow HTTP/1.1\r\nHost: h\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n";
        for step in [1, 2, 3, 5, 7] {
            let mut trickle = Trickle { data: raw, step };
            let incoming = read_request(&mut trickle, &ReaderLimits::default()).unwrap();
            assert_eq!(incoming.parsed.target(), "/slow");
            assert_eq!(incoming.parsed.header("Host"), Some("h"));
        }
    }

    #[test]
    fn test_connection_closed_before_terminator() {
        let err = parse(b"GET / HTTP/1.1\r\nHost: h\r\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_empty_connection_is_transport_error() {
        let err = parse(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_header_limit() {
        let limits = ReaderLimits {
            max_header_bytes: 64,
            ..ReaderLimits::default()
        };
        let mut raw = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
        raw.extend(std::iter::repeat(b'a').take(1024));
        raw.extend_from_slice(b"\r\n\r\n");

        let mut wire = &raw[..];
        let err = read_request(&mut wire, &limits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.message().contains("64"));
    }

    #[test]
    fn test_header_limit_applies_within_last_read() {
        // 300 bytes de headers llegan en dos lecturas; la segunda trae el terminador
        let limits = ReaderLimits {
            max_header_bytes: 280,
            ..ReaderLimits::default()
        };
        let mut raw = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
        raw.resize(300, b'a');
        raw.extend_from_slice(b"\r\n\r\n");

        let mut wire = &raw[..];
        let err = read_request(&mut wire, &limits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.message().contains("280"));
    }

    #[test]
    fn test_header_section_exactly_at_limit() {
        let mut raw = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
        raw.resize(300, b'a');
        let limits = ReaderLimits {
            max_header_bytes: raw.len(),
            ..ReaderLimits::default()
        };
        raw.extend_from_slice(b"\r\n\r\n");

        let mut wire = &raw[..];
        let incoming = read_request(&mut wire, &limits).unwrap();
        assert_eq!(incoming.parsed.header("X-Big").map(str::len), Some(300 - 23));
    }

    #[test]
    fn test_post_form_payload() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 22\r\n\r\nname=Ada+L&lang=es&a=1";
        let incoming = parse(raw).unwrap();

        assert!(incoming.rejection.is_none());
        let payload = incoming.parsed.payload().unwrap();
        assert_eq!(payload["name"], "Ada L");
        assert_eq!(payload["lang"], "es");
        assert_eq!(payload["a"], "1");
    }

    #[test]
    fn test_post_payload_split_across_reads() {
        let raw = b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 7\r\n\r\na=1&a=2";
        let mut trickle = Trickle { data: raw, step: 3 };
        let incoming = read_request(&mut trickle, &ReaderLimits::default()).unwrap();

        let payload = incoming.parsed.payload().unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["a"], "2");
    }

    #[test]
    fn test_post_payload_ignores_bytes_past_length() {
        let raw = b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 3\r\n\r\na=1&b=2";
        let incoming = parse(raw).unwrap();
        let payload = incoming.parsed.payload().unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["a"], "1");
    }

    #[test]
    fn test_post_content_type_with_charset() {
        let raw = b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded; charset=UTF-8\r\nContent-Length: 3\r\n\r\nk=v";
        let incoming = parse(raw).unwrap();
        assert!(incoming.rejection.is_none());
        assert_eq!(incoming.parsed.payload().unwrap()["k"], "v");
    }

    #[test]
    fn test_post_short_body_is_transport_error() {
        let raw = b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 50\r\n\r\na=1";
        let err = parse(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_post_json_is_501() {
        let raw = b"POST / HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}";
        let incoming = parse(raw).unwrap();
        let rejection = incoming.rejection.unwrap();

        assert_eq!(rejection.code(), 501);
        assert!(rejection.message().contains("application/json"));
        assert!(incoming.parsed.payload().is_none());
    }

    #[test]
    fn test_post_non_numeric_length_is_400() {
        let raw = b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: ten\r\n\r\n";
        let rejection = parse(raw).unwrap().rejection.unwrap();
        assert_eq!(rejection.code(), 400);
        assert_eq!(rejection.message(), "Bad request");
    }

    #[test]
    fn test_post_missing_headers_is_400() {
        let rejection = parse(b"POST / HTTP/1.1\r\n\r\n").unwrap().rejection.unwrap();
        assert_eq!(rejection.code(), 400);

        let raw = b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\na=1";
        let rejection = parse(raw).unwrap().rejection.unwrap();
        assert_eq!(rejection.code(), 400);
    }

    #[test]
    fn test_post_payload_too_large_is_413() {
        let limits = ReaderLimits {
            max_payload_bytes: 8,
            ..ReaderLimits::default()
        };
        let raw = b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 9\r\n\r\n";
        let mut wire = &raw[..];
        let rejection = read_request(&mut wire, &limits).unwrap().rejection.unwrap();
        assert_eq!(rejection.code(), 413);
    }

    #[test]
    fn test_get_body_is_not_read() {
        let raw = b"GET / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 3\r\n\r\na=1";
        let incoming = parse(raw).unwrap();
        assert!(incoming.parsed.payload().is_none());
    }
}
