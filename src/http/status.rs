//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Tabla cerrada de códigos de estado que el servidor sabe serializar.
//! Además de los códigos del RFC 9110 incluye los no oficiales más comunes
//! (IIS, nginx, Cloudflare, AWS ELB), ya que el servidor suele correr detrás
//! de un proxy que los usa.
//!
//! - **1xx**: Informacional
//! - **2xx**: Éxito
//! - **3xx**: Redirección
//! - **4xx**: Error del cliente
//! - **5xx**: Error del servidor
//!
//! Un código fuera de la tabla no es un error del cliente sino un defecto del
//! handler: [`StatusCode::from_u16`] retorna `None` y la serialización falla.

/// Define el enum y sus dos tablas (código → variante, variante → frase)
/// a partir de una sola lista.
macro_rules! status_codes {
    ($( $(#[$doc:meta])* $variant:ident = $code:literal, $phrase:literal; )+) => {
        /// Códigos de estado HTTP soportados
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusCode {
            $( $(#[$doc])* $variant = $code, )+
        }

        impl StatusCode {
            /// Todos los códigos de la tabla, en orden ascendente
            pub const ALL: &'static [StatusCode] = &[ $( StatusCode::$variant, )+ ];

            /// Busca un código numérico en la tabla
            ///
            /// # Ejemplo
            /// ```
            /// use http_engine::http::StatusCode;
            /// assert_eq!(StatusCode::from_u16(404), Some(StatusCode::NotFound));
            /// assert_eq!(StatusCode::from_u16(299), Some(StatusCode::MiscellaneousPersistentWarning));
            /// assert_eq!(StatusCode::from_u16(600), None);
            /// ```
            pub fn from_u16(code: u16) -> Option<Self> {
                match code {
                    $( $code => Some(StatusCode::$variant), )+
                    _ => None,
                }
            }

            /// Retorna el texto de razón (reason phrase) asociado al código
            ///
            /// # Ejemplo
            /// ```
            /// use http_engine::http::StatusCode;
            /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
            /// assert_eq!(StatusCode::ImATeapot.reason_phrase(), "I'm a teapot");
            /// ```
            pub fn reason_phrase(&self) -> &'static str {
                match self {
                    $( StatusCode::$variant => $phrase, )+
                }
            }
        }
    };
}

status_codes! {
    Continue = 100, "Continue";
    SwitchingProtocols = 101, "Switching Protocols";
    Processing = 102, "Processing";
    EarlyHints = 103, "Early Hints";
    ResponseIsStale = 110, "Response is Stale";
    RevalidationFailed = 111, "Revalidation Failed";
    DisconnectedOperation = 112, "Disconnected Operation";
    HeuristicExpiration = 113, "Heuristic Expiration";
    MiscellaneousWarning = 199, "Miscellaneous Warning";

    /// 200 OK - La petición fue exitosa
    Ok = 200, "OK";
    Created = 201, "Created";
    Accepted = 202, "Accepted";
    NonAuthoritativeInformation = 203, "Non-Authoritative Information";
    /// 204 No Content - Petición exitosa sin contenido en el body
    NoContent = 204, "No Content";
    ResetContent = 205, "Reset Content";
    PartialContent = 206, "Partial Content";
    MultiStatus = 207, "Multi-Status";
    AlreadyReported = 208, "Already Reported";
    TransformationApplied = 214, "Transformation Applied";
    ImUsed = 226, "IM Used";
    MiscellaneousPersistentWarning = 299, "Miscellaneous Persistent Warning";

    MultipleChoices = 300, "Multiple Choices";
    MovedPermanently = 301, "Moved Permanently";
    Found = 302, "Found";
    SeeOther = 303, "See Other";
    NotModified = 304, "Not Modified";
    UseProxy = 305, "Use Proxy";
    SwitchProxy = 306, "Switch Proxy";
    TemporaryRedirect = 307, "Temporary Redirect";
    PermanentRedirect = 308, "Permanent Redirect";

    /// 400 Bad Request - Request o payload malformado
    BadRequest = 400, "Bad Request";
    Unauthorized = 401, "Unauthorized";
    PaymentRequired = 402, "Payment Required";
    Forbidden = 403, "Forbidden";
    /// 404 Not Found - Ruta o recurso no encontrado
    NotFound = 404, "Not Found";
    MethodNotAllowed = 405, "Method Not Allowed";
    NotAcceptable = 406, "Not Acceptable";
    ProxyAuthenticationRequired = 407, "Proxy Authentication Required";
    RequestTimeout = 408, "Request Timeout";
    Conflict = 409, "Conflict";
    Gone = 410, "Gone";
    LengthRequired = 411, "Length Required";
    PreconditionFailed = 412, "Precondition Failed";
    /// 413 Payload Too Large - Payload más grande que el límite configurado
    PayloadTooLarge = 413, "Payload Too Large";
    UriTooLong = 414, "URI Too Long";
    UnsupportedMediaType = 415, "Unsupported Media Type";
    RangeNotSatisfiable = 416, "Range Not Satisfiable";
    ExpectationFailed = 417, "Expectation Failed";
    ImATeapot = 418, "I'm a teapot";
    PageExpired = 419, "Page Expired";
    MethodFailure = 420, "Method Failure";
    MisdirectedRequest = 421, "Misdirected Request";
    UnprocessableEntity = 422, "Unprocessable Entity";
    Locked = 423, "Locked";
    FailedDependency = 424, "Failed Dependency";
    TooEarly = 425, "Too Early";
    UpgradeRequired = 426, "Upgrade Required";
    PreconditionRequired = 428, "Precondition Required";
    TooManyRequests = 429, "Too Many Requests";
    /// 430 (Shopify) - misma frase que 431
    ShopifyRequestHeaderFieldsTooLarge = 430, "Request Header Fields Too Large";
    RequestHeaderFieldsTooLarge = 431, "Request Header Fields Too Large";
    LoginTimeout = 440, "Login Time-out";
    NoResponse = 444, "No Response";
    RetryWith = 449, "Retry With";
    BlockedByWindowsParentalControls = 450, "Blocked by Windows Parental Controls";
    UnavailableForLegalReasons = 451, "Unavailable For Legal Reasons";
    RequestHeaderTooLarge = 494, "Request header too large";
    SslCertificateError = 495, "SSL Certificate Error";
    SslCertificateRequired = 496, "SSL Certificate Required";
    HttpRequestSentToHttpsPort = 497, "HTTP Request Sent to HTTPS Port";
    InvalidToken = 498, "Invalid Token";
    TokenRequired = 499, "Token Required";

    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError = 500, "Internal Server Error";
    /// 501 Not Implemented - Método o tipo de payload no soportado
    NotImplemented = 501, "Not Implemented";
    BadGateway = 502, "Bad Gateway";
    ServiceUnavailable = 503, "Service Unavailable";
    GatewayTimeout = 504, "Gateway Timeout";
    HttpVersionNotSupported = 505, "HTTP Version Not Supported";
    VariantAlsoNegotiates = 506, "Variant Also Negotiates";
    InsufficientStorage = 507, "Insufficient Storage";
    LoopDetected = 508, "Loop Detected";
    BandwidthLimitExceeded = 509, "Bandwidth Limit Exceeded";
    NotExtended = 510, "Not Extended";
    NetworkAuthenticationRequired = 511, "Network Authentication Required";
    WebServerReturnedUnknownError = 520, "Web Server Returned an Unknown Error";
    WebServerIsDown = 521, "Web Server Is Down";
    ConnectionTimedOut = 522, "Connection Timed Out";
    OriginIsUnreachable = 523, "Origin Is Unreachable";
    ATimeoutOccurred = 524, "A Timeout Occurred";
    SslHandshakeFailed = 525, "SSL Handshake Failed";
    InvalidSslCertificate = 526, "Invalid SSL Certificate";
    RailgunError = 527, "Railgun Error";
    SiteIsOverloaded = 529, "Site is overloaded";
    SiteIsFrozen = 530, "Site is frozen";
    /// 561 (AWS ELB)
    ElbUnauthorized = 561, "Unauthorized";
    NetworkConnectTimeoutError = 599, "Network Connect Timeout Error";
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato de la status line: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::BadRequest.as_u16(), 400);
        assert_eq!(StatusCode::NotFound.as_u16(), 404);
        assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    }

    #[test]
    fn test_reason_phrases() {
        assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
        assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
        assert_eq!(StatusCode::NotImplemented.reason_phrase(), "Not Implemented");
        assert_eq!(StatusCode::LoginTimeout.reason_phrase(), "Login Time-out");
    }

    #[test]
    fn test_from_u16_covers_whole_table() {
        for status in StatusCode::ALL {
            assert_eq!(StatusCode::from_u16(status.as_u16()), Some(*status));
        }
        assert!(StatusCode::ALL.len() > 90);
    }

    #[test]
    fn test_from_u16_rejects_unknown() {
        assert_eq!(StatusCode::from_u16(0), None);
        assert_eq!(StatusCode::from_u16(209), None);
        assert_eq!(StatusCode::from_u16(427), None);
        assert_eq!(StatusCode::from_u16(600), None);
    }

    #[test]
    fn test_table_is_sorted_and_in_range() {
        let codes: Vec<u16> = StatusCode::ALL.iter().map(|s| s.as_u16()).collect();
        assert!(codes.windows(2).all(|w| w[0] < w[1]));
        assert!(codes.iter().all(|c| (100..600).contains(c)));
    }

    #[test]
    fn test_categories() {
        assert!(!StatusCode::Ok.is_server_error());
        assert!(!StatusCode::NotFound.is_server_error());
        assert!(StatusCode::NotImplemented.is_server_error());
        assert!(StatusCode::NetworkConnectTimeoutError.is_server_error());
        assert!(!StatusCode::BadRequest.is_server_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
        assert_eq!(StatusCode::InternalServerError.to_string(), "500 Internal Server Error");
    }
}
