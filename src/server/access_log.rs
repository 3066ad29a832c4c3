//! # Access log
//! src/server/access_log.rs
//!
//! Una línea por request, emitida con target `http_engine::access`:
//!
//! ```text
//! 203.0.113.7/AR (Linux) GET example.com /hello?x=1 200 13B 2ms
//! ```
//!
//! Campos: IP reenviada / país reenviado, plataforma deducida del
//! User-Agent, método, host, target crudo, status + tamaño (o el error de
//! transporte) y tiempo transcurrido. Los datos faltantes se muestran `_`.

use crate::http::{ParsedRequest, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Target de `tracing` para las líneas de acceso
pub const ACCESS_LOG_TARGET: &str = "http_engine::access";

const MISSING: &str = "_";

/// Versiones de Windows NT, de la más específica a la más general
const WINDOWS_NT_VERSIONS: &[(&str, &str)] = &[
    ("Windows NT 10.0", "Windows 10"),
    ("Windows NT 6.3", "Windows 8.1"),
    ("Windows NT 6.2", "Windows 8"),
    ("Windows NT 6.1", "Windows 7"),
    ("Windows NT 6.0", "Windows Vista"),
    ("Windows NT 5.2", "Windows Server 2003/XP x64"),
    ("Windows NT 5.1", "Windows XP"),
    ("Windows NT 5.01", "Windows 2000, Service Pack 1 (SP1)"),
    ("Windows NT 5.0", "Windows 2000"),
    ("Windows NT 4.0", "Windows NT 4.0"),
    ("Windows NT", "Windows NT"),
];

/// Plataformas que se buscan tal cual dentro del User-Agent, en orden
const PLATFORMS: &[&str] = &[
    "Windows", "iPhone", "iPad", "Macintosh", "Mac OS X", "Mac_PowerPC", "Mac_68K",
    "iOS", "Android", "FreeBSD", "OpenBSD", "NetBSD", "SunOS", "IRIX",
    "HP-UX", "AIX", "OS/2", "QNX", "BeOS", "AmigaOS", "MorphOS",
    "Nintendo", "PlayStation", "Xbox", "Linux", "X11", "Chrome OS", "BlackBerry",
    "Symbian OS", "PalmOS", "WebOS", "Tizen", "Windows Phone", "Windows CE",
];

/// Deduce la plataforma del cliente a partir del User-Agent
///
/// # Ejemplo
/// ```
/// use http_engine::server::access_log::guess_platform;
///
/// assert_eq!(guess_platform("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"), "Windows 10");
/// assert_eq!(guess_platform("Mozilla/5.0 (X11; Linux x86_64)"), "Linux");
/// assert_eq!(guess_platform("curl/8.0"), "_");
/// ```
pub fn guess_platform(user_agent: &str) -> &'static str {
    if let Some((_, name)) = WINDOWS_NT_VERSIONS
        .iter()
        .find(|(token, _)| user_agent.contains(token))
    {
        return name;
    }

    PLATFORMS
        .iter()
        .find(|platform| user_agent.contains(*platform))
        .copied()
        .unwrap_or(MISSING)
}

/// Tamaño legible: B, KB, MB o GB
pub fn format_size(bytes: usize) -> String {
    const KILOBYTE: usize = 1024;
    const MEGABYTE: usize = 1024 * KILOBYTE;
    const GIGABYTE: usize = 1024 * MEGABYTE;

    if bytes < KILOBYTE {
        format!("{}B", bytes)
    } else if bytes < MEGABYTE {
        format!("{:.2}KB", bytes as f64 / KILOBYTE as f64)
    } else if bytes < GIGABYTE {
        format!("{:.2}MB", bytes as f64 / MEGABYTE as f64)
    } else {
        format!("{:.2}GB", bytes as f64 / GIGABYTE as f64)
    }
}

/// Tiempo legible: ms por debajo del segundo, s por debajo del minuto
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{}s", elapsed.as_secs())
    } else {
        format!("{}min {}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    }
}

/// Cómo terminó el request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Se envió una respuesta con este status y tamaño de body
    Responded { status: u16, size: usize },

    /// La conexión se abandonó
    Failed(String),
}

/// Datos de una línea del access log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLog {
    pub client_ip: String,
    pub country: String,
    pub platform: &'static str,
    pub method: String,
    pub host: String,
    pub target: String,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl AccessLog {
    /// Entrada para un request parseado
    pub fn for_request(parsed: &ParsedRequest, outcome: Outcome, elapsed: Duration) -> Self {
        let field = |name: &str| parsed.header(name).unwrap_or(MISSING).to_string();

        Self {
            client_ip: field("X-Forwarded-For"),
            country: field("Cf-Ipcountry"),
            platform: parsed.header("User-Agent").map(guess_platform).unwrap_or(MISSING),
            method: parsed.method_token().to_string(),
            host: field("Host"),
            target: parsed.target().to_string(),
            outcome,
            elapsed,
        }
    }

    /// Entrada para una conexión que falló antes de tener un request
    pub fn for_failure(message: &str, elapsed: Duration) -> Self {
        Self {
            client_ip: MISSING.to_string(),
            country: MISSING.to_string(),
            platform: MISSING,
            method: MISSING.to_string(),
            host: MISSING.to_string(),
            target: MISSING.to_string(),
            outcome: Outcome::Failed(message.to_string()),
            elapsed,
        }
    }

    /// Conexión abandonada o respuesta 5xx
    pub fn is_failure(&self) -> bool {
        match &self.outcome {
            Outcome::Responded { status, .. } => StatusCode::from_u16(*status)
                .map_or(true, |status| status.is_server_error()),
            Outcome::Failed(_) => true,
        }
    }

    /// Emite la línea: `warn` para fallos, `info` para el resto
    pub fn emit(&self) {
        if self.is_failure() {
            warn!(target: ACCESS_LOG_TARGET, "{}", self);
        } else {
            info!(target: ACCESS_LOG_TARGET, "{}", self);
        }
    }
}

impl fmt::Display for AccessLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({}) {} {} {} ",
            self.client_ip, self.country, self.platform, self.method, self.host, self.target
        )?;

        match &self.outcome {
            Outcome::Responded { status, size } => write!(f, "{} {}", status, format_size(*size))?,
            Outcome::Failed(message) => write!(f, "{}", message)?,
        }

        write!(f, " {}", format_elapsed(self.elapsed))
    }
}
