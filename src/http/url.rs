//! # Descomposición de URLs
//! src/http/url.rs
//!
//! Construye la vista estructurada de la URL de un request a partir del
//! request-target y de los headers `X-Forwarded-Proto` / `Host`.
//!
//! ```text
//!                                                      search
//!                                              ┌─────────┴────────┐
//!                                path          │                  │
//!                     ┌───────────┴───────────┐│                  │
//! protocol://hostname/path[0]/path[1]/path[...]?foo=sth&bar=sthelse
//! └────────┬────────┘└───────────┬───────────┘
//!        origin               pathname
//! └──────────────────────────────┬─────────────────────────────────┘
//!                               href
//! ```
//!
//! Los valores de la query string **no** se des-escapan (`%20` queda como
//! `%20`), así `pathname + search` reconstruye siempre el target original.
//! Los payloads de formularios sí se des-escapan (ver [`parse_form`]).

use serde::Serialize;
use std::collections::HashMap;

/// URL de un request ya descompuesta. Inmutable una vez construida.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Url {
    href: String,
    protocol: String,
    hostname: String,
    origin: String,
    pathname: String,
    path: Vec<String>,
    search: String,
    #[serde(rename = "searchParams")]
    search_params: HashMap<String, String>,
}

impl Url {
    /// Descompone un request-target
    ///
    /// `proto` y `host` vienen de `X-Forwarded-Proto` y `Host`; si faltan se
    /// pasa un string vacío. Esta función no falla nunca.
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::Url;
    ///
    /// let url = Url::new("https", "example.com", "/a//b/?x=1&y");
    /// assert_eq!(url.origin(), "https://example.com");
    /// assert_eq!(url.pathname(), "/a//b/");
    /// assert_eq!(url.path(), &["a".to_string(), "b".to_string()]);
    /// assert_eq!(url.search(), "?x=1&y");
    /// assert_eq!(url.search_param("x"), Some("1"));
    /// assert_eq!(url.search_param("y"), Some(""));
    /// ```
    pub fn new(proto: &str, host: &str, target: &str) -> Self {
        let origin = format!("{}://{}", proto, host);
        let href = format!("{}{}", origin, target);

        let (pathname, search) = match target.find('?') {
            Some(pos) => (&target[..pos], &target[pos..]),
            None => (target, ""),
        };

        let path = pathname
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        let search_params = parse_pairs(search.strip_prefix('?').unwrap_or(search), false);

        Self {
            href,
            protocol: proto.to_string(),
            hostname: host.to_string(),
            origin,
            pathname: pathname.to_string(),
            path,
            search: search.to_string(),
            search_params,
        }
    }

    /// `origin + target`
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// `protocol + "://" + hostname`
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Target sin la query string
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Segmentos no vacíos del pathname
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Query string incluyendo el `?` inicial, o vacío
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn search_params(&self) -> &HashMap<String, String> {
        &self.search_params
    }

    /// Obtiene un parámetro de la query string
    pub fn search_param(&self, name: &str) -> Option<&str> {
        self.search_params.get(name).map(|s| s.as_str())
    }
}

/// Parsea un payload `application/x-www-form-urlencoded`
///
/// Igual que la query string, pero claves y valores se des-escapan:
/// `+` pasa a espacio y las secuencias `%XX` se decodifican.
///
/// # Ejemplo
/// ```
/// use http_engine::http::url::parse_form;
///
/// let form = parse_form("name=Ada+Lovelace&lang=en%2Des&lang=es&flag");
/// assert_eq!(form["name"], "Ada Lovelace");
/// assert_eq!(form["lang"], "es");
/// assert_eq!(form["flag"], "");
/// ```
pub fn parse_form(input: &str) -> HashMap<String, String> {
    parse_pairs(input, true)
}

/// Separa `k1=v1&k2=v2` en un mapa
///
/// Un par sin `=` queda con valor vacío, los pares vacíos se ignoran y ante
/// claves repetidas gana la última.
fn parse_pairs(input: &str, unescape: bool) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.find('=') {
            Some(eq_pos) => (&pair[..eq_pos], &pair[eq_pos + 1..]),
            None => (pair, ""),
        };

        if unescape {
            params.insert(form_unescape(key), form_unescape(value));
        } else {
            params.insert(key.to_string(), value.to_string());
        }
    }

    params
}

/// Des-escapa un componente de formulario. Si la secuencia no es UTF-8
/// válido se conserva el texto original.
fn form_unescape(component: &str) -> String {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let url = Url::new("https", "h", "/hello?x=1");

        assert_eq!(url.protocol(), "https");
        assert_eq!(url.hostname(), "h");
        assert_eq!(url.origin(), "https://h");
        assert_eq!(url.href(), "https://h/hello?x=1");
        assert_eq!(url.pathname(), "/hello");
        assert_eq!(url.path(), &["hello".to_string()]);
        assert_eq!(url.search(), "?x=1");
        assert_eq!(url.search_param("x"), Some("1"));
    }

    #[test]
    fn test_missing_forwarded_headers() {
        let url = Url::new("", "", "/");
        assert_eq!(url.origin(), "://");
        assert_eq!(url.href(), ":///");
        assert!(url.path().is_empty());
        assert!(url.search().is_empty());
        assert!(url.search_params().is_empty());
    }

    #[test]
    fn test_path_drops_empty_segments() {
        let url = Url::new("http", "h", "//a///b/c//");
        assert_eq!(url.path(), &["a", "b", "c"].map(String::from));
    }

    #[test]
    fn test_reconstruction_property() {
        let targets = [
            "/",
            "",
            "/a/b",
            "/a?",
            "/a?x=1&y=2",
            "/?only",
            "/weird??x=1?y",
            "/p%20q?v=a%20b",
            "*",
        ];

        for target in targets {
            let url = Url::new("http", "h", target);
            assert_eq!(format!("{}{}", url.pathname(), url.search()), target);
            assert!(url.path().iter().all(|s| !s.is_empty()), "target {:?}", target);
        }
    }

    #[test]
    fn test_search_params_last_wins() {
        let url = Url::new("http", "h", "/?a=1&a=2&b");
        assert_eq!(url.search_param("a"), Some("2"));
        assert_eq!(url.search_param("b"), Some(""));
        assert_eq!(url.search_params().len(), 2);
    }

    #[test]
    fn test_search_params_not_unescaped() {
        let url = Url::new("http", "h", "/?text=hello%20world&q=a+b");
        assert_eq!(url.search_param("text"), Some("hello%20world"));
        assert_eq!(url.search_param("q"), Some("a+b"));
    }

    #[test]
    fn test_value_keeps_extra_equals() {
        let url = Url::new("http", "h", "/?expr=a=b");
        assert_eq!(url.search_param("expr"), Some("a=b"));
    }

    #[test]
    fn test_parse_form_unescapes() {
        let form = parse_form("msg=hello%20world&sp=a+b&k%26=v");
        assert_eq!(form["msg"], "hello world");
        assert_eq!(form["sp"], "a b");
        assert_eq!(form["k&"], "v");
    }

    #[test]
    fn test_parse_form_invalid_utf8_kept_raw() {
        let form = parse_form("bad=%FF");
        assert_eq!(form["bad"], "%FF");
    }

    #[test]
    fn test_parse_form_key_set_and_duplicates() {
        let form = parse_form("a=1&a=2");
        assert_eq!(form.len(), 1);
        assert_eq!(form["a"], "2");

        let form = parse_form("x=1&&y=2&");
        let mut keys: Vec<_> = form.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["x", "y"]);
    }

    #[test]
    fn test_serializes_search_params_camel_case() {
        let url = Url::new("http", "h", "/a?x=1");
        let json = serde_json::to_value(&url).unwrap();
        assert_eq!(json["pathname"], "/a");
        assert_eq!(json["searchParams"]["x"], "1");
        assert_eq!(json["path"][0], "a");
    }
}
