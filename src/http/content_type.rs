//! # Content-Types
//! src/http/content_type.rs
//!
//! Enumeración de los tipos MIME que el servidor sabe emitir y las dos
//! tablas inversas que se usan al servir archivos:
//!
//! - tipo MIME detectado por el sistema operativo → [`ContentType`]
//! - extensión del archivo → [`ContentType`]
//!
//! La resolución completa para un archivo (SO, extensión, binario genérico)
//! vive en [`ContentType::detect`].

use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Tipos de contenido soportados en la respuesta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    ApplicationJavaArchive,
    ApplicationEdiX12,
    ApplicationEdifact,
    ApplicationJavascript,
    ApplicationOctetStream,
    ApplicationOgg,
    ApplicationPdf,
    ApplicationXhtmlXml,
    ApplicationXShockwaveFlash,
    ApplicationJson,
    ApplicationLdJson,
    ApplicationXml,
    ApplicationZip,
    ApplicationXWwwFormUrlencoded,
    AudioMpeg,
    AudioXMsWma,
    AudioVndRnRealaudio,
    AudioXWav,
    ImageGif,
    ImageJpeg,
    ImagePng,
    ImageTiff,
    ImageVndMicrosoftIcon,
    ImageXIcon,
    ImageVndDjvu,
    ImageSvgXml,
    TextCss,
    TextCsv,
    TextHtml,
    TextJavascript,
    #[default]
    TextPlain,
    TextXml,
    VideoMpeg,
    VideoMp4,
    VideoQuicktime,
    VideoXMsWmv,
    VideoXMsvideo,
    VideoXFlv,
    VideoWebm,
}

impl ContentType {
    /// Valor que se escribe en el header `Content-Type`
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::ContentType;
    /// assert_eq!(ContentType::TextPlain.as_str(), "text/plain");
    /// assert_eq!(ContentType::ImageSvgXml.as_str(), "image/svg+xml");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ApplicationJavaArchive => "application/java-archive",
            ContentType::ApplicationEdiX12 => "application/EDI-X12",
            ContentType::ApplicationEdifact => "application/EDIFACT",
            ContentType::ApplicationJavascript => "application/javascript",
            ContentType::ApplicationOctetStream => "application/octet-stream",
            ContentType::ApplicationOgg => "application/ogg",
            ContentType::ApplicationPdf => "application/pdf",
            ContentType::ApplicationXhtmlXml => "application/xhtml+xml",
            ContentType::ApplicationXShockwaveFlash => "application/x-shockwave-flash",
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationLdJson => "application/ld+json",
            ContentType::ApplicationXml => "application/xml",
            ContentType::ApplicationZip => "application/zip",
            ContentType::ApplicationXWwwFormUrlencoded => "application/x-www-form-urlencoded",
            ContentType::AudioMpeg => "audio/mpeg",
            ContentType::AudioXMsWma => "audio/x-ms-wma",
            ContentType::AudioVndRnRealaudio => "audio/vnd.rn-realaudio",
            ContentType::AudioXWav => "audio/x-wav",
            ContentType::ImageGif => "image/gif",
            ContentType::ImageJpeg => "image/jpeg",
            ContentType::ImagePng => "image/png",
            ContentType::ImageTiff => "image/tiff",
            ContentType::ImageVndMicrosoftIcon => "image/vnd.microsoft.icon",
            ContentType::ImageXIcon => "image/x-icon",
            ContentType::ImageVndDjvu => "image/vnd.djvu",
            ContentType::ImageSvgXml => "image/svg+xml",
            ContentType::TextCss => "text/css",
            ContentType::TextCsv => "text/csv",
            ContentType::TextHtml => "text/html",
            ContentType::TextJavascript => "text/javascript",
            ContentType::TextPlain => "text/plain",
            ContentType::TextXml => "text/xml",
            ContentType::VideoMpeg => "video/mpeg",
            ContentType::VideoMp4 => "video/mp4",
            ContentType::VideoQuicktime => "video/quicktime",
            ContentType::VideoXMsWmv => "video/x-ms-wmv",
            ContentType::VideoXMsvideo => "video/x-msvideo",
            ContentType::VideoXFlv => "video/x-flv",
            ContentType::VideoWebm => "video/webm",
        }
    }

    /// Traduce un tipo MIME (tal como lo reporta `file --mime-type`)
    ///
    /// `text/plain` no está en esta tabla: `file` lo reporta para cualquier
    /// archivo de texto (CSS, JS, CSV...), así que decide la extensión.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let content_type = match mime.trim() {
            "text/html" => ContentType::TextHtml,
            "text/css" => ContentType::TextCss,
            "text/javascript" => ContentType::TextJavascript,
            "application/octet-stream" => ContentType::ApplicationOctetStream,
            "application/ogg" => ContentType::ApplicationOgg,
            "application/pdf" => ContentType::ApplicationPdf,
            "application/xhtml+xml" => ContentType::ApplicationXhtmlXml,
            "application/x-shockwave-flash" => ContentType::ApplicationXShockwaveFlash,
            "application/json" => ContentType::ApplicationJson,
            "application/ld+json" => ContentType::ApplicationLdJson,
            "application/xml" => ContentType::ApplicationXml,
            "application/zip" => ContentType::ApplicationZip,
            "application/x-www-form-urlencoded" => ContentType::ApplicationXWwwFormUrlencoded,
            "audio/mpeg" => ContentType::AudioMpeg,
            "audio/x-ms-wma" => ContentType::AudioXMsWma,
            "audio/vnd.rn-realaudio" => ContentType::AudioVndRnRealaudio,
            "audio/x-wav" => ContentType::AudioXWav,
            "image/gif" => ContentType::ImageGif,
            "image/jpeg" => ContentType::ImageJpeg,
            "image/png" => ContentType::ImagePng,
            "image/tiff" => ContentType::ImageTiff,
            "image/vnd.microsoft.icon" => ContentType::ImageVndMicrosoftIcon,
            "image/x-icon" => ContentType::ImageXIcon,
            "image/vnd.djvu" => ContentType::ImageVndDjvu,
            "image/svg+xml" => ContentType::ImageSvgXml,
            "video/mpeg" => ContentType::VideoMpeg,
            "video/mp4" => ContentType::VideoMp4,
            "video/quicktime" => ContentType::VideoQuicktime,
            "video/x-ms-wmv" => ContentType::VideoXMsWmv,
            "video/x-msvideo" => ContentType::VideoXMsvideo,
            "video/x-flv" => ContentType::VideoXFlv,
            "video/webm" => ContentType::VideoWebm,
            _ => return None,
        };
        Some(content_type)
    }

    /// Traduce una extensión de archivo (sin el punto, sin importar mayúsculas)
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::ContentType;
    /// assert_eq!(ContentType::from_extension("HTML"), Some(ContentType::TextHtml));
    /// assert_eq!(ContentType::from_extension("js"), Some(ContentType::ApplicationJavascript));
    /// assert_eq!(ContentType::from_extension("rs"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        let content_type = match extension.to_ascii_lowercase().as_str() {
            "jar" => ContentType::ApplicationJavaArchive,
            "x12" => ContentType::ApplicationEdiX12,
            "edi" => ContentType::ApplicationEdifact,
            "js" | "mjs" => ContentType::ApplicationJavascript,
            "bin" => ContentType::ApplicationOctetStream,
            "ogg" => ContentType::ApplicationOgg,
            "pdf" => ContentType::ApplicationPdf,
            "xhtml" => ContentType::ApplicationXhtmlXml,
            "swf" => ContentType::ApplicationXShockwaveFlash,
            "json" => ContentType::ApplicationJson,
            "jsonld" => ContentType::ApplicationLdJson,
            "xml" => ContentType::ApplicationXml,
            "zip" => ContentType::ApplicationZip,
            "form" => ContentType::ApplicationXWwwFormUrlencoded,
            "mp3" => ContentType::AudioMpeg,
            "wma" => ContentType::AudioXMsWma,
            "ra" => ContentType::AudioVndRnRealaudio,
            "wav" => ContentType::AudioXWav,
            "gif" => ContentType::ImageGif,
            "jpeg" | "jpg" => ContentType::ImageJpeg,
            "png" => ContentType::ImagePng,
            "tiff" | "tif" => ContentType::ImageTiff,
            "ico" => ContentType::ImageVndMicrosoftIcon,
            "djvu" => ContentType::ImageVndDjvu,
            "svg" => ContentType::ImageSvgXml,
            "css" => ContentType::TextCss,
            "csv" => ContentType::TextCsv,
            "html" | "htm" => ContentType::TextHtml,
            "txt" => ContentType::TextPlain,
            "mpeg" => ContentType::VideoMpeg,
            "mp4" => ContentType::VideoMp4,
            "mov" => ContentType::VideoQuicktime,
            "wmv" => ContentType::VideoXMsWmv,
            "avi" => ContentType::VideoXMsvideo,
            "flv" => ContentType::VideoXFlv,
            "webm" => ContentType::VideoWebm,
            _ => return None,
        };
        Some(content_type)
    }

    /// Resuelve el content-type de un archivo en disco
    ///
    /// 1. Detección MIME del sistema operativo (`file -b --mime-type`)
    /// 2. Tabla de extensiones
    /// 3. `application/octet-stream`
    pub fn detect(path: &Path) -> Self {
        if let Some(content_type) = os_mime_type(path).as_deref().and_then(Self::from_mime) {
            debug!(path = %path.display(), content_type = content_type.as_str(), "content-type deduced from mime type");
            return content_type;
        }

        if let Some(content_type) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
        {
            debug!(path = %path.display(), content_type = content_type.as_str(), "content-type deduced from extension");
            return content_type;
        }

        warn!(path = %path.display(), "content-type unknown, defaulting to application/octet-stream");
        ContentType::ApplicationOctetStream
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pregunta al sistema operativo por el tipo MIME del archivo.
///
/// Retorna `None` si `file` no está instalado o falla.
fn os_mime_type(path: &Path) -> Option<String> {
    let output = Command::new("file")
        .arg("-b")
        .arg("--mime-type")
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let mime = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_text_plain() {
        assert_eq!(ContentType::default(), ContentType::TextPlain);
        assert_eq!(ContentType::default().to_string(), "text/plain");
    }

    #[test]
    fn test_from_mime_roundtrips_wire_string() {
        for ct in [
            ContentType::TextHtml,
            ContentType::ApplicationJson,
            ContentType::ImagePng,
            ContentType::VideoWebm,
        ] {
            assert_eq!(ContentType::from_mime(ct.as_str()), Some(ct));
        }
    }

    #[test]
    fn test_from_mime_ignores_text_plain() {
        assert_eq!(ContentType::from_mime("text/plain"), None);
        assert_eq!(ContentType::from_mime("inode/directory"), None);
    }

    #[test]
    fn test_from_extension_table() {
        assert_eq!(ContentType::from_extension("css"), Some(ContentType::TextCss));
        assert_eq!(ContentType::from_extension("png"), Some(ContentType::ImagePng));
        assert_eq!(ContentType::from_extension("ico"), Some(ContentType::ImageVndMicrosoftIcon));
        assert_eq!(ContentType::from_extension("xml"), Some(ContentType::ApplicationXml));
        assert_eq!(ContentType::from_extension("txt"), Some(ContentType::TextPlain));
        assert_eq!(ContentType::from_extension(""), None);
    }

    #[test]
    fn test_detect_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.css");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"body { color: red; }\n").unwrap();

        // `file` reporta text/plain (ignorado), así que gana la extensión
        assert_eq!(ContentType::detect(&path), ContentType::TextCss);
    }

    #[test]
    fn test_detect_unknown_defaults_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.unknownext");
        std::fs::write(&path, b"plain words").unwrap();

        assert_eq!(ContentType::detect(&path), ContentType::ApplicationOctetStream);
    }
}
