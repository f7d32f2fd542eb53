use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Fault;

/// Binary image formats the normalizer knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

/// The serialization of a response body.
///
/// Inferred from the upstream `Content-Type` header or declared by the
/// action (for example from a document's file extension).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Json,
    Xml,
    Text,
    Html,
    Image(ImageFormat),
}

impl ContentKind {
    /// Infer the kind from a `Content-Type` header value.
    ///
    /// Parameters such as `; charset=utf-8` are ignored. A missing or
    /// unrecognized media type falls back to [`ContentKind::Json`].
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return Self::Json;
        };
        let media = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match media.as_str() {
            "application/xml" | "text/xml" => Self::Xml,
            "text/plain" => Self::Text,
            "text/html" => Self::Html,
            "image/jpeg" | "image/jpg" => Self::Image(ImageFormat::Jpeg),
            "image/png" => Self::Image(ImageFormat::Png),
            "image/gif" => Self::Image(ImageFormat::Gif),
            // application/json, text/json and everything unknown
            _ => Self::Json,
        }
    }

    /// Parse a declared kind name (`json`, `txt`, `jpg`, ...).
    ///
    /// Unlike header inference there is no fallback: an unknown name means
    /// the action was configured wrong.
    pub fn from_name(name: &str) -> Result<Self, Fault> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            "text" | "txt" => Ok(Self::Text),
            "html" | "htm" => Ok(Self::Html),
            "jpg" | "jpeg" => Ok(Self::Image(ImageFormat::Jpeg)),
            "png" => Ok(Self::Image(ImageFormat::Png)),
            "gif" => Ok(Self::Image(ImageFormat::Gif)),
            other => Err(Fault::Configuration(format!(
                "content type |{other}| unrecognized"
            ))),
        }
    }

    /// The canonical `Content-Type` header value emitted for this kind.
    pub fn canonical_header(self) -> &'static str {
        match self {
            Self::Json => "text/json",
            Self::Xml => "text/xml",
            Self::Text => "text/plain",
            Self::Html => "text/html",
            Self::Image(ImageFormat::Jpeg) => "image/jpeg",
            Self::Image(ImageFormat::Png) => "image/png",
            Self::Image(ImageFormat::Gif) => "image/gif",
        }
    }

    /// Whether bodies of this kind are binary and must be base64 encoded.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Image(_))
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_header())
    }
}
