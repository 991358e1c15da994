use crate::error::ImageDataError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::fmt;

lazy_static::lazy_static! {
    static ref DATA_URI_HEADER: Regex =
        Regex::new(r"^data:image/(png|jpeg|jpg);base64,").expect("static regex");
}

pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Base64 image text, with or without a `data:image/...;base64,` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encodes raw PNG bytes as a data URI.
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self::from_bytes(DEFAULT_MIME_TYPE, bytes)
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self(to_data_uri(mime_type, &STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The bare base64 payload.
    pub fn payload(&self) -> &str {
        strip_data_uri_header(&self.0)
    }

    /// Mime type from the header, `image/png` when there is none.
    pub fn mime_type(&self) -> &str {
        match DATA_URI_HEADER.captures(&self.0).and_then(|c| c.get(1)) {
            Some(m) if m.as_str() == "png" => "image/png",
            Some(_) => "image/jpeg",
            None => DEFAULT_MIME_TYPE,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload().trim().is_empty()
    }

    pub fn decode(&self) -> Result<Vec<u8>, ImageDataError> {
        Ok(STANDARD.decode(self.payload().trim())?)
    }

    pub fn decode_image(&self) -> Result<image::DynamicImage, ImageDataError> {
        let bytes = self.decode()?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EncodedImage {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Removes a leading `data:image/{png|jpeg|jpg};base64,` header if present.
pub fn strip_data_uri_header(encoded: &str) -> &str {
    match DATA_URI_HEADER.find(encoded) {
        Some(m) => &encoded[m.end()..],
        None => encoded,
    }
}

pub fn to_data_uri(mime_type: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, payload)
}
