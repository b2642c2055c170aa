//! Image formats accepted for embedded pictures.
use crate::ooxml::opc::constants::content_type as ct;
use phf::phf_map;

/// Image format types supported by PPTX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Emf,
    Wmf,
    Svg,
    Webp,
}

/// Content types (including common non-canonical spellings) by format.
static CONTENT_TYPES: phf::Map<&'static str, ImageFormat> = phf_map! {
    "image/png" => ImageFormat::Png,
    "image/x-png" => ImageFormat::Png,
    "image/jpeg" => ImageFormat::Jpeg,
    "image/jpg" => ImageFormat::Jpeg,
    "image/pjpeg" => ImageFormat::Jpeg,
    "image/gif" => ImageFormat::Gif,
    "image/bmp" => ImageFormat::Bmp,
    "image/x-bmp" => ImageFormat::Bmp,
    "image/x-ms-bmp" => ImageFormat::Bmp,
    "image/tiff" => ImageFormat::Tiff,
    "image/x-emf" => ImageFormat::Emf,
    "image/emf" => ImageFormat::Emf,
    "image/x-wmf" => ImageFormat::Wmf,
    "image/wmf" => ImageFormat::Wmf,
    "image/svg+xml" => ImageFormat::Svg,
    "image/webp" => ImageFormat::Webp,
};

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => ct::PNG,
            Self::Jpeg => ct::JPEG,
            Self::Gif => ct::GIF,
            Self::Bmp => ct::BMP,
            Self::Tiff => ct::TIFF,
            Self::Emf => ct::X_EMF,
            Self::Wmf => ct::X_WMF,
            Self::Svg => ct::SVG,
            Self::Webp => ct::WEBP,
        }
    }

    /// Get the file extension for this image format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Emf => "emf",
            Self::Wmf => "wmf",
            Self::Svg => "svg",
            Self::Webp => "webp",
        }
    }

    /// Look up a content type such as `image/png` or `Image/JPEG; q=0.9`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        CONTENT_TYPES
            .get(essence.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Guess from a file extension (`png`, `JPG`, ...).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" | "dib" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "emf" => Some(Self::Emf),
            "wmf" => Some(Self::Wmf),
            "svg" => Some(Self::Svg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detect image format from bytes (magic number detection).
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF: 47 49 46 38 (GIF8)
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        // BMP: 42 4D (BM)
        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        // TIFF: little-endian or big-endian byte order mark
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        // WEBP: RIFF....WEBP
        if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }

        // EMF: record type 1 followed by the " EMF" signature at offset 40
        if bytes.len() >= 44 && bytes.starts_with(&[0x01, 0x00, 0x00, 0x00]) && &bytes[40..44] == b" EMF"
        {
            return Some(Self::Emf);
        }

        // WMF: placeable header or standard metafile header
        if bytes.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) || bytes.starts_with(&[0x01, 0x00, 0x09, 0x00])
        {
            return Some(Self::Wmf);
        }

        let head = &bytes[..bytes.len().min(512)];
        if memchr::memmem::find(head, b"<svg").is_some() {
            return Some(Self::Svg);
        }

        None
    }

    /// Format for an image supplied with a caller-declared content type.
    ///
    /// The declared type wins when it is known. Otherwise the bytes are sniffed,
    /// and when that fails too the image is stored as PNG.
    pub fn resolve(content_type: &str, bytes: &[u8]) -> Self {
        if let Some(format) = Self::from_content_type(content_type) {
            return format;
        }
        match Self::detect_from_bytes(bytes) {
            Some(format) => {
                log::warn!(
                    "Unrecognized image content type '{}', detected {} from content",
                    content_type,
                    format.mime_type()
                );
                format
            },
            None => {
                log::warn!(
                    "Unrecognized image content type '{}', storing as {}",
                    content_type,
                    ct::PNG
                );
                Self::Png
            },
        }
    }
}
