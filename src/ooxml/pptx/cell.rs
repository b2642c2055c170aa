//! Cell descriptors: what to substitute into a table cell and how to format it.
use crate::ooxml::pptx::format::ImageFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One tag substitution for a table cell.
///
/// A data row may carry several descriptors; each is tried against every
/// physical cell of the row it lands in.
///
/// # Examples
///
/// ```
/// use pptx_templater::ooxml::pptx::Cell;
///
/// let cell = Cell::new("{{name}}", "Alice").with_bold(true);
/// assert!(cell.bold);
/// assert!(!cell.italic);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Cell {
    /// Tag pattern passed to the paragraph substitution service
    pub tag: String,
    #[serde(rename = "text", alias = "new_text")]
    pub new_text: String,
    pub bold: bool,
    /// Carried on the descriptor but not applied to runs
    pub underline: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub background_picture: Option<BackgroundPicture>,
}

impl Cell {
    /// Plain substitution with all formatting flags cleared.
    pub fn new(tag: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            new_text: new_text.into(),
            ..Self::default()
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = strikethrough;
        self
    }

    pub fn with_background_picture(mut self, picture: BackgroundPicture) -> Self {
        self.background_picture = Some(picture);
        self
    }
}

/// A data row: the cell descriptors applied to one physical table row.
pub type Row = Vec<Cell>;

/// Picture used as a stretched cell fill.
///
/// The insets are `a:fillRect` offsets in thousandths of a percent of the cell
/// size; positive values shrink the picture, negative values let it overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackgroundPicture {
    /// Image bytes; filled from `path` by [`load`](Self::load) when read from configuration
    #[serde(skip)]
    pub content: Vec<u8>,
    pub path: Option<PathBuf>,
    pub content_type: String,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl BackgroundPicture {
    pub fn new(content: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            content,
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    /// Builder-style inset setter, in `top, right, bottom, left` order.
    pub fn with_insets(mut self, top: i32, right: i32, bottom: i32, left: i32) -> Self {
        self.top = top;
        self.right = right;
        self.bottom = bottom;
        self.left = left;
        self
    }

    /// Whether there is anything to embed.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Read `content` from `path` (relative to `base_dir`) if it is not set yet,
    /// guessing the content type from the extension when none was given.
    pub fn load(&mut self, base_dir: &Path) -> std::io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.content.is_empty() {
            return Ok(());
        }
        let full = base_dir.join(path);
        self.content = std::fs::read(&full)?;
        if self.content_type.is_empty() {
            if let Some(format) = full
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
            {
                self.content_type = format.mime_type().to_string();
            }
        }
        Ok(())
    }
}
