//! Fill documents: a YAML description of the substitutions to run on a template deck.
//!
//! ```yaml
//! slides:
//!   - index: 0
//!     text:
//!       - tag: "{{title}}"
//!         text: Quarterly report
//!     pictures:
//!       - tag: "{{logo}}"
//!         path: logo.png
//!     tables:
//!       - tag: SalesTable
//!         rows:
//!           - - tag: "{{name}}"
//!               text: Alice
//!               bold: true
//! ```
//!
//! Slide indices refer to the template as opened; slides generated while
//! applying one entry do not shift the others.
use crate::common::error::{Error, Result};
use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::format::ImageFormat;
use crate::ooxml::pptx::pagination;
use crate::ooxml::pptx::{Package, ParagraphSubstitution, Row, Scope, Slide};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Root of a fill document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    pub slides: Vec<SlideFill>,
}

/// Substitutions for one template slide.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SlideFill {
    /// Position of the slide in the template deck.
    pub index: usize,
    /// Whether to delete the template slide afterwards. Defaults to `true`
    /// when the entry paginates tables, since the generated pages replace it.
    pub remove_template: Option<bool>,
    pub text: Vec<TextFill>,
    pub pictures: Vec<PictureFill>,
    pub tables: Vec<TableFill>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextFill {
    pub tag: String,
    pub text: String,
    /// Also substitute inside tables.
    pub global: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PictureFill {
    pub tag: String,
    /// Image file, relative to the fill document.
    pub path: PathBuf,
    /// MIME type; guessed from the file extension when absent.
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableFill {
    /// Substring of the table title.
    pub tag: String,
    pub rows: Vec<Row>,
}

impl SlideFill {
    fn removes_template(&self) -> bool {
        self.remove_template.unwrap_or(!self.tables.is_empty())
    }
}

impl FillConfig {
    /// Parse a fill document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a fill document from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Run every substitution of the document against `pkg`.
    ///
    /// Relative picture paths are resolved against `base_dir`. Per slide, text
    /// tags are substituted first and pictures second, so pages generated for
    /// its tables carry both; tables are then paginated in document order, each
    /// one filling the pages produced for the tables before it.
    pub fn apply(&self, pkg: &mut Package, service: &dyn ParagraphSubstitution, base_dir: &Path) -> Result<()> {
        // Slide positions move once pages are inserted; pin the parts first.
        let partnames = self
            .slides
            .iter()
            .map(|fill| -> Result<PackURI> { Ok(pkg.slide(fill.index)?.partname().clone()) })
            .collect::<Result<Vec<PackURI>>>()?;

        for (fill, partname) in self.slides.iter().zip(partnames) {
            let mut slide = Slide::load(pkg, partname)?;
            apply_text(fill, &mut slide, service)?;
            slide.save(pkg)?;
            apply_pictures(fill, &mut slide, pkg, base_dir)?;

            let mut pages: Vec<Slide> = Vec::new();
            for table in &fill.tables {
                let rows = load_rows(&table.rows, base_dir)?;
                let created = pagination::replace_table(service, pkg, &slide, &table.tag, rows, &mut pages)?;
                pages.extend(created);
            }

            if fill.removes_template() {
                log::debug!("Removing template slide {}", slide.partname());
                slide.remove(pkg)?;
            }
        }
        Ok(())
    }
}

fn apply_text(fill: &SlideFill, slide: &mut Slide, service: &dyn ParagraphSubstitution) -> Result<()> {
    for text in &fill.text {
        let scope = if text.global { Scope::Global } else { Scope::NoTable };
        if !slide.replace_tag(service, &text.tag, &text.text, scope)? {
            log::warn!("Tag '{}' not found on {}", text.tag, slide.partname());
        }
    }
    Ok(())
}

fn apply_pictures(fill: &SlideFill, slide: &mut Slide, pkg: &mut Package, base_dir: &Path) -> Result<()> {
    for picture in &fill.pictures {
        let path = base_dir.join(&picture.path);
        let bytes = fs::read(&path).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let content_type = match &picture.content_type {
            Some(content_type) => content_type.clone(),
            None => path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
                .map(|format| format.mime_type().to_string())
                .unwrap_or_default(),
        };
        if slide.replace_picture(pkg, &picture.tag, Some(&bytes), &content_type)? == 0 {
            log::warn!("No picture tagged '{}' on {}", picture.tag, slide.partname());
        }
    }
    Ok(())
}

/// Copy of `rows` with every background picture read from disk.
fn load_rows(rows: &[Row], base_dir: &Path) -> Result<Vec<Row>> {
    let mut rows = rows.to_vec();
    for picture in rows
        .iter_mut()
        .flatten()
        .filter_map(|cell| cell.background_picture.as_mut())
    {
        picture.load(base_dir)?;
    }
    Ok(rows)
}
