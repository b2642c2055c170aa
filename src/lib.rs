//! pptx-templater - tag-driven templating for PowerPoint (.pptx) decks
//!
//! A template deck marks the places to fill with tags: `{{name}}` tokens in
//! text, a tag in the title (or description) of a table, a tag in the
//! description (or title) of a picture. This library fills them in place and,
//! when a table receives more rows than it has room for, clones its slide as
//! often as needed and spreads the rows over the copies in order.
//!
//! # Features
//!
//! - **Run-aware substitution**: tags split across formatting runs are found and replaced
//! - **Table pagination**: rows beyond a table's capacity flow onto cloned slides
//! - **Cell formatting**: bold, italic, strikethrough and picture fills per cell
//! - **Picture replacement**: swap the image behind tagged pictures
//! - **Fill documents**: describe a whole fill in YAML and run it with `pptx-fill`
//!
//! # Example - Filling a table
//!
//! ```no_run
//! use pptx_templater::ooxml::pptx::{pagination, Cell, Package, RegexSubstitution};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pkg = Package::open("template.pptx")?;
//! let service = RegexSubstitution::new();
//! let template = pkg.slide(0)?;
//!
//! let rows = (1..=40)
//!     .map(|n| vec![Cell::new("{{n}}", n.to_string()), Cell::new("{{sq}}", (n * n).to_string())])
//!     .collect();
//! let pages = pagination::replace_table(&service, &mut pkg, &template, "Squares", rows, &mut [])?;
//! template.remove(&mut pkg)?;
//!
//! println!("Generated {} slides", pages.len());
//! pkg.save("squares.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Running a fill document
//!
//! ```no_run
//! use pptx_templater::config::FillConfig;
//! use pptx_templater::ooxml::pptx::{Package, RegexSubstitution};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FillConfig::from_path("fill.yaml")?;
//! let mut pkg = Package::open("template.pptx")?;
//! config.apply(&mut pkg, &RegexSubstitution::new(), Path::new("."))?;
//! pkg.save("filled.pptx")?;
//! # Ok(())
//! # }
//! ```

/// Error types shared by the whole crate
pub mod common;

/// YAML fill documents
pub mod config;

/// OOXML package handling and presentation templating
pub mod ooxml;

pub use common::{Error, Result};
pub use config::FillConfig;
pub use ooxml::pptx::{Cell, Package, RegexSubstitution, Row, Slide};
