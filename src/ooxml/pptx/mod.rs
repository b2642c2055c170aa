//! PowerPoint (.pptx) templating.
//!
//! A template deck carries tags such as `{{customer}}` in its text, in the
//! titles of its tables and in the descriptions of its pictures. This module
//! fills those tags in place and spreads table data over as many copies of a
//! slide as it takes.
//!
//! - [`Package`]: the opened .pptx file and its slide list
//! - [`Slide`]: one slide; cloning, ordering, removal and per-slide substitution
//! - [`Cell`]: what to write into a tagged table cell
//! - [`pagination`]: filling tables row by row across cloned slides
//! - [`ParagraphSubstitution`]: the pluggable run-aware text replacement
//!
//! # Example
//!
//! ```rust,no_run
//! use pptx_templater::ooxml::pptx::{pagination, Cell, Package, RegexSubstitution, Scope};
//!
//! let mut pkg = Package::open("template.pptx")?;
//! let service = RegexSubstitution::new();
//!
//! let mut cover = pkg.slide(0)?;
//! cover.replace_tag(&service, "{{customer}}", "ACME", Scope::NoTable)?;
//! cover.save(&mut pkg)?;
//!
//! let template = pkg.slide(1)?;
//! let rows = vec![
//!     vec![Cell::new("{{item}}", "Bolts"), Cell::new("{{qty}}", "10").with_bold(true)],
//!     vec![Cell::new("{{item}}", "Nuts"), Cell::new("{{qty}}", "25")],
//! ];
//! pagination::replace_table(&service, &mut pkg, &template, "Items", rows, &mut [])?;
//! template.remove(&mut pkg)?;
//!
//! pkg.save("filled.pptx")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cell;
pub mod format;
pub mod media;
pub mod package;
pub mod pagination;
pub mod presentation;
pub mod shapes;
pub mod slide;
pub mod substitution;
pub mod tag;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;

pub use cell::{BackgroundPicture, Cell, Row};
pub use format::ImageFormat;
pub use package::Package;
pub use pagination::{replace_table, set_rows};
pub use shapes::{Picture, Table, TableInfo, TableMut};
pub use slide::Slide;
pub use substitution::{ParagraphSubstitution, RegexSubstitution};
pub use template::{Scope, TagSubstitutor};
