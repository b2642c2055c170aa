//! Office Open XML (OOXML) presentation templating.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP, parts, relationships)
//! 2. **XML tree** (`xmltree`): mutable element tree used to edit slide content
//! 3. **Presentation layer** (`pptx`): slides, tables, pictures and pagination
//!
//! # Example
//!
//! ```rust,no_run
//! use pptx_templater::ooxml::pptx::{Package, RegexSubstitution, Scope};
//!
//! let mut pkg = Package::open("template.pptx")?;
//! let service = RegexSubstitution::default();
//! let mut slide = pkg.slide(0)?;
//! slide.replace_tag(&service, "{{title}}", "Quarterly report", Scope::NoTable)?;
//! slide.save(&mut pkg)?;
//! pkg.save("out.pptx")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;
pub mod xmltree;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};

// Re-export error types
pub use error::{OoxmlError, Result};
