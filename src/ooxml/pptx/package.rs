/// Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::constants::relationship_type as RT;
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::presentation::PresentationPart;
use crate::ooxml::pptx::slide::Slide;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Main document content types accepted as presentations.
const PRESENTATION_TYPES: &[&str] = &[
    ct::PML_PRESENTATION_MAIN,
    ct::PML_PRES_MACRO_MAIN,
    ct::PML_TEMPLATE_MAIN,
];

/// A PowerPoint (.pptx) package.
///
/// This is the handle every templating operation works through: open it, edit
/// slides, then [`save`](Self::save) or [`to_bytes`](Self::to_bytes).
/// Operations edit the package in place and are not transactional; a failed
/// multi-step operation leaves the edits made before the failure.
///
/// # Examples
///
/// ```rust,no_run
/// use pptx_templater::ooxml::pptx::Package;
///
/// let pkg = Package::open("presentation.pptx")?;
/// println!("Presentation has {} slides", pkg.slide_count()?);
/// for slide in pkg.slides()? {
///     println!("{}: {:?}", slide.partname(), slide.title());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package {
    /// The underlying OPC package
    opc: OpcPackage,
}

impl Package {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Create a .pptx package from a reader.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use pptx_templater::ooxml::pptx::Package;
    /// use std::io::Cursor;
    ///
    /// let data = std::fs::read("presentation.pptx")?;
    /// let pkg = Package::from_reader(Cursor::new(data))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    /// Create a .pptx package from in-memory bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Wrap an OPC package after checking that its main part is a presentation.
    pub fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_part()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        let content_type = main_part.content_type();
        if !PRESENTATION_TYPES.contains(&content_type) {
            return Err(OoxmlError::InvalidContentType {
                expected: PRESENTATION_TYPES.join(" or "),
                got: content_type.to_string(),
            });
        }

        Ok(Self { opc })
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }

    #[inline]
    pub fn opc_mut(&mut self) -> &mut OpcPackage {
        &mut self.opc
    }

    /// Save the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.opc.save(path)?;
        Ok(())
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    /// Release the package without saving.
    pub fn close(self) {}

    /// Partnames of the slides in presentation order.
    pub fn slide_partnames(&self) -> Result<Vec<PackURI>> {
        let pres = PresentationPart::load(&self.opc)?;
        let rels = self.opc.get_part(pres.partname())?.rels();
        pres.entries()
            .into_iter()
            .map(|entry| -> Result<PackURI> {
                let rel = rels.get(&entry.r_id).ok_or_else(|| {
                    OoxmlError::InvalidRelationship(format!(
                        "Slide id {} refers to missing relationship {}",
                        entry.id, entry.r_id
                    ))
                })?;
                Ok(rel.target_partname()?)
            })
            .collect()
    }

    /// Number of slides in the slide list.
    pub fn slide_count(&self) -> Result<usize> {
        Ok(PresentationPart::load(&self.opc)?.entries().len())
    }

    /// The slide at `index` in presentation order.
    pub fn slide(&self, index: usize) -> Result<Slide> {
        let partnames = self.slide_partnames()?;
        let len = partnames.len();
        let partname = partnames
            .into_iter()
            .nth(index)
            .ok_or(OoxmlError::IndexOutOfRange {
                what: "slide",
                index,
                len,
            })?;
        Slide::load(self, partname)
    }

    /// All slides in presentation order.
    pub fn slides(&self) -> Result<Vec<Slide>> {
        self.slide_partnames()?
            .into_iter()
            .map(|partname| Slide::load(self, partname))
            .collect()
    }

    /// Indices of the slides whose text contains `tag`.
    pub fn find_slides(&self, tag: &str) -> Result<Vec<usize>> {
        Ok(self
            .slides()?
            .iter()
            .enumerate()
            .filter(|(_, slide)| slide.text().contains(tag))
            .map(|(index, _)| index)
            .collect())
    }

    /// Relationship id under which the presentation refers to a slide part.
    pub(crate) fn slide_r_id(&self, partname: &PackURI) -> Result<String> {
        let pres_partname = self.opc.main_document_partname()?;
        self.opc
            .get_part(&pres_partname)?
            .rels()
            .of_type(RT::SLIDE)
            .find(|rel| rel.target_partname().is_ok_and(|target| &target == partname))
            .map(|rel| rel.r_id().to_string())
            .ok_or_else(|| OoxmlError::SlideNotFound(partname.to_string()))
    }
}
