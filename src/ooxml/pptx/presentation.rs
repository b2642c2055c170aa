//! The slide sequence held in `/ppt/presentation.xml`.
//!
//! Visual order is the order of `p:sldId` entries inside `p:sldIdLst`. The
//! numeric `id` attribute carries no ordering meaning; new ids are always one
//! above the highest id present.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::xmltree::{XmlDocument, XmlElement, XmlNode};

/// Smallest slide id PowerPoint accepts.
pub const MIN_SLIDE_ID: u32 = 256;

/// Largest slide id PowerPoint accepts.
pub const MAX_SLIDE_ID: u32 = 2_147_483_647;

/// Elements that precede `p:sldIdLst` in a presentation part.
const SLD_ID_LST_PREDECESSORS: &[&str] = &["sldMasterIdLst", "notesMasterIdLst", "handoutMasterIdLst"];

/// One `p:sldId` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideEntry {
    pub id: u32,
    pub r_id: String,
}

/// Parsed presentation part, edited in place and written back with [`save`](Self::save).
pub struct PresentationPart {
    partname: PackURI,
    doc: XmlDocument,
}

impl PresentationPart {
    /// Parse the main document part of the package.
    pub fn load(opc: &OpcPackage) -> Result<Self> {
        let partname = opc.main_document_partname()?;
        let doc = XmlDocument::parse(opc.get_part(&partname)?.blob())?;
        Ok(Self { partname, doc })
    }

    /// Partname of the presentation part.
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Serialize the tree back into the part.
    pub fn save(&self, opc: &mut OpcPackage) -> Result<()> {
        opc.get_part_mut(&self.partname)?.set_blob(self.doc.to_bytes());
        Ok(())
    }

    /// Slide entries in visual order.
    pub fn entries(&self) -> Vec<SlideEntry> {
        let Some(list) = self.doc.root.child("sldIdLst") else {
            return Vec::new();
        };
        list.children_named("sldId")
            .filter_map(|el| {
                let id = atoi_simd::parse::<u32, false, false>(el.attr("id")?.as_bytes()).ok()?;
                let r_id = el.attr("r:id")?.to_string();
                Some(SlideEntry { id, r_id })
            })
            .collect()
    }

    /// Position of the entry referring to `r_id`.
    pub fn position(&self, r_id: &str) -> Option<usize> {
        self.entries().iter().position(|entry| entry.r_id == r_id)
    }

    /// Next free slide id.
    fn next_id(&self) -> Result<u32> {
        let Some(highest) = self.entries().iter().map(|entry| entry.id).max() else {
            return Ok(MIN_SLIDE_ID);
        };
        highest
            .checked_add(1)
            .filter(|id| *id <= MAX_SLIDE_ID)
            .map(|id| id.max(MIN_SLIDE_ID))
            .ok_or_else(|| OoxmlError::InvalidFormat(format!("No slide id left above {}", highest)))
    }

    /// Insert an entry for `r_id` immediately after the entry for `after_r_id`,
    /// or at the end when `after_r_id` is `None`. Returns the assigned id.
    pub fn insert_after(&mut self, after_r_id: Option<&str>, r_id: &str) -> Result<u32> {
        if self.position(r_id).is_some() {
            return Err(OoxmlError::InvalidRelationship(format!(
                "Slide relationship {} is already in the slide list",
                r_id
            )));
        }
        let id = self.next_id()?;
        let list = self.sld_id_lst_mut()?;

        let index = match after_r_id {
            Some(after) => {
                let node_index = list
                    .children()
                    .iter()
                    .position(|node| match node {
                        XmlNode::Element(el) => {
                            el.is("sldId") && el.attr("r:id") == Some(after)
                        },
                        _ => false,
                    })
                    .ok_or_else(|| OoxmlError::SlideNotFound(format!("No slide entry for {}", after)))?;
                node_index + 1
            },
            None => list.children().len(),
        };

        let mut buf = itoa::Buffer::new();
        list.insert_child(
            index,
            XmlElement::new("p:sldId")
                .with_attr("id", buf.format(id))
                .with_attr("r:id", r_id),
        );
        Ok(id)
    }

    /// Remove the entry for `r_id`; returns whether one was present.
    pub fn remove(&mut self, r_id: &str) -> bool {
        match self.doc.root.child_mut("sldIdLst") {
            Some(list) => list.remove_children_where(|el| el.is("sldId") && el.attr("r:id") == Some(r_id)) > 0,
            None => false,
        }
    }

    /// The `p:sldIdLst` element, created in schema position when absent.
    fn sld_id_lst_mut(&mut self) -> Result<&mut XmlElement> {
        let root = &mut self.doc.root;
        let index = match root.child_index("sldIdLst", 0) {
            Some(index) => index,
            None => {
                let index = root
                    .children()
                    .iter()
                    .rposition(|node| match node {
                        XmlNode::Element(el) => SLD_ID_LST_PREDECESSORS.iter().any(|name| el.is(name)),
                        _ => false,
                    })
                    .map_or(0, |i| i + 1);
                root.insert_child(index, XmlElement::new("p:sldIdLst"));
                index
            },
        };
        root.at_path_mut(&[index])
            .ok_or_else(|| OoxmlError::Xml("p:sldIdLst is not an element".to_string()))
    }
}
