/// Slides: cloning, ordering, removal, and the templating operations on one slide.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as RT;
use crate::ooxml::opc::part::{Part, XmlPart};
use crate::ooxml::opc::PackURI;
use crate::ooxml::pptx::cell::Cell;
use crate::ooxml::pptx::media;
use crate::ooxml::pptx::package::Package;
use crate::ooxml::pptx::presentation::PresentationPart;
use crate::ooxml::pptx::shapes::picture::{self, Picture};
use crate::ooxml::pptx::shapes::table::{self, Table, TableInfo, TableMut};
use crate::ooxml::pptx::substitution::ParagraphSubstitution;
use crate::ooxml::pptx::tag;
use crate::ooxml::pptx::template::{Scope, TagSubstitutor};
use crate::ooxml::xmltree::{XmlDocument, XmlElement};

/// Partname template for new slide parts.
const SLIDE_TEMPLATE: &str = "/ppt/slides/slide%d.xml";

/// Placeholder types that hold a slide title.
const TITLE_PLACEHOLDERS: &[&str] = &["title", "ctrTitle"];

/// A slide: its partname and its parsed content tree.
///
/// The tree is owned by the `Slide` value. Edits made through it reach the
/// package when [`save`](Self::save) is called; the operations that take a
/// [`Package`] save on their own before returning.
///
/// # Examples
///
/// ```rust,no_run
/// use pptx_templater::ooxml::pptx::{Package, RegexSubstitution, Scope};
///
/// let mut pkg = Package::open("template.pptx")?;
/// let service = RegexSubstitution::new();
///
/// let template = pkg.slide(0)?;
/// let mut copy = template.duplicate(&mut pkg)?;
/// copy.replace_tag(&service, "{{title}}", "Copy", Scope::NoTable)?;
/// copy.save(&mut pkg)?;
/// copy.insert_after(&mut pkg, &template)?;
/// pkg.save("out.pptx")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Slide {
    partname: PackURI,
    doc: XmlDocument,
}

impl Slide {
    /// Parse the slide stored at `partname`.
    pub(crate) fn load(pkg: &Package, partname: PackURI) -> Result<Self> {
        let part = pkg
            .opc()
            .get_part(&partname)
            .map_err(|_| OoxmlError::SlideNotFound(partname.to_string()))?;
        let doc = XmlDocument::parse(part.blob())?;
        Ok(Self { partname, doc })
    }

    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Root element (`p:sld`) of the content tree.
    pub fn root(&self) -> &XmlElement {
        &self.doc.root
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.doc.root
    }

    /// Write the content tree back into the slide part.
    pub fn save(&self, pkg: &mut Package) -> Result<()> {
        pkg.opc_mut()
            .get_part_mut(&self.partname)
            .map_err(|_| OoxmlError::SlideNotFound(self.partname.to_string()))?
            .set_blob(self.doc.to_bytes());
        Ok(())
    }

    /// Create an independent copy of this slide.
    ///
    /// The copy gets a new slide part holding the current content tree and the
    /// same relationships under the same ids: the layout and other shared parts
    /// are referenced as before, every image is copied to a new media part,
    /// external targets are kept verbatim, and the notes slide is left out.
    ///
    /// The copy is related from the presentation but not yet in the slide list;
    /// place it with [`insert_after`](Self::insert_after) or [`append`](Self::append).
    pub fn duplicate(&self, pkg: &mut Package) -> Result<Slide> {
        let opc = pkg.opc_mut();
        let (content_type, rels) = {
            let source = opc
                .get_part(&self.partname)
                .map_err(|_| OoxmlError::SlideNotFound(self.partname.to_string()))?;
            let rels: Vec<_> = source.rels().iter().cloned().collect();
            (source.content_type().to_string(), rels)
        };

        let partname = opc.next_partname(SLIDE_TEMPLATE)?;
        let mut part = XmlPart::new(partname.clone(), content_type, self.doc.to_bytes());

        for rel in rels {
            if rel.reltype() == RT::NOTES_SLIDE {
                continue;
            }
            if rel.is_external() {
                part.rels_mut().add_relationship(
                    rel.reltype().to_string(),
                    rel.target_ref().to_string(),
                    rel.r_id().to_string(),
                    true,
                );
                continue;
            }

            let mut target = rel.target_partname()?;
            if rel.reltype() == RT::IMAGE {
                if opc.contains_part(&target) {
                    target = media::copy_image_part(opc, &target)?;
                } else {
                    log::warn!(
                        "Image {} referenced by {} is missing, keeping the reference",
                        target,
                        self.partname
                    );
                }
            }
            part.rels_mut().add_relationship(
                rel.reltype().to_string(),
                target.relative_ref(partname.base_uri()),
                rel.r_id().to_string(),
                false,
            );
        }
        opc.add_part(Box::new(part));

        let pres_partname = opc.main_document_partname()?;
        opc.get_part_mut(&pres_partname)?
            .relate_to(&partname, RT::SLIDE);

        log::debug!("Duplicated {} as {}", self.partname, partname);
        Ok(Slide {
            partname,
            doc: self.doc.clone(),
        })
    }

    /// Place this slide in the slide list immediately after `after`.
    ///
    /// Returns the new slide id, one above the highest id in use.
    pub fn insert_after(&self, pkg: &mut Package, after: &Slide) -> Result<u32> {
        self.insert_after_partname(pkg, Some(&after.partname))
    }

    /// Place this slide at the end of the slide list.
    pub fn append(&self, pkg: &mut Package) -> Result<u32> {
        self.insert_after_partname(pkg, None)
    }

    pub(crate) fn insert_after_partname(&self, pkg: &mut Package, after: Option<&PackURI>) -> Result<u32> {
        let r_id = pkg.slide_r_id(&self.partname)?;
        let after_r_id = after.map(|partname| pkg.slide_r_id(partname)).transpose()?;

        let mut pres = PresentationPart::load(pkg.opc())?;
        let id = pres.insert_after(after_r_id.as_deref(), &r_id)?;
        pres.save(pkg.opc_mut())?;

        log::debug!("Inserted {} as slide id {}", self.partname, id);
        Ok(id)
    }

    /// Delete this slide from the package.
    ///
    /// Removes its slide list entry (if it has one), the presentation's
    /// relationship to it and the slide part, then deletes the images and notes
    /// slide it used that nothing else references.
    pub fn remove(self, pkg: &mut Package) -> Result<()> {
        let opc = pkg.opc_mut();
        let part = opc
            .remove_part(&self.partname)
            .ok_or_else(|| OoxmlError::SlideNotFound(self.partname.to_string()))?;

        let pres_partname = opc.main_document_partname()?;
        let r_ids: Vec<String> = opc
            .get_part(&pres_partname)?
            .rels()
            .of_type(RT::SLIDE)
            .filter(|rel| rel.target_partname().is_ok_and(|target| target == self.partname))
            .map(|rel| rel.r_id().to_string())
            .collect();

        let mut pres = PresentationPart::load(opc)?;
        for r_id in &r_ids {
            pres.remove(r_id);
        }
        pres.save(opc)?;
        let pres_rels = opc.get_part_mut(&pres_partname)?.rels_mut();
        for r_id in &r_ids {
            pres_rels.remove(r_id);
        }

        for rel in part.rels().iter() {
            if rel.is_external() || (rel.reltype() != RT::IMAGE && rel.reltype() != RT::NOTES_SLIDE) {
                continue;
            }
            let Ok(target) = rel.target_partname() else {
                continue;
            };
            if opc.contains_part(&target) && !opc.is_referenced(&target, None) {
                log::debug!("Releasing {} used by {}", target, self.partname);
                opc.remove_part(&target);
            }
        }

        log::debug!("Removed {}", self.partname);
        Ok(())
    }

    /// Tables on this slide, numbered in document order.
    pub fn tables(&self) -> Vec<TableInfo> {
        table::discover(self.root())
    }

    /// Tables whose title contains `tag`.
    pub fn find_tables(&self, tag: &str) -> Vec<TableInfo> {
        self.tables()
            .into_iter()
            .filter(|info| info.title.contains(tag))
            .collect()
    }

    /// Read-only view of table `tbl_id`.
    pub fn table(&self, tbl_id: usize) -> Result<Table<'_>> {
        let path = table::frame_path(self.root(), tbl_id)?;
        self.root()
            .at_path(&path)
            .and_then(Table::new)
            .ok_or_else(|| OoxmlError::TableNotFound(tbl_id.to_string()))
    }

    /// Mutable view of table `tbl_id`.
    pub fn table_mut(&mut self, tbl_id: usize) -> Result<TableMut<'_>> {
        let path = table::frame_path(self.root(), tbl_id)?;
        self.doc
            .root
            .at_path_mut(&path)
            .and_then(TableMut::new)
            .ok_or_else(|| OoxmlError::TableNotFound(tbl_id.to_string()))
    }

    /// Remove the graphic frame of table `tbl_id`.
    ///
    /// Tables after it are renumbered.
    pub fn remove_table(&mut self, tbl_id: usize) -> Result<()> {
        let path = table::frame_path(self.root(), tbl_id)?;
        self.doc.root.remove_at_path(&path);
        Ok(())
    }

    /// Substitute `tag` in the slide's paragraphs. Call [`save`](Self::save) to persist.
    pub fn replace_tag(
        &mut self,
        service: &dyn ParagraphSubstitution,
        tag: &str,
        new_text: &str,
        scope: Scope,
    ) -> Result<bool> {
        TagSubstitutor::new(service).replace_paragraphs(&mut self.doc.root, tag, new_text, scope)
    }

    /// Apply one cell descriptor to every cell of table `tbl_id` and save.
    pub fn replace_table_tag(
        &mut self,
        service: &dyn ParagraphSubstitution,
        pkg: &mut Package,
        tbl_id: usize,
        cell: &Cell,
    ) -> Result<bool> {
        let substitutor = TagSubstitutor::new(service);
        let partname = self.partname.clone();
        let mut matched = false;
        {
            let mut table = self.table_mut(tbl_id)?;
            for tc in table.cells_mut() {
                matched |= substitutor.replace_cell_tag(pkg.opc_mut(), &partname, tc, cell)?;
            }
        }
        self.save(pkg)?;
        Ok(matched)
    }

    /// Point every picture tagged with `tag` at a new image and save.
    ///
    /// Pictures match when their description, or their title if the description
    /// is empty, contains `tag`. The image is embedded once, and only if some
    /// picture matches; an empty tag or missing image is a no-op. Image
    /// relationships left unused are dropped. Returns the number of pictures
    /// rewritten.
    pub fn replace_picture(
        &mut self,
        pkg: &mut Package,
        tag: &str,
        image: Option<&[u8]>,
        content_type: &str,
    ) -> Result<usize> {
        let Some(image) = image else {
            return Ok(0);
        };
        if tag.is_empty() {
            return Ok(0);
        }
        let paths = picture::matching_paths(self.root(), tag);
        if paths.is_empty() {
            return Ok(0);
        }

        let r_id = media::embed_image(pkg.opc_mut(), &self.partname, image, content_type)?;
        let mut previous = Vec::new();
        let mut count = 0;
        for path in &paths {
            let Some(pic) = self.doc.root.at_path_mut(path) else {
                continue;
            };
            if let Some(old) = Picture::new(pic).and_then(|p| p.embed_r_id()) {
                previous.push(old.to_string());
            }
            if picture::set_embed(pic, &r_id) {
                count += 1;
            }
        }
        self.save(pkg)?;
        self.release_unused_images(pkg, &previous)?;

        log::debug!("Replaced {} picture(s) tagged '{}' on {}", count, tag, self.partname);
        Ok(count)
    }

    /// Drop image relationships no longer referenced from the saved content,
    /// and their parts when nothing else uses them.
    fn release_unused_images(&self, pkg: &mut Package, r_ids: &[String]) -> Result<()> {
        let opc = pkg.opc_mut();
        for r_id in r_ids {
            let part = opc.get_part_mut(&self.partname)?;
            let is_image = part.rels().get(r_id).is_some_and(|rel| rel.reltype() == RT::IMAGE);
            if !is_image || part.rel_ref_count(r_id) > 0 {
                continue;
            }
            let Some(rel) = part.rels_mut().remove(r_id) else {
                continue;
            };
            if let Ok(target) = rel.target_partname() {
                if !opc.is_referenced(&target, None) {
                    opc.remove_part(&target);
                }
            }
        }
        Ok(())
    }

    /// Picture shapes on this slide.
    pub fn pictures(&self) -> Vec<Picture<'_>> {
        self.root().descendants().filter_map(Picture::new).collect()
    }

    /// Text of every paragraph, one per line.
    pub fn text(&self) -> String {
        paragraphs_text(self.root())
    }

    /// Text of the title placeholder, if the slide has one.
    pub fn title(&self) -> Option<String> {
        self.root()
            .descendants()
            .filter(|el| el.is("sp"))
            .find(|sp| {
                sp.find_child_chain(&["nvSpPr", "nvPr", "ph"])
                    .and_then(|ph| ph.attr("type"))
                    .is_some_and(|ty| TITLE_PLACEHOLDERS.contains(&ty))
            })
            .and_then(|sp| sp.child("txBody"))
            .map(paragraphs_text)
    }

    /// Distinct tags appearing in the slide text.
    pub fn tags(&self) -> Vec<String> {
        tag::find_tags(&self.text())
    }

    /// Speaker notes: the text of the notes slide's body placeholder.
    pub fn notes(&self, pkg: &Package) -> Result<Option<String>> {
        let opc = pkg.opc();
        let part = opc.get_part(&self.partname)?;
        let Some(rel) = part.rels().of_type(RT::NOTES_SLIDE).next() else {
            return Ok(None);
        };
        let notes_partname = rel.target_partname()?;
        let Ok(notes_part) = opc.get_part(&notes_partname) else {
            return Ok(None);
        };

        let doc = XmlDocument::parse(notes_part.blob())?;
        let text = doc
            .root
            .descendants()
            .filter(|el| el.is("sp"))
            .filter(|sp| {
                sp.find_child_chain(&["nvSpPr", "nvPr", "ph"])
                    .and_then(|ph| ph.attr("type"))
                    == Some("body")
            })
            .filter_map(|sp| sp.child("txBody"))
            .map(paragraphs_text)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

/// Text of the `a:p` paragraphs under `root`, one per line.
pub(crate) fn paragraphs_text(root: &XmlElement) -> String {
    root.descendants()
        .filter(|el| el.is("p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Concatenated `a:t` text of one paragraph, fields included.
pub(crate) fn paragraph_text(p: &XmlElement) -> String {
    p.descendants()
        .filter(|el| el.is("t"))
        .map(|t| t.text())
        .collect()
}
