//! Tag substitution inside slide trees.
//!
//! [`TagSubstitutor`] drives a [`ParagraphSubstitution`] over the paragraphs of
//! a table cell or a whole slide and applies the side effects the service does
//! not own: run formatting and picture fills of table cells.
use crate::ooxml::error::Result;
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::cell::{BackgroundPicture, Cell};
use crate::ooxml::pptx::media;
use crate::ooxml::pptx::substitution::ParagraphSubstitution;
use crate::ooxml::xmltree::{XmlElement, XmlNode};

/// Which paragraphs of a slide a slide-level substitution touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Every paragraph, table cells included.
    Global,
    /// Only paragraphs outside tables; table tags are left to table filling.
    #[default]
    NoTable,
}

/// Fill elements a `a:tcPr` may carry; at most one is allowed.
const CELL_FILLS: &[&str] = &["noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill"];

/// Children of `a:tcPr` that must follow the fill.
const AFTER_CELL_FILL: &[&str] = &["headers", "extLst"];

/// Children of `a:tc` that must follow `a:tcPr`.
const AFTER_TC_PR: &[&str] = &["extLst"];

/// Applies tag substitutions through an injected paragraph service.
pub struct TagSubstitutor<'s> {
    service: &'s dyn ParagraphSubstitution,
}

impl<'s> TagSubstitutor<'s> {
    pub fn new(service: &'s dyn ParagraphSubstitution) -> Self {
        Self { service }
    }

    /// Substitute `cell` into one table cell (`a:tc`).
    ///
    /// Every paragraph the tag matches gets the cell's bold, italic and
    /// strikethrough flags forced onto all of its runs, clearing them when the
    /// flag is `false`. Underline is not applied. When anything matched and the
    /// descriptor carries a non-empty background picture, the picture is
    /// embedded into `slide_partname` and replaces the cell's fill.
    ///
    /// Returns whether any paragraph matched.
    pub fn replace_cell_tag(
        &self,
        opc: &mut OpcPackage,
        slide_partname: &PackURI,
        tc: &mut XmlElement,
        cell: &Cell,
    ) -> Result<bool> {
        if cell.tag.is_empty() {
            return Ok(false);
        }
        let mut matched = false;
        for path in tc.find_paths(|el| el.is("p")) {
            let Some(paragraph) = tc.at_path_mut(&path) else {
                continue;
            };
            if self.service.replace_tag(paragraph, &cell.tag, &cell.new_text)? {
                apply_run_formatting(paragraph, cell);
                matched = true;
            }
        }

        if let Some(picture) = cell.background_picture.as_ref().filter(|p| !p.is_empty()) {
            if matched {
                let r_id = media::embed_image(opc, slide_partname, &picture.content, &picture.content_type)?;
                set_picture_fill(tc, &r_id, picture);
            }
        }
        Ok(matched)
    }

    /// Substitute `tag` in the paragraphs of a slide tree selected by `scope`.
    pub fn replace_paragraphs(
        &self,
        root: &mut XmlElement,
        tag: &str,
        new_text: &str,
        scope: Scope,
    ) -> Result<bool> {
        if tag.is_empty() {
            return Ok(false);
        }
        let mut matched = false;
        for path in root.find_paths(|el| el.is("p")) {
            if scope == Scope::NoTable && root.has_ancestor(&path, "tbl") {
                continue;
            }
            if let Some(paragraph) = root.at_path_mut(&path) {
                matched |= self.service.replace_tag(paragraph, tag, new_text)?;
            }
        }
        Ok(matched)
    }

    /// Text of every paragraph in a slide tree, one per line.
    pub fn text(&self, root: &XmlElement) -> String {
        root.descendants()
            .filter(|el| el.is("p"))
            .map(|p| self.service.text(p))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Force the cell's formatting flags onto every run of a paragraph.
fn apply_run_formatting(paragraph: &mut XmlElement, cell: &Cell) {
    for run in paragraph.elements_mut().filter(|el| el.is("r")) {
        if run.child("rPr").is_none() {
            run.insert_child(0, XmlElement::new("a:rPr"));
        }
        if let Some(r_pr) = run.child_mut("rPr") {
            r_pr.set_attr("b", flag(cell.bold));
            r_pr.set_attr("i", flag(cell.italic));
            r_pr.set_attr("strike", if cell.strikethrough { "sngStrike" } else { "noStrike" });
        }
    }
}

/// Index of the first child named in `names`, or the end of the child list.
fn insertion_point(parent: &XmlElement, names: &[&str]) -> usize {
    parent
        .children()
        .iter()
        .position(|node| matches!(node, XmlNode::Element(el) if names.iter().any(|n| el.is(n))))
        .unwrap_or(parent.children().len())
}

/// Replace the fill of a table cell with a stretched picture.
fn set_picture_fill(tc: &mut XmlElement, r_id: &str, picture: &BackgroundPicture) {
    if tc.child("tcPr").is_none() {
        let index = insertion_point(tc, AFTER_TC_PR);
        tc.insert_child(index, XmlElement::new("a:tcPr"));
    }
    let Some(tc_pr) = tc.child_mut("tcPr") else {
        return;
    };
    tc_pr.remove_children_where(|el| CELL_FILLS.iter().any(|name| el.is(name)));

    let mut buf = itoa::Buffer::new();
    let mut fill_rect = XmlElement::new("a:fillRect");
    for (key, value) in [
        ("l", picture.left),
        ("t", picture.top),
        ("r", picture.right),
        ("b", picture.bottom),
    ] {
        fill_rect.set_attr(key, buf.format(value));
    }
    let blip_fill = XmlElement::new("a:blipFill")
        .with_attr("dpi", "0")
        .with_attr("rotWithShape", "1")
        .with_child(XmlElement::new("a:blip").with_attr("r:embed", r_id))
        .with_child(XmlElement::new("a:srcRect"))
        .with_child(XmlElement::new("a:stretch").with_child(fill_rect));

    let index = insertion_point(tc_pr, AFTER_CELL_FILL);
    tc_pr.insert_child(index, blip_fill);
}
