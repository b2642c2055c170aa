/// Picture shapes (`p:pic`) and their tag binding.
use crate::ooxml::xmltree::{NodePath, XmlElement};

/// A picture shape in a slide tree.
///
/// # Examples
///
/// ```rust,ignore
/// for picture in slide.pictures() {
///     println!("{:?} -> {:?}", picture.tag(), picture.embed_r_id());
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Picture<'a> {
    pic: &'a XmlElement,
}

impl<'a> Picture<'a> {
    /// View over a `p:pic` element.
    pub fn new(pic: &'a XmlElement) -> Option<Self> {
        pic.is("pic").then_some(Self { pic })
    }

    /// Shape name from `cNvPr@name`.
    pub fn name(&self) -> Option<&'a str> {
        self.c_nv_pr().and_then(|c| c.attr("name"))
    }

    /// The tag carried by the picture: its description, or its title when the
    /// description is empty.
    pub fn tag(&self) -> Option<&'a str> {
        tag_of(self.pic)
    }

    /// Relationship id of the displayed image.
    pub fn embed_r_id(&self) -> Option<&'a str> {
        self.pic
            .find_child_chain(&["blipFill", "blip"])
            .and_then(|blip| blip.attr("r:embed"))
    }

    fn c_nv_pr(&self) -> Option<&'a XmlElement> {
        self.pic.find_child_chain(&["nvPicPr", "cNvPr"])
    }
}

fn tag_of(pic: &XmlElement) -> Option<&str> {
    let c_nv_pr = pic.find_child_chain(&["nvPicPr", "cNvPr"])?;
    [c_nv_pr.attr("descr"), c_nv_pr.attr("title")]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
}

/// Paths of every picture whose tag contains `tag`.
pub(crate) fn matching_paths(root: &XmlElement, tag: &str) -> Vec<NodePath> {
    root.find_paths(|el| el.is("pic") && tag_of(el).is_some_and(|t| t.contains(tag)))
}

/// Point a picture at another image relationship. Returns `false` when the
/// picture has no `a:blip` to rewrite.
pub(crate) fn set_embed(pic: &mut XmlElement, r_id: &str) -> bool {
    match pic.find_child_chain_mut(&["blipFill", "blip"]) {
        Some(blip) => {
            blip.set_attr("r:embed", r_id);
            true
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xmltree::XmlDocument;

    fn pic(descr: &str, title: &str, r_id: &str) -> String {
        format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="2" name="Picture 1" descr="{}" title="{}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill></p:pic>"#,
            descr, title, r_id
        )
    }

    #[test]
    fn test_description_has_priority_over_title() {
        let doc = XmlDocument::parse(pic("{{logo}}", "{{other}}", "rId2").as_bytes()).unwrap();
        let picture = Picture::new(&doc.root).unwrap();
        assert_eq!(picture.tag(), Some("{{logo}}"));
        assert_eq!(picture.name(), Some("Picture 1"));
        assert_eq!(picture.embed_r_id(), Some("rId2"));

        let doc = XmlDocument::parse(pic("", "{{other}}", "rId2").as_bytes()).unwrap();
        assert_eq!(Picture::new(&doc.root).unwrap().tag(), Some("{{other}}"));
    }

    #[test]
    fn test_matching_paths_and_set_embed() {
        let xml = format!(
            r#"<p:sld xmlns:a="urn:a" xmlns:p="urn:p" xmlns:r="urn:r"><p:cSld><p:spTree>{}{}{}</p:spTree></p:cSld></p:sld>"#,
            pic("Company {{logo}} here", "", "rId2"),
            pic("", "{{logo}}", "rId3"),
            pic("{{photo}}", "{{logo}}", "rId4"),
        );
        let mut doc = XmlDocument::parse(xml.as_bytes()).unwrap();

        let paths = matching_paths(&doc.root, "{{logo}}");
        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert!(set_embed(doc.root.at_path_mut(path).unwrap(), "rId9"));
        }
        let embeds: Vec<_> = doc
            .root
            .descendants()
            .filter_map(Picture::new)
            .filter_map(|p| p.embed_r_id())
            .collect();
        assert_eq!(embeds, ["rId9", "rId9", "rId4"]);
    }
}
