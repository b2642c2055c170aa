//! In-memory template decks shared by the integration tests.
#![allow(dead_code)]

use pptx_templater::ooxml::opc::constants::content_type as ct;
use pptx_templater::ooxml::opc::constants::relationship_type as RT;
use pptx_templater::ooxml::opc::{BlobPart, OpcPackage, PackURI, Part, XmlPart};
use pptx_templater::ooxml::pptx::{Package, Slide};

pub const NAMESPACES: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

/// Smallest valid PNG header; enough for content sniffing.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x06\0\0\0";
pub const JPEG: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0\x01\x01\0\0\x01\0\x01\0\0";

/// Table frame titled `title`: a header row of `columns`, then `data_rows`
/// rows whose cells hold `{{<column>}}`.
pub fn table(title: &str, columns: &[&str], data_rows: usize) -> String {
    let mut xml = format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="10" name="Table" title="{}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1"/><a:tblGrid>"#,
        title,
        columns.len() * 1000,
        (data_rows + 1) * 370
    );
    for _ in columns {
        xml.push_str(r#"<a:gridCol w="1000"/>"#);
    }
    xml.push_str("</a:tblGrid>");
    xml.push_str(&row(columns.iter().map(|c| c.to_string())));
    for _ in 0..data_rows {
        xml.push_str(&row(columns.iter().map(|c| format!("{{{{{}}}}}", c))));
    }
    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    xml
}

fn row(texts: impl Iterator<Item = String>) -> String {
    let mut xml = String::from(r#"<a:tr h="370">"#);
    for text in texts {
        xml.push_str(&format!(
            r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>"#,
            text
        ));
    }
    xml.push_str("</a:tr>");
    xml
}

/// Text box holding one paragraph per entry of `paragraphs`.
pub fn text_box(paragraphs: &[&str]) -> String {
    shape(r#"<p:cNvPr id="3" name="TextBox 2"/><p:cNvSpPr txBox="1"/><p:nvPr/>"#, paragraphs)
}

/// Title placeholder.
pub fn title(text: &str) -> String {
    shape(
        r#"<p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr>"#,
        &[text],
    )
}

fn shape(nv_props: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!(r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p>"#, p))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr>{}</p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
        nv_props, body
    )
}

/// Picture shape pointing at `r_id`.
pub fn picture(descr: &str, title: &str, r_id: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="5" name="Picture 4" descr="{}" title="{}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr/></p:pic>"#,
        descr, title, r_id
    )
}

/// One slide of a fixture deck.
#[derive(Default)]
pub struct SlideSpec {
    shapes: Vec<String>,
    images: Vec<(String, &'static [u8])>,
    notes: Option<String>,
    hyperlink: Option<String>,
}

impl SlideSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, xml: impl Into<String>) -> Self {
        self.shapes.push(xml.into());
        self
    }

    /// Relate a PNG or JPEG image under `r_id`.
    pub fn image(mut self, r_id: &str, bytes: &'static [u8]) -> Self {
        self.images.push((r_id.to_string(), bytes));
        self
    }

    pub fn notes(mut self, text: &str) -> Self {
        self.notes = Some(text.to_string());
        self
    }

    pub fn hyperlink(mut self, url: &str) -> Self {
        self.hyperlink = Some(url.to_string());
        self
    }
}

/// Build a deck sharing one slide layout.
pub fn deck(slides: Vec<SlideSpec>) -> Package {
    let mut opc = OpcPackage::new();
    let pres_partname = PackURI::new("/ppt/presentation.xml").unwrap();
    let layout_partname = PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap();

    opc.add_part(Box::new(XmlPart::new(
        layout_partname.clone(),
        ct::PML_SLIDE_LAYOUT.to_string(),
        format!(r#"<p:sldLayout {}><p:cSld><p:spTree/></p:cSld></p:sldLayout>"#, NAMESPACES).into_bytes(),
    )));

    let mut pres = XmlPart::new(pres_partname.clone(), ct::PML_PRESENTATION_MAIN.to_string(), Vec::new());
    let mut sld_ids = String::new();
    let mut media = 0;
    for (i, spec) in slides.into_iter().enumerate() {
        let n = i + 1;
        let partname = PackURI::new(format!("/ppt/slides/slide{}.xml", n)).unwrap();
        let mut slide = XmlPart::new(
            partname.clone(),
            ct::PML_SLIDE.to_string(),
            format!(
                r#"<p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
                NAMESPACES,
                spec.shapes.concat()
            )
            .into_bytes(),
        );
        slide.relate_to(&layout_partname, RT::SLIDE_LAYOUT);

        for (r_id, bytes) in spec.images {
            media += 1;
            let (ext, content_type) = if bytes.starts_with(b"\xff\xd8") {
                ("jpeg", "image/jpeg")
            } else {
                ("png", "image/png")
            };
            let image = PackURI::new(format!("/ppt/media/image{}.{}", media, ext)).unwrap();
            slide.rels_mut().add_relationship(
                RT::IMAGE.to_string(),
                image.relative_ref(partname.base_uri()),
                r_id,
                false,
            );
            opc.add_part(Box::new(BlobPart::new(image, content_type.to_string(), bytes.to_vec())));
        }

        if let Some(url) = spec.hyperlink {
            slide.relate_to_ext(&url, RT::HYPERLINK);
        }

        if let Some(text) = spec.notes {
            let notes_partname = PackURI::new(format!("/ppt/notesSlides/notesSlide{}.xml", n)).unwrap();
            let mut notes = XmlPart::new(
                notes_partname.clone(),
                ct::PML_NOTES_SLIDE.to_string(),
                format!(
                    r#"<p:notes {}><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Notes Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:notes>"#,
                    NAMESPACES, text
                )
                .into_bytes(),
            );
            notes.relate_to(&partname, RT::SLIDE);
            slide.relate_to(&notes_partname, RT::NOTES_SLIDE);
            opc.add_part(Box::new(notes));
        }
        opc.add_part(Box::new(slide));

        let r_id = pres.relate_to(&partname, RT::SLIDE);
        sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, r_id));
    }

    pres.set_blob(
        format!(
            r#"<p:presentation {}><p:sldMasterIdLst/><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            NAMESPACES, sld_ids
        )
        .into_bytes(),
    );
    opc.add_part(Box::new(pres));
    opc.relate_to(&pres_partname, RT::OFFICE_DOCUMENT);

    Package::from_opc(opc).unwrap()
}

/// Body cell texts of the first table on `slide`, row by row.
pub fn body_rows(slide: &Slide) -> Vec<Vec<String>> {
    let table = slide.table(0).unwrap();
    table.rows_text().into_iter().skip(1).collect()
}

/// Partnames of the slides in presentation order.
pub fn order(pkg: &Package) -> Vec<String> {
    pkg.slide_partnames()
        .unwrap()
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Numeric ids of the slide list, in order.
pub fn slide_ids(pkg: &Package) -> Vec<u32> {
    let opc = pkg.opc();
    let pres = pptx_templater::ooxml::pptx::presentation::PresentationPart::load(opc).unwrap();
    pres.entries().iter().map(|e| e.id).collect()
}

/// Whether a part exists.
pub fn has_part(pkg: &Package, partname: &str) -> bool {
    pkg.opc().contains_part(&PackURI::new(partname).unwrap())
}

/// Count of parts under `/ppt/media/`.
pub fn media_count(pkg: &Package) -> usize {
    pkg.opc()
        .iter_parts()
        .filter(|part| part.partname().as_str().starts_with("/ppt/media/"))
        .count()
}
