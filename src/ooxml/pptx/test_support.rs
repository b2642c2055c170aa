//! Small in-memory decks for unit tests.
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::constants::relationship_type as RT;
use crate::ooxml::opc::{OpcPackage, PackURI, Part, XmlPart};
use crate::ooxml::pptx::package::Package;

pub(crate) const NAMESPACES: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

/// One-column table titled `title`: a header row plus `data_rows` rows holding `{{v}}`.
pub(crate) fn table_frame(title: &str, data_rows: usize) -> String {
    let mut xml = format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="4" name="Table 3" title="{}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="0" y="0"/><a:ext cx="2000" cy="{}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr/><a:tblGrid><a:gridCol w="2000"/></a:tblGrid>"#,
        title,
        (data_rows + 1) * 100
    );
    xml.push_str(r#"<a:tr h="100"><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>Name</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc></a:tr>"#);
    for _ in 0..data_rows {
        xml.push_str(r#"<a:tr h="100"><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>{{v}}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc></a:tr>"#);
    }
    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    xml
}

/// A deck with one slide per entry of `shapes`, each holding that shape tree content.
pub(crate) fn deck(shapes: &[&str]) -> Package {
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
    for (i, content) in shapes.iter().enumerate() {
        let partname = PackURI::new(format!("/ppt/slides/slide{}.xml", i + 1)).unwrap();
        let mut slide = XmlPart::new(
            partname.clone(),
            ct::PML_SLIDE.to_string(),
            format!(r#"<p:sld {}><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#, NAMESPACES, content)
                .into_bytes(),
        );
        slide.relate_to(&layout_partname, RT::SLIDE_LAYOUT);
        opc.add_part(Box::new(slide));

        let r_id = pres.relate_to(&partname, RT::SLIDE);
        sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, r_id));
    }
    pres.set_blob(
        format!(
            r#"<p:presentation {}><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#,
            NAMESPACES, sld_ids
        )
        .into_bytes(),
    );
    opc.add_part(Box::new(pres));
    opc.relate_to(&pres_partname, RT::OFFICE_DOCUMENT);

    Package::from_opc(opc).unwrap()
}
