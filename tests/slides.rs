mod common;

use common::{
    JPEG, PNG, SlideSpec, deck, has_part, media_count, order, picture, slide_ids, table, text_box, title,
};
use pptx_templater::ooxml::opc::constants::relationship_type as RT;
use pptx_templater::ooxml::opc::{OpcPackage, PackURI, Part, XmlPart};
use pptx_templater::ooxml::pptx::{Cell, Package, RegexSubstitution, Scope};
use pptx_templater::ooxml::OoxmlError;

/// A decorated template slide followed by a plain one.
fn decorated() -> Package {
    deck(vec![
        SlideSpec::new()
            .shape(title("Hello {{name}}"))
            .shape(picture("{{logo}}", "", "rId2"))
            .image("rId2", PNG)
            .hyperlink("https://example.com/")
            .notes("Speaker notes"),
        SlideSpec::new().shape(text_box(&["Second"])),
    ])
}

#[test]
fn test_duplicate_is_independent() {
    let mut pkg = decorated();
    let service = RegexSubstitution::new();
    let template = pkg.slide(0).unwrap();

    let mut copy = template.duplicate(&mut pkg).unwrap();
    assert_eq!(copy.partname().as_str(), "/ppt/slides/slide3.xml");
    // related but not listed until inserted
    assert_eq!(pkg.slide_count().unwrap(), 2);

    let id = copy.insert_after(&mut pkg, &template).unwrap();
    assert_eq!(id, 258);
    assert_eq!(
        order(&pkg),
        ["/ppt/slides/slide1.xml", "/ppt/slides/slide3.xml", "/ppt/slides/slide2.xml"]
    );
    assert_eq!(slide_ids(&pkg), [256, 258, 257]);

    assert!(copy.replace_tag(&service, "{{name}}", "copy", Scope::NoTable).unwrap());
    copy.save(&mut pkg).unwrap();
    assert_eq!(pkg.slide(0).unwrap().title().as_deref(), Some("Hello {{name}}"));
    assert_eq!(pkg.slide(1).unwrap().title().as_deref(), Some("Hello copy"));
}

#[test]
fn test_duplicate_relationships() {
    let mut pkg = decorated();
    let template = pkg.slide(0).unwrap();
    let copy = template.duplicate(&mut pkg).unwrap();

    let part = pkg.opc().get_part(copy.partname()).unwrap();
    let rels = part.rels();
    let layout = rels.of_type(RT::SLIDE_LAYOUT).next().unwrap();
    assert_eq!(layout.target_ref(), "../slideLayouts/slideLayout1.xml");

    // same id, fresh image part with the same bytes
    let image = rels.get("rId2").unwrap();
    assert_eq!(image.reltype(), RT::IMAGE);
    let image_partname = image.target_partname().unwrap();
    assert_ne!(image_partname.as_str(), "/ppt/media/image1.png");
    assert_eq!(pkg.opc().get_part(&image_partname).unwrap().blob(), PNG);
    assert_eq!(media_count(&pkg), 2);

    let link = rels.of_type(RT::HYPERLINK).next().unwrap();
    assert!(link.is_external());
    assert_eq!(link.target_ref(), "https://example.com/");

    assert_eq!(rels.of_type(RT::NOTES_SLIDE).count(), 0);
    assert_eq!(template.notes(&pkg).unwrap().as_deref(), Some("Speaker notes"));
    assert_eq!(copy.notes(&pkg).unwrap(), None);
}

#[test]
fn test_append() {
    let mut pkg = decorated();
    let second = pkg.slide(1).unwrap();
    let copy = second.duplicate(&mut pkg).unwrap();
    copy.append(&mut pkg).unwrap();

    assert_eq!(order(&pkg).last().map(String::as_str), Some(copy.partname().as_str()));
    assert_eq!(slide_ids(&pkg), [256, 257, 258]);
    assert_eq!(pkg.slide(2).unwrap().text(), "Second");
}

#[test]
fn test_remove_releases_parts() {
    let mut pkg = decorated();
    let template = pkg.slide(0).unwrap();
    let copy = template.duplicate(&mut pkg).unwrap();
    copy.insert_after(&mut pkg, &template).unwrap();
    assert_eq!(media_count(&pkg), 2);

    let copy_partname = copy.partname().clone();
    copy.remove(&mut pkg).unwrap();
    assert!(!pkg.opc().contains_part(&copy_partname));
    assert_eq!(pkg.slide_count().unwrap(), 2);
    assert_eq!(media_count(&pkg), 1);
    assert!(has_part(&pkg, "/ppt/media/image1.png"));

    let pres = pkg.opc().main_document_part().unwrap();
    assert_eq!(pres.rels().of_type(RT::SLIDE).count(), 2);

    template.remove(&mut pkg).unwrap();
    assert_eq!(order(&pkg), ["/ppt/slides/slide2.xml"]);
    assert_eq!(media_count(&pkg), 0);
    assert!(!has_part(&pkg, "/ppt/notesSlides/notesSlide1.xml"));
    assert!(has_part(&pkg, "/ppt/slideLayouts/slideLayout1.xml"));
}

#[test]
fn test_remove_missing_slide() {
    let mut pkg = decorated();
    let slide = pkg.slide(1).unwrap();
    let stale = slide.clone();
    slide.remove(&mut pkg).unwrap();

    let err = stale.remove(&mut pkg).unwrap_err();
    assert!(matches!(err, OoxmlError::SlideNotFound(_)));
}

#[test]
fn test_slide_index_out_of_range() {
    let pkg = decorated();
    let err = pkg.slide(5).unwrap_err();
    assert!(matches!(
        err,
        OoxmlError::IndexOutOfRange {
            what: "slide",
            index: 5,
            len: 2
        }
    ));
}

#[test]
fn test_read_conveniences() {
    let pkg = deck(vec![
        SlideSpec::new()
            .shape(title("Quarterly {{year}}"))
            .shape(text_box(&["Dear {{name}},", "see {{year}}"])),
        SlideSpec::new().shape(text_box(&["nothing"])),
    ]);
    let slide = pkg.slide(0).unwrap();

    assert_eq!(slide.title().as_deref(), Some("Quarterly {{year}}"));
    assert_eq!(slide.text(), "Quarterly {{year}}\nDear {{name}},\nsee {{year}}");
    assert_eq!(slide.tags(), ["{{year}}", "{{name}}"]);
    assert_eq!(pkg.slide(1).unwrap().title(), None);
    assert_eq!(pkg.find_slides("{{name}}").unwrap(), [0]);
    assert!(pkg.find_slides("{{missing}}").unwrap().is_empty());
}

#[test]
fn test_replace_tag_scope() {
    let pkg_with_scope = |scope: Scope| {
        let mut pkg = deck(vec![
            SlideSpec::new()
                .shape(text_box(&["Value {{x}}"]))
                .shape(table("T", &["x"], 1)),
        ]);
        let service = RegexSubstitution::new();
        let mut slide = pkg.slide(0).unwrap();
        assert!(slide.replace_tag(&service, "{{x}}", "42", scope).unwrap());
        slide.save(&mut pkg).unwrap();
        pkg.slide(0).unwrap()
    };

    let slide = pkg_with_scope(Scope::NoTable);
    assert!(slide.text().starts_with("Value 42"));
    assert_eq!(slide.table(0).unwrap().cell_text(1, 0).unwrap(), "{{x}}");

    let slide = pkg_with_scope(Scope::Global);
    assert_eq!(slide.table(0).unwrap().cell_text(1, 0).unwrap(), "42");
}

#[test]
fn test_replace_table_tag() {
    let mut pkg = deck(vec![SlideSpec::new().shape(table("T", &["a", "b"], 2))]);
    let service = RegexSubstitution::new();
    let mut slide = pkg.slide(0).unwrap();

    assert!(slide
        .replace_table_tag(&service, &mut pkg, 0, &Cell::new("{{b}}", "B").with_bold(true))
        .unwrap());
    assert!(!slide.replace_table_tag(&service, &mut pkg, 0, &Cell::new("{{c}}", "C")).unwrap());
    assert!(!slide.replace_table_tag(&service, &mut pkg, 0, &Cell::new("", "C")).unwrap());

    let reloaded = pkg.slide(0).unwrap();
    let rows = reloaded.table(0).unwrap().rows_text();
    assert_eq!(rows, [["a", "b"], ["{{a}}", "B"], ["{{a}}", "B"]]);

    let err = slide.replace_table_tag(&service, &mut pkg, 3, &Cell::new("{{a}}", "A")).unwrap_err();
    assert!(matches!(err, OoxmlError::IndexOutOfRange { what: "table", .. }));
}

#[test]
fn test_tables_and_remove_table() {
    let mut pkg = deck(vec![
        SlideSpec::new()
            .shape(table("SalesTable_Q1", &["a"], 1))
            .shape(table("Costs", &["a"], 1))
            .shape(table("SalesTable_Q2", &["a"], 1)),
    ]);
    let mut slide = pkg.slide(0).unwrap();

    let found: Vec<usize> = slide.find_tables("SalesTable").iter().map(|t| t.tbl_id).collect();
    assert_eq!(found, [0, 2]);
    let q1: Vec<usize> = slide.find_tables("Q1").iter().map(|t| t.tbl_id).collect();
    assert_eq!(q1, [0]);
    assert!(slide.find_tables("Nope").is_empty());

    // ids are positions, so the tables after a removed one move down
    slide.remove_table(0).unwrap();
    slide.save(&mut pkg).unwrap();
    let tables: Vec<(usize, String)> = pkg
        .slide(0)
        .unwrap()
        .tables()
        .into_iter()
        .map(|t| (t.tbl_id, t.title))
        .collect();
    assert_eq!(tables, [(0, "Costs".to_string()), (1, "SalesTable_Q2".to_string())]);

    slide.remove_table(1).unwrap();
    let titles: Vec<String> = slide.tables().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, ["Costs"]);
    assert!(slide.remove_table(1).is_err());
}

#[test]
fn test_replace_picture() {
    let mut pkg = deck(vec![
        SlideSpec::new()
            .shape(picture("{{logo}}", "", "rId2"))
            .shape(picture("", "{{logo}} alt", "rId3"))
            .shape(picture("other", "{{logo}}", "rId4"))
            .image("rId2", PNG)
            .image("rId3", PNG)
            .image("rId4", PNG),
    ]);
    let mut slide = pkg.slide(0).unwrap();

    assert_eq!(slide.replace_picture(&mut pkg, "{{logo}}", None, "image/png").unwrap(), 0);
    assert_eq!(slide.replace_picture(&mut pkg, "", Some(JPEG), "image/jpeg").unwrap(), 0);
    assert_eq!(slide.replace_picture(&mut pkg, "{{none}}", Some(JPEG), "image/jpeg").unwrap(), 0);
    assert_eq!(media_count(&pkg), 3);

    let count = slide
        .replace_picture(&mut pkg, "{{logo}}", Some(JPEG), "image/jpeg")
        .unwrap();
    assert_eq!(count, 2);

    let reloaded = pkg.slide(0).unwrap();
    let embeds: Vec<&str> = reloaded.pictures().iter().filter_map(|p| p.embed_r_id()).collect();
    assert_eq!(embeds[0], embeds[1]);
    assert_eq!(embeds[2], "rId4");

    let part = pkg.opc().get_part(reloaded.partname()).unwrap();
    assert_eq!(part.target_ref(embeds[0]).unwrap(), "../media/image1.jpeg");
    assert!(part.rels().get("rId2").is_none());
    assert!(part.rels().get("rId3").is_none());

    // the two replaced images are released
    assert_eq!(media_count(&pkg), 2);
    assert!(has_part(&pkg, "/ppt/media/image3.png"));
    assert_eq!(
        pkg.opc().get_part(&PackURI::new("/ppt/media/image1.jpeg").unwrap()).unwrap().content_type(),
        "image/jpeg"
    );
}

#[test]
fn test_unknown_content_type_is_sniffed() {
    let mut pkg = deck(vec![SlideSpec::new().shape(picture("{{p}}", "", "rId2")).image("rId2", PNG)]);
    let mut slide = pkg.slide(0).unwrap();

    assert_eq!(slide.replace_picture(&mut pkg, "{{p}}", Some(JPEG), "application/x-unknown").unwrap(), 1);
    assert!(has_part(&pkg, "/ppt/media/image1.jpeg"));
}

#[test]
fn test_round_trip_through_bytes_and_file() {
    let mut pkg = decorated();
    let service = RegexSubstitution::new();
    let template = pkg.slide(0).unwrap();
    let mut copy = template.duplicate(&mut pkg).unwrap();
    copy.replace_tag(&service, "{{name}}", "World", Scope::Global).unwrap();
    copy.save(&mut pkg).unwrap();
    copy.append(&mut pkg).unwrap();

    let bytes = pkg.to_bytes().unwrap();
    let reopened = Package::from_bytes(&bytes).unwrap();
    assert_eq!(order(&reopened), order(&pkg));
    assert_eq!(reopened.slide(2).unwrap().title().as_deref(), Some("Hello World"));
    assert_eq!(media_count(&reopened), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pptx");
    reopened.save(&path).unwrap();
    let from_disk = Package::open(&path).unwrap();
    assert_eq!(from_disk.slide_count().unwrap(), 3);
    assert_eq!(from_disk.slide(0).unwrap().notes(&from_disk).unwrap().as_deref(), Some("Speaker notes"));
    from_disk.close();
}

#[test]
fn test_rejects_non_presentation() {
    let mut opc = OpcPackage::new();
    let partname = PackURI::new("/word/document.xml").unwrap();
    opc.add_part(Box::new(XmlPart::new(
        partname.clone(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml".to_string(),
        b"<w:document xmlns:w=\"urn:w\"/>".to_vec(),
    )));
    opc.relate_to(&partname, RT::OFFICE_DOCUMENT);

    let err = Package::from_opc(opc).err().unwrap();
    assert!(matches!(err, OoxmlError::InvalidContentType { .. }));

    assert!(Package::from_opc(OpcPackage::new()).is_err());
    assert!(Package::from_bytes(b"not a zip").is_err());
}
