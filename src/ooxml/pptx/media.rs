//! Image parts embedded in slides.
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::relationship_type as RT;
use crate::ooxml::opc::part::BlobPart;
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::format::ImageFormat;

/// Partname template for new media parts; `%d` is replaced by the first free index.
const MEDIA_TEMPLATE: &str = "/ppt/media/image%d.";

/// Store `blob` as a new image part and relate `slide_partname` to it.
///
/// Returns the relationship id to put into `r:embed`. Every call creates a new
/// part; identical images are not shared.
pub fn embed_image(
    opc: &mut OpcPackage,
    slide_partname: &PackURI,
    blob: &[u8],
    content_type: &str,
) -> Result<String> {
    let format = ImageFormat::resolve(content_type, blob);
    let partname = opc.next_partname(&format!("{}{}", MEDIA_TEMPLATE, format.extension()))?;
    log::debug!("Embedding {} bytes as {}", blob.len(), partname);

    opc.add_part(Box::new(BlobPart::new(
        partname.clone(),
        format.mime_type().to_string(),
        blob.to_vec(),
    )));
    let slide = opc.get_part_mut(slide_partname)?;
    Ok(slide.relate_to(&partname, RT::IMAGE))
}

/// Copy an image part to a fresh partname with the same extension and content type.
pub fn copy_image_part(opc: &mut OpcPackage, source: &PackURI) -> Result<PackURI> {
    let (content_type, blob) = {
        let part = opc.get_part(source)?;
        (part.content_type().to_string(), part.blob().to_vec())
    };
    let partname = opc.next_partname(&format!("{}{}", MEDIA_TEMPLATE, source.ext()))?;
    opc.add_part(Box::new(BlobPart::new(partname.clone(), content_type, blob)));
    Ok(partname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as CT;
    use crate::ooxml::opc::part::XmlPart;

    fn package_with_slide() -> (OpcPackage, PackURI) {
        let mut opc = OpcPackage::new();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        opc.add_part(Box::new(XmlPart::new(
            slide.clone(),
            CT::PML_SLIDE.to_string(),
            b"<p:sld/>".to_vec(),
        )));
        (opc, slide)
    }

    #[test]
    fn test_embed_image_creates_part_and_relationship() {
        let (mut opc, slide) = package_with_slide();
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A];

        let r_id = embed_image(&mut opc, &slide, &png, CT::PNG).unwrap();
        let r_id2 = embed_image(&mut opc, &slide, &png, CT::PNG).unwrap();
        assert_ne!(r_id, r_id2);

        let part = opc.get_part(&slide).unwrap();
        assert_eq!(part.target_ref(&r_id).unwrap(), "../media/image1.png");
        assert_eq!(part.target_ref(&r_id2).unwrap(), "../media/image2.png");

        let image = opc.get_part(&PackURI::new("/ppt/media/image1.png").unwrap()).unwrap();
        assert_eq!(image.content_type(), CT::PNG);
        assert_eq!(image.blob(), &png);
    }

    #[test]
    fn test_copy_image_part() {
        let (mut opc, slide) = package_with_slide();
        embed_image(&mut opc, &slide, &[0xFF, 0xD8, 0xFF, 0xE0], CT::JPEG).unwrap();
        let source = PackURI::new("/ppt/media/image1.jpeg").unwrap();

        let copy = copy_image_part(&mut opc, &source).unwrap();
        assert_eq!(copy.as_str(), "/ppt/media/image2.jpeg");
        assert_eq!(opc.get_part(&copy).unwrap().content_type(), CT::JPEG);
    }
}
