//! Low-level, read-only API to a serialized OPC package.
//!
//! Resolves content types and walks the relationship graph from the package
//! relationships, producing every reachable part with its parsed relationships.

use crate::common::xml::unescape_xml;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::rel::Relationships;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet, VecDeque};

/// A part as read from the physical package.
#[derive(Debug)]
pub struct SerializedPart {
    pub partname: PackURI,
    pub content_type: String,
    /// Type of the first relationship found pointing at this part
    pub reltype: String,
    pub blob: Vec<u8>,
    pub rels: Relationships,
}

/// Default and override content types from `[Content_Types].xml`.
pub(crate) struct ContentTypeMap {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    pub(crate) fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self {
            defaults: HashMap::new(),
            overrides: HashMap::new(),
        };
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let is_default = match e.local_name().as_ref() {
                        b"Default" => Some(true),
                        b"Override" => Some(false),
                        _ => None,
                    };

                    if let Some(is_default) = is_default {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = unescape_xml(std::str::from_utf8(&attr.value)?);
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => key = Some(value),
                                b"ContentType" => content_type = Some(value),
                                _ => {},
                            }
                        }

                        if let (Some(key), Some(ct)) = (key, content_type) {
                            let key = key.to_ascii_lowercase();
                            if is_default {
                                map.defaults.insert(key, ct);
                            } else {
                                map.overrides.insert(key, ct);
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Content type of a part: override first, then the extension default.
    /// Part names compare case-insensitively.
    pub(crate) fn get(&self, pack_uri: &PackURI) -> Result<String> {
        if let Some(ct) = self.overrides.get(&pack_uri.as_str().to_ascii_lowercase()) {
            return Ok(ct.clone());
        }
        if let Some(ct) = self.defaults.get(&pack_uri.ext().to_ascii_lowercase()) {
            return Ok(ct.clone());
        }
        Err(OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Parts and package relationships of a serialized package.
pub struct PackageReader {
    pkg_rels: Relationships,
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    pub fn from_phys_reader(mut phys_reader: PhysPkgReader) -> Result<Self> {
        let content_types = ContentTypeMap::from_xml(phys_reader.content_types_xml()?)?;
        let package_uri = PackURI::new(PACKAGE_URI)?;
        let pkg_rels = Self::load_rels(&phys_reader, &package_uri)?;
        let sparts = Self::load_parts(&mut phys_reader, &pkg_rels, &content_types)?;
        Ok(Self { pkg_rels, sparts })
    }

    fn load_rels(phys_reader: &PhysPkgReader, source_uri: &PackURI) -> Result<Relationships> {
        let base_uri = source_uri.base_uri().to_string();
        match phys_reader.rels_xml_for(source_uri)? {
            Some(xml) => Relationships::from_xml(base_uri, xml),
            None => Ok(Relationships::new(base_uri)),
        }
    }

    /// Walk the relationship graph breadth-first from the package relationships.
    ///
    /// Relationships whose target member is absent are left dangling rather than
    /// failing the whole load.
    fn load_parts(
        phys_reader: &mut PhysPkgReader,
        pkg_rels: &Relationships,
        content_types: &ContentTypeMap,
    ) -> Result<Vec<SerializedPart>> {
        let mut sparts = Vec::with_capacity(phys_reader.len());
        let mut visited = HashSet::with_capacity(phys_reader.len());
        let mut queue = VecDeque::new();
        Self::enqueue_targets(pkg_rels, &mut visited, &mut queue);

        while let Some((partname, reltype)) = queue.pop_front() {
            if !phys_reader.contains(&partname) {
                log::warn!("Relationship target {} is missing from the package", partname);
                continue;
            }
            let rels = Self::load_rels(phys_reader, &partname)?;
            Self::enqueue_targets(&rels, &mut visited, &mut queue);

            let blob = phys_reader.take_blob(&partname)?;
            let content_type = content_types.get(&partname)?;
            sparts.push(SerializedPart {
                partname,
                content_type,
                reltype,
                blob,
                rels,
            });
        }

        Ok(sparts)
    }

    fn enqueue_targets(
        rels: &Relationships,
        visited: &mut HashSet<PackURI>,
        queue: &mut VecDeque<(PackURI, String)>,
    ) {
        for rel in rels.iter().filter(|rel| !rel.is_external()) {
            if let Ok(partname) = rel.target_partname() {
                if visited.insert(partname.clone()) {
                    queue.push_back((partname, rel.reltype().to_string()));
                }
            }
        }
    }

    pub fn pkg_rels(&self) -> &Relationships {
        &self.pkg_rels
    }

    pub fn iter_sparts(&self) -> impl Iterator<Item = &SerializedPart> {
        self.sparts.iter()
    }

    /// Take the package relationships and parts.
    pub fn into_parts(self) -> (Relationships, Vec<SerializedPart>) {
        (self.pkg_rels, self.sparts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_map() {
        let xml = br#"<?xml version="1.0"?>
            <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="xml" ContentType="application/xml"/>
                <Default Extension="PNG" ContentType="image/png"/>
                <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
            </Types>"#;

        let ct_map = ContentTypeMap::from_xml(xml).unwrap();

        let uri = PackURI::new("/ppt/theme/theme1.xml").unwrap();
        assert_eq!(ct_map.get(&uri).unwrap(), "application/xml");

        let uri = PackURI::new("/ppt/media/image1.png").unwrap();
        assert_eq!(ct_map.get(&uri).unwrap(), "image/png");

        let uri = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(
            ct_map.get(&uri).unwrap(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"
        );

        let uri = PackURI::new("/ppt/media/clip.mp4").unwrap();
        assert!(ct_map.get(&uri).is_err());
    }
}
