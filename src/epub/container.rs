use crate::error::Result;
use quick_xml::Reader;
use quick_xml::events::Event;

const OPF_MEDIA_TYPE: &[u8] = b"application/oebps-package+xml";

/// Read the package path out of `META-INF/container.xml`.
///
/// Prefers the first `<rootfile>` declared as an OPF package; falls back to
/// the first `<rootfile>` of any media type. `None` if the container lists no
/// rootfile at all.
pub fn rootfile_path(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut fallback = None;

    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"rootfile" => {
                let mut full_path = None;
                let mut is_opf = false;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"full-path" => full_path = Some(attr.unescape_value()?.into_owned()),
                        b"media-type" => is_opf = attr.value.as_ref() == OPF_MEDIA_TYPE,
                        _ => {}
                    }
                }
                match full_path {
                    Some(path) if is_opf => return Ok(Some(path)),
                    Some(path) if fallback.is_none() => fallback = Some(path),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rootfile_in_subdirectory() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;
        assert_eq!(
            rootfile_path(xml).unwrap().as_deref(),
            Some("OEBPS/content.opf")
        );
    }

    #[test]
    fn prefers_opf_media_type() {
        let xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="book.pdf" media-type="application/pdf"/>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;
        assert_eq!(rootfile_path(xml).unwrap().as_deref(), Some("content.opf"));
    }

    #[test]
    fn falls_back_to_untyped_rootfile() {
        let xml = r#"<container><rootfiles><rootfile full-path="pkg.opf"/></rootfiles></container>"#;
        assert_eq!(rootfile_path(xml).unwrap().as_deref(), Some("pkg.opf"));
    }

    #[test]
    fn no_rootfile() {
        let xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
  </rootfiles>
</container>"#;
        assert!(rootfile_path(xml).unwrap().is_none());
    }

    #[test]
    fn malformed_xml() {
        let xml = "<container><rootfiles></container>";
        assert!(rootfile_path(xml).is_err());
    }
}
