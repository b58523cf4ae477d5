#[allow(unused_imports)]
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const COVER_PAGE: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:xlink="http://www.w3.org/1999/xlink">
<head><title>Cover</title></head>
<body>
  <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 600 800">
    <image width="600" height="800" xlink:href="../Images/9780111.jpg"/>
  </svg>
  <svg><use xlink:href="#ornament"/></svg>
</body>
</html>"##;

pub const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0 fake jpeg payload";

/// OPF package document with the given extra manifest items
pub fn opf(extra_items: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="uid">urn:isbn:9780111</dc:identifier>
    <dc:title>Test Book</dc:title>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="cover-page" href="Text/cover.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch1" href="Text/ch1.xhtml" media-type="application/xhtml+xml"/>
    {extra_items}
  </manifest>
  <spine>
    <itemref idref="cover-page"/>
    <itemref idref="ch1"/>
  </spine>
</package>"#
    )
}

pub const COVER_ITEM: &str =
    r#"<item id="cover-img" href="Images/9780111.jpg" media-type="image/jpeg" properties="cover-image"/>"#;

pub const PLAIN_IMAGE_ITEM: &str =
    r#"<item id="img" href="Images/9780111.jpg" media-type="image/jpeg"/>"#;

/// Write a ZIP archive with the given entries, in order.
pub fn write_epub(path: &Path, entries: &[(&str, &[u8])]) {
    use zip::write::SimpleFileOptions;

    let file = std::fs::File::create(path).expect("create epub");
    let mut zip = zip::ZipWriter::new(file);
    for (name, data) in entries {
        let method = if *name == "mimetype" {
            zip::CompressionMethod::Stored
        } else {
            zip::CompressionMethod::Deflated
        };
        zip.start_file(*name, SimpleFileOptions::default().compression_method(method))
            .expect("start entry");
        zip.write_all(data).expect("write entry");
    }
    zip.finish().expect("finish epub");
}

/// A typical package: OEBPS/ manifest dir with Text/ and Images/ inside.
///
/// `with_asset` controls whether Images/9780111.jpg is present.
pub fn book_entries(manifest_items: &str, with_asset: bool) -> Vec<(String, Vec<u8>)> {
    let mut entries = vec![
        ("mimetype".to_string(), b"application/epub+zip".to_vec()),
        ("META-INF/container.xml".to_string(), CONTAINER_XML.as_bytes().to_vec()),
        ("OEBPS/content.opf".to_string(), opf(manifest_items).into_bytes()),
        ("OEBPS/Text/cover.xhtml".to_string(), COVER_PAGE.as_bytes().to_vec()),
        (
            "OEBPS/Text/ch1.xhtml".to_string(),
            b"<html><body><p>Hello</p></body></html>".to_vec(),
        ),
    ];
    if with_asset {
        entries.push(("OEBPS/Images/9780111.jpg".to_string(), JPEG_BYTES.to_vec()));
    }
    entries
}

/// Write `entries` as `dir/name` and return its path.
pub fn make_epub(dir: &Path, name: &str, entries: &[(String, Vec<u8>)]) -> PathBuf {
    let path = dir.join(name);
    let borrowed: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(n, d)| (n.as_str(), d.as_slice()))
        .collect();
    write_epub(&path, &borrowed);
    path
}

/// Every file entry of an archive, name to bytes.
#[allow(dead_code)]
pub fn read_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = std::fs::File::open(path).expect("open epub");
    let mut archive = zip::ZipArchive::new(file).expect("open zip");
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).expect("entry");
        if entry.is_dir() {
            continue;
        }
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).expect("read entry");
        entries.insert(entry.name().to_string(), buf);
    }
    entries
}

#[allow(dead_code)]
pub fn read_entry_string(path: &Path, name: &str) -> String {
    let entries = read_entries(path);
    let bytes = entries
        .get(name)
        .unwrap_or_else(|| panic!("{name} missing from {}", path.display()));
    String::from_utf8(bytes.clone()).expect("utf-8 entry")
}

/// Basic structural validation of an EPUB file
#[allow(dead_code)]
pub fn assert_valid_epub(path: &Path) {
    let file = std::fs::File::open(path).expect("open epub");
    let mut archive = zip::ZipArchive::new(file).expect("open zip");

    let mimetype = archive.by_index(0).expect("first entry");
    assert_eq!(mimetype.name(), "mimetype");
    assert_eq!(mimetype.compression(), zip::CompressionMethod::Stored);
    drop(mimetype);

    archive
        .by_name("META-INF/container.xml")
        .expect("container.xml");
}
