pub mod container;
pub mod cover_page;
pub mod locate;
pub mod opf;
pub mod zip_utils;

/// XML namespace of the OPF package document
pub const OPF_NAMESPACE: &[u8] = b"http://www.idpf.org/2007/opf";

/// Manifest `properties` token that flags the cover image
pub const COVER_IMAGE_PROPERTY: &str = "cover-image";

/// File extension of the package manifest document
pub const MANIFEST_EXTENSION: &str = ".opf";

/// Path of the container pointer file inside the package
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// An item in the EPUB manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestItem {
    pub href: String,
    pub properties: Option<String>,
}

impl ManifestItem {
    /// Whether the space-separated `properties` list contains `property`.
    pub fn has_property(&self, property: &str) -> bool {
        self.properties
            .as_deref()
            .is_some_and(|p| p.split_ascii_whitespace().any(|t| t == property))
    }

    /// Final path segment of the href.
    pub fn file_name(&self) -> &str {
        href_file_name(&self.href)
    }
}

/// Final `/`-separated segment of a manifest href.
pub fn href_file_name(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}

/// Replace the final segment of `href` with `file_name`, keeping the directory prefix.
pub fn replace_file_name(href: &str, file_name: &str) -> String {
    match href.rfind('/') {
        Some(idx) => format!("{}{file_name}", &href[..=idx]),
        None => file_name.to_string(),
    }
}
