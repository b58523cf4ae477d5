use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverfixError {
    #[error("invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("no .opf manifest found in {0}")]
    ManifestNotFound(String),

    #[error("invalid cover name {0:?}: must be a plain file name")]
    InvalidCoverName(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, CoverfixError>;
