use thiserror::Error;

use crate::model::PartType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid DOCX: {0}")]
    InvalidDocx(String),

    /// A header/footer reference points at a part that is missing or unparsable.
    #[error("malformed {part_type} reference {id:?}: {reason}")]
    MalformedReference {
        part_type: PartType,
        id: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn malformed(part_type: PartType, id: &str, reason: impl Into<String>) -> Self {
        Error::MalformedReference {
            part_type,
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
