use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Query rejected before execution: bad predicate shape, literal kind or
    /// fulltext syntax.
    #[error("QueryParse")]
    QueryParse,
    /// Unknown scroll id.
    #[error("NotFound")]
    NotFound,
    /// Scroll id whose keep-alive elapsed.
    #[error("Expired")]
    Expired,
    /// A value that a State cannot hold, or nesting past the configured depth.
    #[error("DataIntegrity")]
    DataIntegrity,
    #[error("Extraction")]
    Extraction,
    #[error("InvalidArgument")]
    InvalidArgument,
    #[error("Internal")]
    Internal,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {context}")]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error {
            kind,
            context: context.into(),
        }
    }

    pub fn query_parse(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::QueryParse, context)
    }

    pub fn data_integrity(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::DataIntegrity, context)
    }

    pub fn extraction(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Extraction, context)
    }

    pub fn is_query_parse(&self) -> bool {
        self.kind == ErrorKind::QueryParse
    }

    /// True for both unknown and timed-out scroll ids.
    pub fn is_scroll_gone(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound | ErrorKind::Expired)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::InvalidArgument,
            context: err.to_string(),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error {
            kind: ErrorKind::QueryParse,
            context: format!("Invalid pattern: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
