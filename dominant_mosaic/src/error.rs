// THEORY:
// Every failure the mosaic engine can raise funnels through `MosaicError`. The
// variants split along the boundaries of the pipeline: configuration problems
// are caught before any pixel is touched, `InvalidArgument` guards the pure
// geometry and sampling math, and the I/O family (`Io`, `Decode`, `Encode`,
// `Serialize`) belongs to the collaborators that load and persist files.
//
// The degenerate empty-cell case is deliberately absent: extraction answers it
// with a sentinel color instead of an error.

/// Unified error type for the mosaic engine.
#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    /// A core precondition was violated (zero grid dimension, out-of-bounds
    /// rectangle, color count mismatch).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// User-supplied configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The input bytes are not a decodable image.
    #[error("decode error: {0}")]
    Decode(#[source] image::ImageError),

    /// The mosaic could not be encoded to its output format.
    #[error("encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("report serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A parallel extraction task failed to complete.
    #[error("worker error: {0}")]
    Worker(String),
}

/// Discriminant of a `MosaicError`, convenient for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Config,
    Io,
    Decode,
    Encode,
    Serialize,
    Worker,
}

impl MosaicError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MosaicError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            MosaicError::Config(_) => ErrorKind::Config,
            MosaicError::Io(_) => ErrorKind::Io,
            MosaicError::Decode(_) => ErrorKind::Decode,
            MosaicError::Encode(_) => ErrorKind::Encode,
            MosaicError::Serialize(_) => ErrorKind::Serialize,
            MosaicError::Worker(_) => ErrorKind::Worker,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MosaicError::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MosaicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(MosaicError::invalid("rows").kind(), ErrorKind::InvalidArgument);
        assert_eq!(MosaicError::Config("grid".into()).kind(), ErrorKind::Config);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(MosaicError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn display_carries_message() {
        let err = MosaicError::invalid("cols must be at least 1");
        assert_eq!(err.to_string(), "invalid argument: cols must be at least 1");
    }
}
