use thiserror::Error;

/// Main error type for the scanner
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not open input image {path}: {source}")]
    ImageOpen {
        path: String,
        source: std::io::Error,
    },

    #[error("memory mapping error: {0}")]
    Mmap(String),

    #[error("could not open output file {path}: {source}")]
    OutputOpen {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("read beyond end of image: offset {offset} + {len} exceeds image size {image_size}")]
    OutOfBounds {
        offset: u64,
        len: u64,
        image_size: u64,
    },
}

impl ScanError {
    /// Process exit code for this error.
    ///
    /// Startup failures carry the codes of the CLI contract: 1 for bad
    /// arguments, 2 when the input image cannot be opened, 3 when an
    /// output file cannot be created.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::InvalidArgument(_) => 1,
            ScanError::ImageOpen { .. } | ScanError::Mmap(_) => 2,
            ScanError::OutputOpen { .. } => 3,
            ScanError::Io(_) | ScanError::OutOfBounds { .. } => 1,
        }
    }
}

/// Result type alias for scanner operations
pub type Result<T> = std::result::Result<T, ScanError>;
