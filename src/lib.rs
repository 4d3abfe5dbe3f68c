//! Read-only diagnostic scanner for APFS container images and raw
//! devices.
//!
//! The scanner walks the block address space in fixed 4 KiB units,
//! classifies every block (empty, structurally valid, or opaque data)
//! and produces two report artifacts:
//! - a compact block map with empty runs collapsed into marker rows
//! - a verbose structural dump of every verified block
//!
//! It is a recovery and analysis aid, not a mounting path: the device is
//! never written. Damaged blocks become `Corrupt` rows instead of
//! aborting the scan, and SIGINT stops the walk cooperatively while
//! leaving well-formed partial reports.

pub mod cancel;
pub mod cli;
pub mod disk;
pub mod error;
pub mod gpt;
pub mod ondisk;
pub mod render;
pub mod report;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export commonly used types
pub use cancel::CancelFlag;
pub use disk::DiskImage;
pub use error::{Result, ScanError};
pub use gpt::GptPartitionMap;
pub use ondisk::{verify_block, NodeHeader, ObjHeader, BLOCK_SIZE};
pub use render::NodeRenderer;
pub use scan::{classify, resolve_scan_range, walk_blocks, ClassifiedBlock};
pub use types::{BlockAddr, Classification, ScanRange};
