//! The structural dump pass: a full decoded record for every verified
//! block, nothing for empty or opaque ones.

use crate::cancel::CancelFlag;
use crate::disk::DiskImage;
use crate::error::Result;
use crate::render::NodeRenderer;
use crate::scan::walk_blocks;
use crate::types::{Classification, ScanRange};
use std::io::Write;

/// Write the structural dump for one scan range.
///
/// Exactly one record per `Valid` block, in ascending address order.
/// `Empty` and `Corrupt` blocks are skipped silently: structural decoding
/// is undefined for them and partial output would be garbage. A partial
/// dump after cancellation is valid output, not an error.
pub fn write_dump<W: Write>(
    out: &mut W,
    disk: &DiskImage,
    range: ScanRange,
    cancel: &CancelFlag,
) -> Result<()> {
    let renderer = NodeRenderer::raw_text();

    walk_blocks(disk, range, cancel, |blk| {
        if blk.class == Classification::Valid {
            renderer.render_node(out, blk.data, blk.addr)
        } else {
            Ok(())
        }
    })
}
