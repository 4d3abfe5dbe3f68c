//! The scan-classify pipeline shared by both reporters.
//!
//! One loop reads, classifies and visits each block of the resolved
//! range in order; the map and dump passes differ only in their visitor.
//! Keeping the loop in one place guarantees both passes see identical
//! ordering and cancellation behavior.

use crate::cancel::CancelFlag;
use crate::disk::DiskImage;
use crate::error::Result;
use crate::gpt::GptPartitionMap;
use crate::ondisk::{self, BLOCK_SIZE};
use crate::types::{BlockAddr, Classification, ScanRange};
use log::{debug, info};

/// Classify one block buffer.
///
/// Pure function of the buffer contents: an all-zero buffer is `Empty`,
/// anything else is `Valid` or `Corrupt` depending on structural
/// verification. Never fails.
pub fn classify(block: &[u8]) -> Classification {
    if ondisk::is_empty_block(block) {
        Classification::Empty
    } else if ondisk::verify_block(block) {
        Classification::Valid
    } else {
        Classification::Corrupt
    }
}

/// One classified block handed to a visitor.
///
/// `addr` is relative to the scan range start; `data` borrows the mapped
/// device bytes for this iteration only.
#[derive(Debug)]
pub struct ClassifiedBlock<'a> {
    pub addr: BlockAddr,
    pub class: Classification,
    pub data: &'a [u8],
}

/// Resolve the scan range once, before any pass runs.
///
/// Partition-bounded when the partition table verifies and names an APFS
/// partition; whole device otherwise. The count is clamped so every read
/// stays inside the image.
pub fn resolve_scan_range(disk: &DiskImage) -> ScanRange {
    let device_blocks = disk.block_count();

    if let Some(pmap) = GptPartitionMap::load_and_verify(disk) {
        if let Some(part) = pmap.first_apfs_partition() {
            let (byte_offset, byte_length) = pmap.partition_byte_range(part);
            let start = byte_offset / BLOCK_SIZE as u64;
            let count = (byte_length / BLOCK_SIZE as u64)
                .min(device_blocks.saturating_sub(start));
            if count > 0 {
                let range = ScanRange::new(BlockAddr::new(start), count);
                info!("scanning APFS partition: {}", range);
                return range;
            }
            debug!("APFS partition smaller than one block, ignoring");
        } else {
            debug!("partition table has no APFS partition");
        }
    }

    info!("scanning whole device: {} blocks", device_blocks);
    ScanRange::whole_device(device_blocks)
}

/// Walk a range block by block, classifying each and handing it to the
/// visitor.
///
/// The cancellation flag is polled once at the top of every iteration;
/// when it is observed set, the walk stops before reading another block
/// and returns `Ok`. The visitor's output up to that point is complete.
pub fn walk_blocks<F>(
    disk: &DiskImage,
    range: ScanRange,
    cancel: &CancelFlag,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(&ClassifiedBlock<'_>) -> std::io::Result<()>,
{
    for rel in 0..range.count {
        if cancel.is_cancelled() {
            debug!("cancelled after {} of {} blocks", rel, range.count);
            break;
        }

        let data = disk.read_block(range.start.as_u64() + rel)?;
        let block = ClassifiedBlock {
            addr: BlockAddr::new(rel),
            class: classify(data),
            data,
        };
        visit(&block)?;
    }

    Ok(())
}
