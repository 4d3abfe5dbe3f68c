use crate::error::{Result, ScanError};
use crate::ondisk::BLOCK_SIZE;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Read-only memory-mapped disk image or raw device.
///
/// All access is through bounds-checked slices; the scanner never writes
/// to the mapping. The mapping is closed on drop.
#[derive(Debug)]
pub struct DiskImage {
    mmap: Mmap,
    size: u64,
    path: String,
}

impl DiskImage {
    /// Open a disk image file with memory mapping
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.display().to_string();

        let file = File::open(path_ref).map_err(|e| ScanError::ImageOpen {
            path: path_str.clone(),
            source: e,
        })?;

        let metadata = file.metadata().map_err(|e| ScanError::ImageOpen {
            path: path_str.clone(),
            source: e,
        })?;
        let size = metadata.len();

        let mmap = unsafe {
            Mmap::map(&file)
                .map_err(|e| ScanError::Mmap(format!("failed to mmap {}: {}", path_str, e)))?
        };

        Ok(Self {
            mmap,
            size,
            path: path_str,
        })
    }

    /// Total size of the image in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Total size of the image in whole blocks
    pub fn block_count(&self) -> u64 {
        self.size / BLOCK_SIZE as u64
    }

    /// Path the image was opened from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a zero-copy slice of the image with bounds checking
    pub fn slice(&self, offset: u64, len: usize) -> Result<&[u8]> {
        let end = offset
            .checked_add(len as u64)
            .ok_or(ScanError::OutOfBounds {
                offset,
                len: len as u64,
                image_size: self.size,
            })?;

        if end > self.size {
            return Err(ScanError::OutOfBounds {
                offset,
                len: len as u64,
                image_size: self.size,
            });
        }

        Ok(&self.mmap[offset as usize..end as usize])
    }

    /// Read one block by absolute device block number
    pub fn read_block(&self, block: u64) -> Result<&[u8]> {
        self.slice(block * BLOCK_SIZE as u64, BLOCK_SIZE)
    }
}
