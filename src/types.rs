/// Newtype wrapper for block addresses within a scan range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockAddr(pub u64);

impl BlockAddr {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn checked_add(&self, blocks: u64) -> Option<BlockAddr> {
        self.0.checked_add(blocks).map(BlockAddr)
    }
}

impl std::fmt::Display for BlockAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Classification of one block's contents.
///
/// Re-classifying an unchanged buffer always yields the same result; the
/// classifier is a pure function of the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Every byte is zero
    Empty,
    /// Non-empty and passes structural verification
    Valid,
    /// Non-empty but unverifiable; treated as opaque data, never fatal
    Corrupt,
}

/// The portion of the device to scan, in block units.
///
/// Either partition-bounded (start and count derived from the partition
/// table) or the whole device (start 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    /// First device block of the range
    pub start: BlockAddr,
    /// Number of blocks in the range
    pub count: u64,
}

impl ScanRange {
    pub fn new(start: BlockAddr, count: u64) -> Self {
        Self { start, count }
    }

    pub fn whole_device(block_count: u64) -> Self {
        Self {
            start: BlockAddr::new(0),
            count: block_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl std::fmt::Display for ScanRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} blocks from block {}", self.count, self.start)
    }
}
