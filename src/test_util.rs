//! Shared helpers for building synthetic blocks and images in tests.

use crate::disk::DiskImage;
use crate::gpt::SECTOR_SIZE;
use crate::ondisk::{block_checksum, BLOCK_SIZE};
use std::io::Write;
use uuid::Uuid;

/// Build one correctly checksummed block with the given header fields
pub fn build_block(
    obj_type: u32,
    subtype: u32,
    oid: u64,
    xid: u64,
    flags: u16,
    level: u16,
    entry_count: u32,
) -> Vec<u8> {
    let mut block = vec![0u8; BLOCK_SIZE];
    block[8..16].copy_from_slice(&oid.to_le_bytes());
    block[16..24].copy_from_slice(&xid.to_le_bytes());
    block[24..28].copy_from_slice(&obj_type.to_le_bytes());
    block[28..32].copy_from_slice(&subtype.to_le_bytes());
    block[32..34].copy_from_slice(&flags.to_le_bytes());
    block[34..36].copy_from_slice(&level.to_le_bytes());
    block[36..40].copy_from_slice(&entry_count.to_le_bytes());

    let cksum = block_checksum(&block);
    block[0..8].copy_from_slice(&cksum.to_le_bytes());
    block
}

/// A non-empty block that fails verification
pub fn corrupt_block() -> Vec<u8> {
    let mut block = vec![0xA5u8; BLOCK_SIZE];
    // A stored checksum that cannot match the patterned body
    block[0..8].copy_from_slice(&1u64.to_le_bytes());
    block
}

/// Write an image to a temp file and memory-map it.
///
/// The temp file handle must stay alive while the image is in use.
pub fn open_image(bytes: &[u8]) -> (tempfile::NamedTempFile, DiskImage) {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(bytes).expect("write image");
    file.flush().expect("flush image");
    let disk = DiskImage::open(file.path()).expect("open image");
    (file, disk)
}

/// One partition to place into a synthetic GPT
#[derive(Debug, Clone, Copy)]
pub struct GptSpec {
    pub type_guid: Uuid,
    pub first_lba: u64,
    pub last_lba: u64,
}

/// Build an image of `total_sectors` 512-byte sectors carrying a
/// verifiable GPT: protective MBR, header at LBA 1, entry array at LBA 2.
pub fn build_gpt_image(parts: &[GptSpec], total_sectors: u64) -> Vec<u8> {
    const NUM_ENTRIES: u32 = 128;
    const ENTRY_SIZE: u32 = 128;

    let mut image = vec![0u8; (total_sectors * SECTOR_SIZE) as usize];

    // Protective MBR
    image[446 + 4] = 0xEE;
    image[510] = 0x55;
    image[511] = 0xAA;

    // Entry array at LBA 2
    let mut entries = vec![0u8; (NUM_ENTRIES * ENTRY_SIZE) as usize];
    for (i, part) in parts.iter().enumerate() {
        let off = i * ENTRY_SIZE as usize;
        entries[off..off + 16].copy_from_slice(&part.type_guid.to_bytes_le());
        // Unique partition GUID, any non-nil value
        entries[off + 16..off + 32].copy_from_slice(&[0x11u8; 16]);
        entries[off + 32..off + 40].copy_from_slice(&part.first_lba.to_le_bytes());
        entries[off + 40..off + 48].copy_from_slice(&part.last_lba.to_le_bytes());
    }

    // Header at LBA 1
    let mut header = vec![0u8; 92];
    header[0..8].copy_from_slice(b"EFI PART");
    header[8..12].copy_from_slice(&[0x00, 0x00, 0x01, 0x00]);
    header[12..16].copy_from_slice(&92u32.to_le_bytes());
    header[24..32].copy_from_slice(&1u64.to_le_bytes());
    header[32..40].copy_from_slice(&(total_sectors - 1).to_le_bytes());
    header[72..80].copy_from_slice(&2u64.to_le_bytes());
    header[80..84].copy_from_slice(&NUM_ENTRIES.to_le_bytes());
    header[84..88].copy_from_slice(&ENTRY_SIZE.to_le_bytes());
    header[88..92].copy_from_slice(&crc32fast::hash(&entries).to_le_bytes());

    let header_crc = crc32fast::hash(&header);
    header[16..20].copy_from_slice(&header_crc.to_le_bytes());

    let hdr_off = SECTOR_SIZE as usize;
    image[hdr_off..hdr_off + 92].copy_from_slice(&header);
    let arr_off = 2 * SECTOR_SIZE as usize;
    image[arr_off..arr_off + entries.len()].copy_from_slice(&entries);

    image
}
