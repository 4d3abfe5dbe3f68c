//! GUID Partition Table locator.
//!
//! Finds the byte range of the first APFS partition on a device. Any
//! failure here (missing table, bad signature, CRC mismatch) is absorbed
//! by the caller as a whole-device fallback, never surfaced as an error.

use crate::disk::DiskImage;
use log::debug;
use uuid::Uuid;

/// GPT works in 512-byte logical blocks regardless of the filesystem
/// block size
pub const SECTOR_SIZE: u64 = 512;

/// Partition type GUID for an APFS container
pub const APFS_PARTITION_GUID: Uuid = uuid::uuid!("7c3457ef-0000-11aa-aa11-00306543ecac");

const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
const GPT_HEADER_LBA: u64 = 1;
const GPT_MIN_HEADER_SIZE: usize = 92;
const MBR_SIGNATURE_OFF: usize = 510;
const MBR_PART_TABLE_OFF: usize = 446;
const MBR_TYPE_PROTECTIVE: u8 = 0xEE;
const MAX_PARTITION_ENTRIES: u32 = 512;

/// One parsed partition entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEntry {
    pub type_guid: Uuid,
    pub first_lba: u64,
    pub last_lba: u64,
}

/// Verified GPT with its non-empty partition entries
#[derive(Debug)]
pub struct GptPartitionMap {
    entries: Vec<PartitionEntry>,
}

impl GptPartitionMap {
    /// Load the protective MBR, header and entry array, verifying
    /// signatures and CRCs. `None` means "no usable partition table".
    pub fn load_and_verify(disk: &DiskImage) -> Option<Self> {
        let mbr = match disk.slice(0, SECTOR_SIZE as usize) {
            Ok(buf) => buf,
            Err(_) => {
                debug!("device smaller than one sector, no partition table");
                return None;
            }
        };

        if mbr[MBR_SIGNATURE_OFF] != 0x55 || mbr[MBR_SIGNATURE_OFF + 1] != 0xAA {
            debug!("missing MBR boot signature");
            return None;
        }

        let protective = (0..4).any(|i| {
            let entry = &mbr[MBR_PART_TABLE_OFF + i * 16..MBR_PART_TABLE_OFF + (i + 1) * 16];
            entry[4] == MBR_TYPE_PROTECTIVE
        });
        if !protective {
            debug!("no protective GPT entry in MBR");
            return None;
        }

        let header = match disk.slice(GPT_HEADER_LBA * SECTOR_SIZE, SECTOR_SIZE as usize) {
            Ok(buf) => buf,
            Err(_) => return None,
        };

        if &header[0..8] != GPT_SIGNATURE {
            debug!("missing GPT header signature");
            return None;
        }

        let header_size = le_u32(header, 12) as usize;
        if !(GPT_MIN_HEADER_SIZE..=SECTOR_SIZE as usize).contains(&header_size) {
            debug!("implausible GPT header size {}", header_size);
            return None;
        }

        let stored_header_crc = le_u32(header, 16);
        let mut header_copy = header[..header_size].to_vec();
        header_copy[16..20].fill(0);
        if crc32fast::hash(&header_copy) != stored_header_crc {
            debug!("GPT header CRC mismatch");
            return None;
        }

        let entries_lba = le_u64(header, 72);
        let num_entries = le_u32(header, 80);
        let entry_size = le_u32(header, 84) as usize;
        let stored_entries_crc = le_u32(header, 88);

        if entry_size < 128 || num_entries == 0 || num_entries > MAX_PARTITION_ENTRIES {
            debug!(
                "implausible GPT entry layout: {} entries of {} bytes",
                num_entries, entry_size
            );
            return None;
        }

        let array_len = num_entries as usize * entry_size;
        let array = match disk.slice(entries_lba * SECTOR_SIZE, array_len) {
            Ok(buf) => buf,
            Err(_) => {
                debug!("GPT entry array extends past end of device");
                return None;
            }
        };

        if crc32fast::hash(array) != stored_entries_crc {
            debug!("GPT entry array CRC mismatch");
            return None;
        }

        let mut entries = Vec::new();
        for raw in array.chunks_exact(entry_size) {
            let mut guid = [0u8; 16];
            guid.copy_from_slice(&raw[0..16]);
            // GPT stores the first three GUID fields little-endian
            let type_guid = Uuid::from_bytes_le(guid);
            if type_guid.is_nil() {
                continue;
            }
            entries.push(PartitionEntry {
                type_guid,
                first_lba: le_u64(raw, 32),
                last_lba: le_u64(raw, 40),
            });
        }

        debug!("GPT verified, {} partition entries", entries.len());
        Some(Self { entries })
    }

    pub fn entries(&self) -> &[PartitionEntry] {
        &self.entries
    }

    /// Index of the first partition whose type GUID marks an APFS container
    pub fn first_apfs_partition(&self) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.type_guid == APFS_PARTITION_GUID)
    }

    /// Byte offset and length of a partition on the device
    pub fn partition_byte_range(&self, index: usize) -> (u64, u64) {
        let entry = &self.entries[index];
        let offset = entry.first_lba * SECTOR_SIZE;
        let length = entry
            .last_lba
            .saturating_sub(entry.first_lba)
            .saturating_add(1)
            * SECTOR_SIZE;
        (offset, length)
    }
}

fn le_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn le_u64(buf: &[u8], off: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[off..off + 8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{build_gpt_image, open_image, GptSpec};

    fn apfs_spec() -> GptSpec {
        GptSpec {
            type_guid: APFS_PARTITION_GUID,
            first_lba: 40,
            last_lba: 167,
        }
    }

    #[test]
    fn test_locates_apfs_partition() {
        let image = build_gpt_image(&[apfs_spec()], 256);
        let (_file, disk) = open_image(&image);

        let pmap = GptPartitionMap::load_and_verify(&disk).expect("table should verify");
        let part = pmap.first_apfs_partition().expect("APFS partition present");
        let (offset, length) = pmap.partition_byte_range(part);
        assert_eq!(offset, 40 * SECTOR_SIZE);
        assert_eq!(length, 128 * SECTOR_SIZE);
    }

    #[test]
    fn test_missing_boot_signature() {
        let mut image = build_gpt_image(&[apfs_spec()], 256);
        image[510] = 0;
        let (_file, disk) = open_image(&image);
        assert!(GptPartitionMap::load_and_verify(&disk).is_none());
    }

    #[test]
    fn test_corrupted_header_crc() {
        let mut image = build_gpt_image(&[apfs_spec()], 256);
        // Flip a byte inside the header without fixing its CRC
        image[512 + 40] ^= 0xFF;
        let (_file, disk) = open_image(&image);
        assert!(GptPartitionMap::load_and_verify(&disk).is_none());
    }

    #[test]
    fn test_corrupted_entry_array_crc() {
        let mut image = build_gpt_image(&[apfs_spec()], 256);
        // First entry lives at LBA 2
        image[2 * 512] ^= 0xFF;
        let (_file, disk) = open_image(&image);
        assert!(GptPartitionMap::load_and_verify(&disk).is_none());
    }

    #[test]
    fn test_no_apfs_entry() {
        let linux_data = GptSpec {
            type_guid: uuid::uuid!("0fc63daf-8483-4772-8e79-3d69d8477de4"),
            first_lba: 40,
            last_lba: 167,
        };
        let image = build_gpt_image(&[linux_data], 256);
        let (_file, disk) = open_image(&image);

        let pmap = GptPartitionMap::load_and_verify(&disk).expect("table should verify");
        assert_eq!(pmap.entries().len(), 1);
        assert!(pmap.first_apfs_partition().is_none());
    }

    #[test]
    fn test_blank_device() {
        let (_file, disk) = open_image(&vec![0u8; 64 * 512]);
        assert!(GptPartitionMap::load_and_verify(&disk).is_none());
    }
}
