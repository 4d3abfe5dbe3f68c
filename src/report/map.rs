//! The block map pass: one fixed-width row per non-empty block, runs of
//! empty blocks collapsed into a single marker row.

use crate::cancel::CancelFlag;
use crate::disk::DiskImage;
use crate::error::Result;
use crate::ondisk::{node_type_name, NodeHeader, ObjHeader};
use crate::scan::walk_blocks;
use crate::types::{Classification, ScanRange};
use std::io::Write;

const MAP_HEADER: &str =
    "[Block]  | Node ID  | Version  | Type     | Subtype  | Flgs | Levl | Entries  | Description";
const MAP_RULE: &str =
    "---------+----------+----------+----------+----------+------+------+----------+---------------------------------";
const EMPTY_MARKER: &str =
    "---------+----------+----------+----------+----------+------+------+----------+ Empty";

/// Write the block map for one scan range.
///
/// Rows appear in strictly increasing address order. The empty-run
/// marker is emitted only when a used block precedes the run, so a range
/// that opens with empty blocks produces no marker for them. A zero-count
/// range yields the header lines only. Cancellation stops the table
/// between rows, leaving every emitted row complete.
pub fn write_map<W: Write>(
    out: &mut W,
    disk: &DiskImage,
    range: ScanRange,
    cancel: &CancelFlag,
) -> Result<()> {
    writeln!(out, "{}", MAP_HEADER)?;
    writeln!(out, "{}", MAP_RULE)?;

    let mut last_was_used = false;
    walk_blocks(disk, range, cancel, |blk| {
        match blk.class {
            Classification::Empty => {
                if last_was_used {
                    writeln!(out, "{}", EMPTY_MARKER)?;
                }
                last_was_used = false;
            }
            Classification::Valid => {
                let obj = ObjHeader::decode(blk.data);
                let node = NodeHeader::decode(blk.data);
                write!(
                    out,
                    "{:08X} | {:08X} | {:08X} | {:08X} | {:08X} | {:04X} | {:04X} | {:08X} | {}",
                    blk.addr.as_u64(),
                    obj.oid,
                    obj.xid,
                    obj.obj_type,
                    obj.subtype,
                    node.flags,
                    node.level,
                    node.entry_count,
                    node_type_name(obj.obj_type, obj.subtype)
                )?;
                if obj.is_root() {
                    write!(out, " [Root]")?;
                }
                writeln!(out)?;
                last_was_used = true;
            }
            Classification::Corrupt => {
                writeln!(
                    out,
                    "{:08X} |          |          |          |          |      |      |          | Data",
                    blk.addr.as_u64()
                )?;
                last_was_used = true;
            }
        }
        Ok(())
    })?;

    writeln!(out)?;
    Ok(())
}
