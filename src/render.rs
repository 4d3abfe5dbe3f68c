//! Structural rendering of verified blocks for the dump report.
//!
//! The renderer decodes block-level structural metadata only; the
//! contents of leaf records stay opaque and appear solely in the raw
//! body dump.

use crate::ondisk::{node_type_name, NodeHeader, ObjHeader};
use crate::types::BlockAddr;
use std::io::Write;

/// Include a raw hex dump of the block body after the decoded header
pub const TEXT_FLAG_RAW_BODY: u32 = 0x01;

const RECORD_SEPARATOR: &str =
    "========================================================================================================================";

/// Renders one verified block as a structural record
#[derive(Debug, Clone, Copy)]
pub struct NodeRenderer {
    text_flags: u32,
}

impl NodeRenderer {
    pub fn new(text_flags: u32) -> Self {
        Self { text_flags }
    }

    /// The configuration used by the dump pass
    pub fn raw_text() -> Self {
        Self::new(TEXT_FLAG_RAW_BODY)
    }

    /// Append the structural record for one verified block.
    ///
    /// The buffer must already have passed verification; decoding is
    /// undefined for unverified blocks and the caller skips them.
    pub fn render_node<W: Write>(
        &self,
        out: &mut W,
        block: &[u8],
        addr: BlockAddr,
    ) -> std::io::Result<()> {
        let obj = ObjHeader::decode(block);
        let node = NodeHeader::decode(block);

        writeln!(out, "Node {:08X}", addr.as_u64())?;
        writeln!(out, "oid  {:016X}  xid  {:016X}", obj.oid, obj.xid)?;
        write!(
            out,
            "type {:08X}  subtype {:08X}  {}",
            obj.obj_type,
            obj.subtype,
            node_type_name(obj.obj_type, obj.subtype)
        )?;
        if obj.is_root() {
            write!(out, " [Root]")?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "flags {:04X}  level {:04X}  entries {:08X}",
            node.flags, node.level, node.entry_count
        )?;

        if self.text_flags & TEXT_FLAG_RAW_BODY != 0 {
            writeln!(out)?;
            dump_hex(out, &block[..truncated_len(block)])?;
        }

        writeln!(out, "{}", RECORD_SEPARATOR)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Length of the used prefix of a block: trailing zero bytes trimmed,
/// rounded up to a whole 16-byte row.
pub fn truncated_len(block: &[u8]) -> usize {
    if block.is_empty() {
        return 0;
    }
    let mut last = block.len() - 1;
    while last > 0 && block[last] == 0 {
        last -= 1;
    }
    ((last + 0x10) & !0xF).min(block.len())
}

/// Classic hex dump, 16 bytes per row with an ASCII gutter
pub fn dump_hex<W: Write>(out: &mut W, data: &[u8]) -> std::io::Result<()> {
    for (row, chunk) in data.chunks(16).enumerate() {
        write!(out, "{:04X}: ", row * 16)?;
        for i in 0..16 {
            match chunk.get(i) {
                Some(byte) => write!(out, "{:02X} ", byte)?,
                None => write!(out, "   ")?,
            }
        }
        write!(out, "|")?;
        for byte in chunk {
            let ch = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            write!(out, "{}", ch)?;
        }
        writeln!(out, "|")?;
    }
    Ok(())
}
