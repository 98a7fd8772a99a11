//! Code signature scanning
//!
//! Locates game data by scanning the main module for a byte pattern and
//! decoding the address operand of the matched instruction. The scan reads
//! the module in overlapping chunks and searches each chunk with `memchr`'s
//! memmem finder on the longest fixed run of the pattern, verifying the full
//! pattern (with wildcards) at each anchor hit.

use ffradar_types::{SignatureConfig, SignatureKind};
use ffradar_types::formatting::format_address;
use tracing::{debug, warn};

use super::{ModuleRange, ReadMemory};
use crate::error::ScanError;

/// Bytes read per scan step
const SCAN_CHUNK_SIZE: usize = 1 << 20;

/// Parsed byte pattern with wildcard mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Vec<u8>,
    mask: Vec<bool>,
}

impl Pattern {
    /// Parse an IDA-style pattern: hex bytes separated by spaces, `?` or `??`
    /// for wildcards. Returns `None` for empty or invalid patterns.
    pub fn parse(text: &str) -> Option<Self> {
        let mut bytes = Vec::new();
        let mut mask = Vec::new();

        for token in text.split_whitespace() {
            if token.chars().all(|c| c == '?') && token.len() <= 2 {
                bytes.push(0);
                mask.push(false);
            } else {
                bytes.push(u8::from_str_radix(token, 16).ok()?);
                mask.push(true);
            }
        }

        if bytes.is_empty() || !mask.iter().any(|fixed| *fixed) {
            return None;
        }
        Some(Self { bytes, mask })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Longest contiguous run of fixed bytes: (offset, bytes)
    fn anchor(&self) -> (usize, &[u8]) {
        let mut best = (0, 0);
        let mut run_start = 0;
        let mut run_len = 0;

        for (i, fixed) in self.mask.iter().enumerate() {
            if *fixed {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
                if run_len > best.1 {
                    best = (run_start, run_len);
                }
            } else {
                run_len = 0;
            }
        }

        (best.0, &self.bytes[best.0..best.0 + best.1])
    }

    fn verify(&self, data: &[u8]) -> bool {
        data.len() >= self.bytes.len()
            && self
                .bytes
                .iter()
                .zip(&self.mask)
                .zip(data)
                .all(|((expected, fixed), actual)| !fixed || expected == actual)
    }

    /// First offset in `data` where the pattern matches
    pub fn find(&self, data: &[u8]) -> Option<usize> {
        let (anchor_offset, anchor) = self.anchor();
        let finder = memchr::memmem::Finder::new(anchor);

        finder.find_iter(data).find_map(|anchor_pos| {
            let start = anchor_pos.checked_sub(anchor_offset)?;
            self.verify(&data[start..]).then_some(start)
        })
    }
}

/// Scan the main module for the first match of `pattern`.
///
/// Chunks overlap by `pattern.len() - 1` bytes so matches straddling a chunk
/// boundary are found. Unreadable chunks are skipped.
pub fn scan_module<R: ReadMemory + ?Sized>(
    reader: &R,
    module: ModuleRange,
    pattern: &Pattern,
) -> Option<u64> {
    let overlap = pattern.len().saturating_sub(1) as u64;
    let mut offset = 0u64;

    while offset < module.size {
        let remaining = module.size - offset;
        let size = remaining.min(SCAN_CHUNK_SIZE as u64 + overlap) as usize;

        if let Ok(chunk) = reader.read_bytes(module.base + offset, size)
            && let Some(pos) = pattern.find(&chunk)
        {
            return Some(module.base + offset + pos as u64);
        }

        offset += SCAN_CHUNK_SIZE as u64;
    }

    None
}

/// Resolve a configured signature to the address of its data block.
pub fn resolve_signature<R: ReadMemory + ?Sized>(
    reader: &R,
    module: ModuleRange,
    signature: &SignatureConfig,
) -> Result<u64, ScanError> {
    let unresolved = || ScanError::SignatureUnresolved(signature.name.clone());

    let Some(pattern) = Pattern::parse(&signature.pattern) else {
        warn!(name = %signature.name, pattern = %signature.pattern, "Invalid signature pattern");
        return Err(unresolved());
    };

    let hit = scan_module(reader, module, &pattern).ok_or_else(unresolved)?;
    let operand = hit + signature.operand_offset as u64;

    let mut address = match signature.kind {
        SignatureKind::RipRelative => {
            let disp = reader.read_i32(operand)?;
            (operand + 4).wrapping_add_signed(disp as i64)
        }
        SignatureKind::Absolute => reader.read_u64(operand)?,
    };

    if signature.deref {
        address = reader.read_ptr(address)?;
    }

    if address == 0 {
        return Err(unresolved());
    }

    debug!(
        name = %signature.name,
        hit = %format_address(hit),
        address = %format_address(address),
        "Resolved signature"
    );
    Ok(address)
}
