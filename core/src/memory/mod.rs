//! Foreign process memory access
//!
//! Two seams keep the rest of the pipeline testable without a running game:
//! - [`ReadMemory`]: bounded reads at absolute addresses
//! - [`ProcessProvider`]: process lookup, liveness and attachment
//!
//! The live implementation sits in [`live`]; tests use an in-memory fake.

#[cfg(test)]
pub(crate) mod fake;
mod live;
pub mod signature;

use byteorder::{ByteOrder, LE};

use crate::error::{ReadFailed, ScanError};

pub use live::{LiveProcess, LiveProcessProvider};
pub use signature::{Pattern, resolve_signature};

/// Read access to a foreign address space.
///
/// Every failure cause is folded into [`ReadFailed`]; a read either returns
/// exactly `size` bytes or fails.
pub trait ReadMemory {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>, ReadFailed>;

    fn read_u32(&self, address: u64) -> Result<u32, ReadFailed> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(LE::read_u32(&bytes))
    }

    fn read_i32(&self, address: u64) -> Result<i32, ReadFailed> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(LE::read_i32(&bytes))
    }

    fn read_u64(&self, address: u64) -> Result<u64, ReadFailed> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(LE::read_u64(&bytes))
    }

    /// Read a 64-bit pointer
    fn read_ptr(&self, address: u64) -> Result<u64, ReadFailed> {
        self.read_u64(address)
    }
}

/// A running process found by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
}

/// Address range of the game's main executable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRange {
    pub base: u64,
    pub size: u64,
}

impl ModuleRange {
    pub fn end(&self) -> u64 {
        self.base + self.size
    }
}

/// An open handle plus the main module it was resolved against
#[derive(Debug)]
pub struct Attached<H> {
    pub process: ProcessInfo,
    pub handle: H,
    pub module: ModuleRange,
}

/// OS-facing process operations used by the scanner
pub trait ProcessProvider {
    type Handle: ReadMemory;

    /// Look up a running process by executable name (case-insensitive)
    fn find_process(&mut self, name: &str) -> Option<ProcessInfo>;

    /// Whether the process with this pid is still running
    fn is_alive(&mut self, pid: u32) -> bool;

    /// Open a read handle and locate the main module
    fn attach(&mut self, process: &ProcessInfo) -> Result<Attached<Self::Handle>, ScanError>;
}
