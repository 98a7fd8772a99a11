//! In-memory process fake for tests

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{Attached, ModuleRange, ProcessInfo, ProcessProvider, ReadMemory};
use crate::error::{ReadFailed, ScanError};

/// Sparse address space made of mapped regions
#[derive(Debug, Default, Clone)]
pub struct FakeMemory {
    regions: BTreeMap<u64, Vec<u8>>,
}

impl FakeMemory {
    /// Map `bytes` at `base`, replacing any region starting there
    pub fn map(&mut self, base: u64, bytes: Vec<u8>) {
        self.regions.insert(base, bytes);
    }
}

impl ReadMemory for FakeMemory {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>, ReadFailed> {
        let failed = ReadFailed { address, size };
        let (base, region) = self.regions.range(..=address).next_back().ok_or(failed)?;
        let start = (address - base) as usize;
        region
            .get(start..start + size)
            .map(<[u8]>::to_vec)
            .ok_or(failed)
    }
}

/// Shared state behind a [`FakeProvider`] and its handles
#[derive(Debug)]
pub struct FakeWorld {
    pub process_name: String,
    pub pid: u32,
    pub running: bool,
    pub attachable: bool,
    pub fail_reads: bool,
    pub module: ModuleRange,
    pub memory: FakeMemory,
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self {
            process_name: "ffxiv_dx11.exe".to_string(),
            pid: 4242,
            running: false,
            attachable: true,
            fail_reads: false,
            module: ModuleRange {
                base: 0x1_4000_0000,
                size: 0x1000,
            },
            memory: FakeMemory::default(),
        }
    }
}

/// Actor table address the default signatures resolve to in [`FakeWorld::game`]
pub const FAKE_TABLE_ADDR: u64 = 0x1_4010_0000;
/// Pointer slot holding the camera address
pub const FAKE_CAMERA_PTR_ADDR: u64 = 0x1_4020_0000;
pub const FAKE_CAMERA_ADDR: u64 = 0x2_0000_0000;

impl FakeWorld {
    /// A running game whose module contains the default actor-table and
    /// camera signatures, with the given table and camera bytes mapped.
    pub fn game(table: Vec<u8>, camera: Vec<u8>) -> Self {
        let mut world = Self {
            running: true,
            ..Default::default()
        };
        let base = world.module.base;
        let mut image = vec![0xCCu8; world.module.size as usize];

        // lea rcx, [rip + disp]; call ...; movzx r8d, byte ptr [rbx + ...]
        let at = 0x100;
        let disp = (FAKE_TABLE_ADDR - (base + at as u64 + 7)) as i32;
        image[at..at + 3].copy_from_slice(&[0x48, 0x8D, 0x0D]);
        image[at + 3..at + 7].copy_from_slice(&disp.to_le_bytes());
        image[at + 7..at + 16]
            .copy_from_slice(&[0xE8, 0x00, 0x00, 0x00, 0x00, 0x44, 0x0F, 0xB6, 0x83]);

        // mov rax, [rip + disp]; mov [rsp + ..], rcx; lea r9, [rsp + ..]
        let at = 0x200;
        let disp = (FAKE_CAMERA_PTR_ADDR - (base + at as u64 + 7)) as i32;
        image[at..at + 3].copy_from_slice(&[0x48, 0x8B, 0x05]);
        image[at + 3..at + 7].copy_from_slice(&disp.to_le_bytes());
        image[at + 7..at + 16]
            .copy_from_slice(&[0x48, 0x89, 0x4C, 0x24, 0x20, 0x4C, 0x8D, 0x4C, 0x24]);

        world.memory.map(base, image);
        world.memory.map(FAKE_TABLE_ADDR, table);
        world
            .memory
            .map(FAKE_CAMERA_PTR_ADDR, FAKE_CAMERA_ADDR.to_le_bytes().to_vec());
        world.memory.map(FAKE_CAMERA_ADDR, camera);
        world
    }
}

pub type SharedWorld = Rc<RefCell<FakeWorld>>;

#[derive(Debug, Clone)]
pub struct FakeProvider {
    pub world: SharedWorld,
}

impl FakeProvider {
    pub fn new(world: FakeWorld) -> Self {
        Self {
            world: Rc::new(RefCell::new(world)),
        }
    }
}

#[derive(Debug)]
pub struct FakeHandle {
    world: SharedWorld,
}

impl ReadMemory for FakeHandle {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>, ReadFailed> {
        let world = self.world.borrow();
        if world.fail_reads || !world.running {
            return Err(ReadFailed { address, size });
        }
        world.memory.read_bytes(address, size)
    }
}

impl ProcessProvider for FakeProvider {
    type Handle = FakeHandle;

    fn find_process(&mut self, name: &str) -> Option<ProcessInfo> {
        let world = self.world.borrow();
        (world.running && world.process_name.eq_ignore_ascii_case(name)).then(|| ProcessInfo {
            pid: world.pid,
            name: world.process_name.clone(),
        })
    }

    fn is_alive(&mut self, pid: u32) -> bool {
        let world = self.world.borrow();
        world.running && world.pid == pid
    }

    fn attach(&mut self, process: &ProcessInfo) -> Result<Attached<FakeHandle>, ScanError> {
        let module = {
            let world = self.world.borrow();
            if !world.attachable || !world.running {
                return Err(ScanError::ProcessUnavailable);
            }
            world.module
        };
        Ok(Attached {
            process: process.clone(),
            handle: FakeHandle {
                world: Rc::clone(&self.world),
            },
            module,
        })
    }
}
