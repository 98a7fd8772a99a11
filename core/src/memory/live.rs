//! Live process access via `sysinfo` and `process-memory`
//!
//! Process lookup and liveness go through a persistent `sysinfo::System`.
//! Reads use `process_memory::CopyAddress`, which maps to
//! `ReadProcessMemory` on Windows and `process_vm_readv` on Linux (including
//! games running under Wine/Proton).

use ffradar_types::formatting::format_address;
use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, warn};

use super::{Attached, ModuleRange, ProcessInfo, ProcessProvider, ReadMemory};
use crate::error::{ReadFailed, ScanError};

/// Read handle into a running game process
pub struct LiveProcess {
    pid: u32,
    handle: ProcessHandle,
}

impl LiveProcess {
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl std::fmt::Debug for LiveProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveProcess").field("pid", &self.pid).finish()
    }
}

impl ReadMemory for LiveProcess {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>, ReadFailed> {
        let mut buffer = vec![0u8; size];
        self.handle
            .copy_address(address as usize, &mut buffer)
            .map_err(|_| ReadFailed { address, size })?;
        Ok(buffer)
    }
}

/// Process provider backed by the operating system
pub struct LiveProcessProvider {
    system: System,
}

impl LiveProcessProvider {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for LiveProcessProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProvider for LiveProcessProvider {
    type Handle = LiveProcess;

    fn find_process(&mut self, name: &str) -> Option<ProcessInfo> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        self.system.processes().values().find_map(|process| {
            let by_name = process.name().eq_ignore_ascii_case(name);
            let by_exe = process
                .exe()
                .and_then(|exe| exe.file_name())
                .is_some_and(|file| file.eq_ignore_ascii_case(name));

            (by_name || by_exe).then(|| ProcessInfo {
                pid: process.pid().as_u32(),
                name: name.to_string(),
            })
        })
    }

    fn is_alive(&mut self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.system.process(pid).is_some()
    }

    fn attach(&mut self, process: &ProcessInfo) -> Result<Attached<LiveProcess>, ScanError> {
        let handle = (process.pid as process_memory::Pid)
            .try_into_process_handle()
            .map_err(|e| {
                warn!(pid = process.pid, error = %e, "Failed to open process handle");
                ScanError::ProcessUnavailable
            })?;

        let Some(module) = find_main_module(process) else {
            warn!(pid = process.pid, name = %process.name, "Main module not found");
            return Err(ScanError::ProcessUnavailable);
        };

        debug!(
            pid = process.pid,
            base = %format_address(module.base),
            size = module.size,
            "Attached to game process"
        );

        Ok(Attached {
            process: process.clone(),
            handle: LiveProcess {
                pid: process.pid,
                handle,
            },
            module,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main module lookup
// ─────────────────────────────────────────────────────────────────────────────

/// Windows: the first Toolhelp32 module entry is the executable image
#[cfg(target_os = "windows")]
fn find_main_module(process: &ProcessInfo) -> Option<ModuleRange> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, TH32CS_SNAPMODULE,
        TH32CS_SNAPMODULE32,
    };

    // SAFETY: the snapshot handle is closed before returning and `entry` is a
    // properly sized, owned MODULEENTRY32W.
    unsafe {
        let snapshot =
            CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, process.pid).ok()?;

        let mut entry = MODULEENTRY32W {
            dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
            ..Default::default()
        };
        let found = Module32FirstW(snapshot, &mut entry).is_ok();
        let _ = CloseHandle(snapshot);

        found.then(|| ModuleRange {
            base: entry.modBaseAddr as u64,
            size: entry.modBaseSize as u64,
        })
    }
}

/// Linux (native or Wine): union of the mappings backed by the executable
#[cfg(target_os = "linux")]
fn find_main_module(process: &ProcessInfo) -> Option<ModuleRange> {
    let maps = std::fs::read_to_string(format!("/proc/{}/maps", process.pid)).ok()?;
    let (start, end) = module_span_from_maps(&maps, &process.name)?;
    Some(ModuleRange {
        base: start,
        size: end - start,
    })
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn find_main_module(_process: &ProcessInfo) -> Option<ModuleRange> {
    None
}

/// Lowest start and highest end of all mappings whose backing file is `exe_name`.
///
/// Lines look like `7f1234000000-7f1234001000 r-xp 00000000 08:01 1234 /path/game.exe`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn module_span_from_maps(maps: &str, exe_name: &str) -> Option<(u64, u64)> {
    let mut span: Option<(u64, u64)> = None;

    for line in maps.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&path) = parts.get(5) else {
            continue;
        };
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        if !file_name.eq_ignore_ascii_case(exe_name) {
            continue;
        }

        let Some((start, end)) = parts[0].split_once('-') else {
            continue;
        };
        let (Ok(start), Ok(end)) = (
            u64::from_str_radix(start, 16),
            u64::from_str_radix(end, 16),
        ) else {
            continue;
        };

        span = Some(match span {
            Some((lo, hi)) => (lo.min(start), hi.max(end)),
            None => (start, end),
        });
    }

    span.filter(|(start, end)| end > start)
}
