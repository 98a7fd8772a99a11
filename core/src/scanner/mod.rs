//! Acquisition state machine
//!
//! The scanner owns the process handle and the resolved memory paths and
//! advances at most one acquisition step per tick:
//!
//! | State             | Tick does                        | On success        | On failure                 |
//! |-------------------|----------------------------------|-------------------|----------------------------|
//! | `MissingProcess`  | find + attach the game process   | `MissingMemPaths` | stay                       |
//! | `MissingMemPaths` | resolve table + camera addresses | `Ready`           | stay                       |
//! | `Ready`           | read + decode a snapshot         | stay, `Snapshot`  | `MissingMemPaths`, `Lost`  |
//!
//! From any state a dead process drops back to `MissingProcess`.


use ffradar_types::ScannerConfig;
use ffradar_types::formatting::format_address;
use tracing::{debug, info, warn};

use crate::error::ScanError;
use crate::layout::{
    ACTOR_TABLE_SIZE, ActorTable, CAMERA_BLOCK_SIZE, CameraState, decode_actor_table,
    decode_camera,
};
use crate::memory::{Attached, ProcessInfo, ProcessProvider, ReadMemory, resolve_signature};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerState {
    MissingProcess,
    MissingMemPaths,
    Ready,
}

impl ScannerState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingProcess => "waiting for game process",
            Self::MissingMemPaths => "resolving memory paths",
            Self::Ready => "ready",
        }
    }
}

impl std::fmt::Display for ScannerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved addresses of the game data blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemPaths {
    pub actor_table: u64,
    pub camera: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// No snapshot this tick
    Idle,
    Snapshot(ActorTable, CameraState),
    /// A previously readable snapshot is gone; consumers drop their actors
    Lost,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanTick {
    /// New state, set only when the state changed this tick
    pub transition: Option<ScannerState>,
    pub outcome: ScanOutcome,
}

pub struct Scanner<P: ProcessProvider> {
    provider: P,
    config: ScannerConfig,
    state: ScannerState,
    attached: Option<Attached<P::Handle>>,
    paths: Option<MemPaths>,
    last_camera: CameraState,
}

impl<P: ProcessProvider> Scanner<P> {
    pub fn new(provider: P, config: ScannerConfig) -> Self {
        Self {
            provider,
            config,
            state: ScannerState::MissingProcess,
            attached: None,
            paths: None,
            last_camera: CameraState::default(),
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn process(&self) -> Option<&ProcessInfo> {
        self.attached.as_ref().map(|a| &a.process)
    }

    pub fn paths(&self) -> Option<MemPaths> {
        self.paths
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Run one acquisition step
    pub fn tick(&mut self) -> ScanTick {
        let previous = self.state;

        let outcome = if self.process_lost() {
            info!("Game process exited");
            let had_snapshot = previous == ScannerState::Ready;
            self.detach();
            if had_snapshot {
                ScanOutcome::Lost
            } else {
                ScanOutcome::Idle
            }
        } else {
            match self.state {
                ScannerState::MissingProcess => {
                    self.try_attach();
                    ScanOutcome::Idle
                }
                ScannerState::MissingMemPaths => {
                    self.try_resolve();
                    ScanOutcome::Idle
                }
                ScannerState::Ready => self.read_snapshot(),
            }
        };

        let transition = (self.state != previous).then_some(self.state);
        if let Some(state) = transition {
            debug!(from = ?previous, to = ?state, "Scanner state changed");
        }

        ScanTick {
            transition,
            outcome,
        }
    }

    fn process_lost(&mut self) -> bool {
        match &self.attached {
            Some(attached) => !self.provider.is_alive(attached.process.pid),
            None => false,
        }
    }

    fn detach(&mut self) {
        self.attached = None;
        self.paths = None;
        self.state = ScannerState::MissingProcess;
    }

    fn try_attach(&mut self) {
        let Some(process) = self.provider.find_process(&self.config.process_name) else {
            return;
        };

        match self.provider.attach(&process) {
            Ok(attached) => {
                info!(pid = process.pid, name = %process.name, "Found game process");
                self.attached = Some(attached);
                self.state = ScannerState::MissingMemPaths;
            }
            Err(e) => {
                debug!(pid = process.pid, error = %e, "Attach failed, retrying next tick");
            }
        }
    }

    fn try_resolve(&mut self) {
        let Some(attached) = &self.attached else {
            self.state = ScannerState::MissingProcess;
            return;
        };

        let resolve = || -> Result<MemPaths, ScanError> {
            Ok(MemPaths {
                actor_table: resolve_signature(
                    &attached.handle,
                    attached.module,
                    &self.config.actor_table,
                )?,
                camera: resolve_signature(&attached.handle, attached.module, &self.config.camera)?,
            })
        };

        match resolve() {
            Ok(paths) => {
                info!(
                    actor_table = %format_address(paths.actor_table),
                    camera = %format_address(paths.camera),
                    "Memory paths resolved"
                );
                self.paths = Some(paths);
                self.state = ScannerState::Ready;
            }
            Err(e) => {
                debug!(error = %e, "Memory paths not resolved yet");
            }
        }
    }

    fn read_snapshot(&mut self) -> ScanOutcome {
        let (Some(attached), Some(paths)) = (&self.attached, self.paths) else {
            self.paths = None;
            self.state = ScannerState::MissingMemPaths;
            return ScanOutcome::Lost;
        };

        let read = || -> Result<(Vec<u8>, Vec<u8>), ScanError> {
            let table = attached.handle.read_bytes(paths.actor_table, ACTOR_TABLE_SIZE)?;
            let camera = attached.handle.read_bytes(paths.camera, CAMERA_BLOCK_SIZE)?;
            Ok((table, camera))
        };

        match read() {
            Ok((table_bytes, camera_bytes)) => {
                let table = decode_actor_table(&table_bytes);
                match decode_camera(&camera_bytes) {
                    Some(camera) => self.last_camera = camera,
                    None => debug!("Malformed camera block, keeping previous camera"),
                }
                ScanOutcome::Snapshot(table, self.last_camera)
            }
            Err(e) => {
                warn!(error = %e, "Snapshot read failed, re-resolving memory paths");
                self.paths = None;
                self.state = ScannerState::MissingMemPaths;
                ScanOutcome::Lost
            }
        }
    }
}
