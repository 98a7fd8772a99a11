//! Tick orchestration
//!
//! [`Radar`] owns the scanner, the actor registry and the preset store, and
//! is the only place they are mutated. Each tick runs the whole pipeline
//! (scan → registry diff → filter resolution) and dispatches the resulting
//! signals to registered handlers.
//!
//! Signal order within one tick:
//! 1. `ScannerStateChanged` (at most one)
//! 2. `ActorsChanged` (only when membership changed)
//! 3. `ActorsRefreshed` (every successful snapshot)


use ffradar_types::{ActorFilter, ActorFilterPreset};
use glam::Mat4;
use tracing::{debug, info};

use crate::context::AppConfig;
use crate::error::PresetError;
use crate::filter::{filter_from_actor, resolve};
use crate::layout::{ActorId, CameraState};
use crate::memory::ProcessProvider;
use crate::presets::{FilterListExt, ImportConflict, ImportOutcome, PresetStore};
use crate::projector::{ProjectionParams, RenderDecision, project_with, view_projection};
use crate::registry::ActorRegistry;
use crate::scanner::{ScanOutcome, Scanner, ScannerState};

// ═══════════════════════════════════════════════════════════════════════════
// Signals
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadarSignal {
    ScannerStateChanged(ScannerState),
    ActorsChanged {
        added: Vec<ActorId>,
        removed: Vec<ActorId>,
    },
    /// Positions, distances or settings of tracked actors changed
    ActorsRefreshed,
}

/// Observer for radar signals. Handlers get read access to the registry
/// as it is after the tick.
pub trait RadarSignalHandler {
    fn handle_signal(&mut self, signal: &RadarSignal, registry: &ActorRegistry);

    fn handle_signals(&mut self, signals: &[RadarSignal], registry: &ActorRegistry) {
        for signal in signals {
            self.handle_signal(signal, registry);
        }
    }
}

/// Render decisions for every tracked actor, in registry order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayFrame {
    pub decisions: Vec<RenderDecision>,
}

impl OverlayFrame {
    pub fn drawn(&self) -> impl Iterator<Item = &RenderDecision> {
        self.decisions.iter().filter(|d| d.draw)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Radar
// ═══════════════════════════════════════════════════════════════════════════

pub struct Radar<P: ProcessProvider> {
    scanner: Scanner<P>,
    registry: ActorRegistry,
    presets: PresetStore,
    projection: ProjectionParams,
    camera: Option<CameraState>,
    /// While set, ticks leave the scanner and registry untouched
    paused: bool,
    signal_handlers: Vec<Box<dyn RadarSignalHandler>>,
}

impl<P: ProcessProvider> Radar<P> {
    pub fn new(provider: P, config: &AppConfig) -> Self {
        Self {
            scanner: Scanner::new(provider, config.scanner.clone()),
            registry: ActorRegistry::new(),
            presets: config.presets.clone(),
            projection: ProjectionParams::from(&config.overlay),
            camera: None,
            paused: false,
            signal_handlers: Vec::new(),
        }
    }

    /// Register a handler to receive radar signals
    pub fn add_signal_handler(&mut self, handler: Box<dyn RadarSignalHandler>) {
        self.signal_handlers.push(handler);
    }

    pub fn scanner_state(&self) -> ScannerState {
        self.scanner.state()
    }

    pub fn scanner(&self) -> &Scanner<P> {
        &self.scanner
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn camera(&self) -> Option<&CameraState> {
        self.camera.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze or resume actor updates. The last snapshot stays queryable.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!(paused, "Actor updates {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Run one scan → diff → resolve pass and dispatch its signals
    pub fn tick(&mut self) -> Vec<RadarSignal> {
        if self.paused {
            return Vec::new();
        }
        let tick = self.scanner.tick();
        let mut signals = Vec::new();

        if let Some(state) = tick.transition {
            signals.push(RadarSignal::ScannerStateChanged(state));
        }

        match tick.outcome {
            ScanOutcome::Idle => {}
            ScanOutcome::Lost => {
                self.camera = None;
                let removed = self.registry.clear();
                if !removed.is_empty() {
                    debug!(removed = removed.len(), "Cleared actors after losing the snapshot");
                    signals.push(RadarSignal::ActorsChanged {
                        added: Vec::new(),
                        removed,
                    });
                }
            }
            ScanOutcome::Snapshot(table, camera) => {
                self.camera = Some(camera);
                let preset = self.presets.active();
                let diff = self
                    .registry
                    .update(table.actors, |actor| resolve(actor, preset));
                if !diff.is_empty() {
                    signals.push(RadarSignal::ActorsChanged {
                        added: diff.added,
                        removed: diff.removed,
                    });
                }
                signals.push(RadarSignal::ActorsRefreshed);
            }
        }

        self.dispatch_signals(&signals);
        signals
    }

    fn dispatch_signals(&mut self, signals: &[RadarSignal]) {
        if signals.is_empty() {
            return;
        }
        for handler in &mut self.signal_handlers {
            handler.handle_signals(signals, &self.registry);
        }
    }

    /// Re-resolve every tracked actor against the active preset
    fn reresolve(&mut self) {
        let preset = self.presets.active();
        self.registry.reresolve(|actor| resolve(actor, preset));
        if !self.registry.is_empty() {
            self.dispatch_signals(&[RadarSignal::ActorsRefreshed]);
        }
    }

    /// Render decisions for the current camera. Empty until the first snapshot.
    pub fn frame(&self) -> OverlayFrame {
        let Some(camera) = &self.camera else {
            return OverlayFrame::default();
        };
        let view_proj: Mat4 = view_projection(camera, self.projection.viewport);

        OverlayFrame {
            decisions: self
                .registry
                .iter()
                .map(|entry| {
                    project_with(&entry.record, &entry.settings, camera, &self.projection, &view_proj)
                })
                .collect(),
        }
    }

    // ─── Selection ──────────────────────────────────────────────────────────

    /// Highlight one actor (or none). Returns false for unknown ids.
    pub fn select_actor(&mut self, id: Option<ActorId>) -> bool {
        let changed = self.registry.set_highlighted(id);
        if changed {
            self.dispatch_signals(&[RadarSignal::ActorsRefreshed]);
        }
        changed
    }

    // ─── Preset store ───────────────────────────────────────────────────────

    pub fn select_preset(&mut self, name: Option<&str>) -> Result<(), PresetError> {
        self.presets.set_active(name)?;
        info!(preset = ?name, "Selected preset");
        self.reresolve();
        Ok(())
    }

    /// Add and select a fresh `Preset#N`
    pub fn add_preset(&mut self) -> Option<String> {
        let name = self.presets.add_preset()?.name.clone();
        self.reresolve();
        Some(name)
    }

    pub fn import_preset(
        &mut self,
        text: &str,
        on_conflict: ImportConflict,
    ) -> Result<ImportOutcome, PresetError> {
        let outcome = self.presets.import(text, on_conflict)?;
        if outcome != ImportOutcome::Cancelled {
            self.reresolve();
        }
        Ok(outcome)
    }

    pub fn export_preset(&self, name: &str) -> Result<String, PresetError> {
        self.presets.export(name)
    }

    pub fn delete_preset(&mut self, name: &str) -> Result<ActorFilterPreset, PresetError> {
        let removed = self.presets.delete(name)?;
        self.reresolve();
        Ok(removed)
    }

    // ─── Active preset editing ──────────────────────────────────────────────

    fn edit_active<T>(
        &mut self,
        edit: impl FnOnce(&mut ActorFilterPreset) -> Result<T, PresetError>,
    ) -> Result<T, PresetError> {
        let preset = self
            .presets
            .active_mut()
            .ok_or(PresetError::NoActivePreset)?;
        let result = edit(preset)?;
        self.reresolve();
        Ok(result)
    }

    pub fn push_filter(&mut self, filter: ActorFilter) -> Result<(), PresetError> {
        self.edit_active(|preset| {
            preset.push_filter(filter);
            Ok(())
        })
    }

    /// Append a filter pinned to a tracked actor's type and kind
    pub fn push_filter_for_actor(&mut self, id: ActorId) -> Result<ActorFilter, PresetError> {
        let entry = self
            .registry
            .get(id)
            .ok_or(PresetError::UnknownActor(id.0))?;
        let filter = filter_from_actor(&entry.record);
        self.push_filter(filter.clone())?;
        Ok(filter)
    }

    pub fn remove_filter(&mut self, index: usize) -> Result<ActorFilter, PresetError> {
        self.edit_active(|preset| preset.remove_filter(index))
    }

    pub fn move_filter(&mut self, from: usize, to: usize) -> Result<(), PresetError> {
        self.edit_active(|preset| preset.move_filter(from, to))
    }

    pub fn replace_filter(&mut self, index: usize, filter: ActorFilter) -> Result<(), PresetError> {
        self.edit_active(|preset| preset.replace_filter(index, filter))
    }

    pub fn set_show_only_matching(&mut self, enabled: bool) -> Result<(), PresetError> {
        self.edit_active(|preset| {
            preset.show_only_matching = enabled;
            Ok(())
        })
    }
}
