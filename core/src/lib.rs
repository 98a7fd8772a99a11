pub mod context;
pub mod error;
pub mod filter;
pub mod layout;
pub mod memory;
pub mod presets;
pub mod projector;
pub mod radar;
pub mod registry;
pub mod scanner;

// Re-exports for convenience
pub use context::{AppConfig, AppConfigExt};
pub use error::{PresetError, ReadFailed, ScanError};
pub use filter::{OverlaySettings, filter_from_actor, resolve};
pub use layout::{ActorId, ActorRecord, ActorTable, CameraState, DecodeSkip};
pub use presets::{ImportConflict, ImportOutcome, PresetStore};
pub use projector::{ProjectionParams, RenderDecision, project};
pub use radar::{OverlayFrame, Radar, RadarSignal, RadarSignalHandler};
pub use registry::{ActorEntry, ActorRegistry, RegistryDiff};
pub use scanner::{ScanOutcome, ScanTick, Scanner, ScannerState};
