//! Shared types for ffradar
//!
//! Everything here is plain data: the filter/preset model that users author
//! and exchange, the scanner and overlay configuration blocks, and the
//! display formatting helpers shared by the core and the CLI presenter.

pub mod config;
pub mod filter;
pub mod formatting;

pub use config::{OverlayConfig, ScannerConfig, SignatureConfig, SignatureKind, UpdateConfig};
pub use filter::{
    ActorFilter, ActorFilterPreset, ActorType, DisplayMode, FILTER_DEFAULT_COLOR, Rgb,
};
