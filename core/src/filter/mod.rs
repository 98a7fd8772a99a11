//! Filter evaluation
//!
//! Turns an actor plus the active preset into [`OverlaySettings`]. Evaluation
//! is pure: the same actor and preset always resolve to the same settings.
//!
//! Resolution order:
//! 1. No active preset: every actor is shown with name-derived defaults.
//! 2. First filter (in stored order) whose predicate holds decides color,
//!    display mode and label.
//! 3. No filter matched: hidden if the preset shows only matching actors,
//!    otherwise defaults.

use ffradar_types::{
    ActorFilter, ActorFilterPreset, ActorType, DisplayMode, FILTER_DEFAULT_COLOR, Rgb,
};

use crate::layout::ActorRecord;

/// Per-actor display decision inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySettings {
    pub visible: bool,
    pub color: Rgb,
    pub label_mode: DisplayMode,
    pub label_text: String,
    /// Selected in the presenter; never set by resolution
    pub highlighted: bool,
}

/// Colors handed out to actors no filter claims
const DEFAULT_PALETTE: [Rgb; 8] = [
    [0xE6, 0x4B, 0x3C],
    [0x2E, 0xCC, 0x71],
    [0x34, 0x98, 0xDB],
    [0xF1, 0xC4, 0x0F],
    [0x9B, 0x59, 0xB6],
    [0x1A, 0xBC, 0x9C],
    [0xE6, 0x7E, 0x22],
    [0xEC, 0xF0, 0xF1],
];

/// 32-bit FNV-1a
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811C_9DC5_u32, |hash, b| {
        (hash ^ *b as u32).wrapping_mul(0x0100_0193)
    })
}

/// Stable palette color for a display name
pub fn name_color(name: &str) -> Rgb {
    DEFAULT_PALETTE[fnv1a(name.as_bytes()) as usize % DEFAULT_PALETTE.len()]
}

/// Settings for an actor no filter decided on
pub fn default_settings(actor: &ActorRecord) -> OverlaySettings {
    OverlaySettings {
        visible: true,
        color: name_color(&actor.display_name),
        label_mode: DisplayMode::WhenClose,
        label_text: actor.display_name.clone(),
        highlighted: false,
    }
}

/// Whether `filter` claims `actor`.
///
/// The local player never matches id-based filters; its npc id is not a kind
/// identifier.
pub fn filter_matches(filter: &ActorFilter, actor: &ActorRecord) -> bool {
    if filter.use_match_npc_id && actor.is_local_player() {
        return false;
    }
    filter.matches(actor.actor_type, actor.npc_id)
}

/// Resolve display settings for one actor
pub fn resolve(actor: &ActorRecord, preset: Option<&ActorFilterPreset>) -> OverlaySettings {
    let Some(preset) = preset else {
        return default_settings(actor);
    };

    match preset.filters.iter().find(|f| filter_matches(f, actor)) {
        Some(filter) => OverlaySettings {
            visible: true,
            color: filter.color,
            label_mode: filter.mode,
            label_text: if filter.has_description_override {
                filter.description.clone()
            } else {
                actor.display_name.clone()
            },
            highlighted: false,
        },
        None if preset.show_only_matching => OverlaySettings {
            visible: false,
            ..default_settings(actor)
        },
        None => default_settings(actor),
    }
}

/// Build a filter pinned to an actor's type and kind.
///
/// Player filters match on type only: players share no meaningful npc id.
pub fn filter_from_actor(actor: &ActorRecord) -> ActorFilter {
    let is_player = actor.actor_type == ActorType::Player;
    ActorFilter {
        description: if is_player {
            String::new()
        } else {
            actor.display_name.clone()
        },
        has_description_override: false,
        match_type: actor.actor_type,
        use_match_type: true,
        match_npc_id: actor.npc_id,
        use_match_npc_id: !is_player,
        mode: DisplayMode::WhenClose,
        color: FILTER_DEFAULT_COLOR,
    }
}
