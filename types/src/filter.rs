//! Actor filter and preset types
//!
//! A preset is an ordered list of filters plus a visibility policy. Filters
//! are evaluated in stored order and the first match wins, so the order of
//! `ActorFilterPreset::filters` is user-visible behavior.
//!
//! These types double as the preset interchange format (camelCase JSON) and
//! as the persisted settings layout.

use serde::{Deserialize, Serialize};

/// RGB color triple
pub type Rgb = [u8; 3];

/// Color given to filters created without an explicit choice
pub const FILTER_DEFAULT_COLOR: Rgb = [128, 128, 128];

// ═══════════════════════════════════════════════════════════════════════════
// Actor Type
// ═══════════════════════════════════════════════════════════════════════════

/// Kind of in-game entity, as tagged in the actor table.
///
/// Discriminants are the raw tag values found in game memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActorType {
    Player = 1,
    #[default]
    Monster = 2,
    Npc = 3,
    Treasure = 4,
    Aetheryte = 5,
    Gathering = 6,
    EventObject = 7,
    Mount = 8,
    Minion = 9,
    Retainer = 10,
    Area = 11,
    Housing = 12,
    Cutscene = 13,
    CardStand = 14,
}

impl ActorType {
    /// Every actor type, in tag order
    pub const ALL: [ActorType; 14] = [
        Self::Player,
        Self::Monster,
        Self::Npc,
        Self::Treasure,
        Self::Aetheryte,
        Self::Gathering,
        Self::EventObject,
        Self::Mount,
        Self::Minion,
        Self::Retainer,
        Self::Area,
        Self::Housing,
        Self::Cutscene,
        Self::CardStand,
    ];

    /// Map a raw memory tag to a type. Returns `None` for unknown tags.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| *t as u8 == tag)
    }

    /// Short name used in actor lists
    pub fn label(&self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Monster => "Monster",
            Self::Npc => "NPC",
            Self::Treasure => "Treasure",
            Self::Aetheryte => "Aetheryte",
            Self::Gathering => "Gathering",
            Self::EventObject => "Object",
            Self::Mount => "Mount",
            Self::Minion => "Minion",
            Self::Retainer => "Retainer",
            Self::Area => "Area",
            Self::Housing => "Housing",
            Self::Cutscene => "Cutscene",
            Self::CardStand => "CardStand",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Display Mode
// ═══════════════════════════════════════════════════════════════════════════

/// When an actor's overlay marker is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Within close range of the local player
    #[default]
    WhenClose,
    /// Inside the camera's look-at cone
    WhenLookingAt,
    /// Both close and looked at
    WhenCloseAndLookingAt,
}

impl DisplayMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::WhenClose => "Close",
            Self::WhenLookingAt => "Look at",
            Self::WhenCloseAndLookingAt => "Close & Look at",
        }
    }

    pub fn requires_close(&self) -> bool {
        matches!(self, Self::WhenClose | Self::WhenCloseAndLookingAt)
    }

    pub fn requires_look_at(&self) -> bool {
        matches!(self, Self::WhenLookingAt | Self::WhenCloseAndLookingAt)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Filters
// ═══════════════════════════════════════════════════════════════════════════

/// One match rule mapping actor attributes to display overrides.
///
/// A filter with neither `use_match_type` nor `use_match_npc_id` set is legal
/// but matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActorFilter {
    /// Label text, also shown as the rule name in editors
    pub description: String,
    /// Replace the actor's own name with `description` on the overlay
    pub has_description_override: bool,

    // ─── Matching ───────────────────────────────────────────────────────────
    pub match_type: ActorType,
    pub use_match_type: bool,
    pub match_npc_id: u32,
    pub use_match_npc_id: bool,

    // ─── Display ────────────────────────────────────────────────────────────
    pub mode: DisplayMode,
    pub color: Rgb,
}

impl Default for ActorFilter {
    fn default() -> Self {
        Self {
            description: String::new(),
            has_description_override: false,
            match_type: ActorType::default(),
            use_match_type: false,
            match_npc_id: 0,
            use_match_npc_id: false,
            mode: DisplayMode::default(),
            color: FILTER_DEFAULT_COLOR,
        }
    }
}

impl ActorFilter {
    /// Check the rule's match predicate against actor attributes.
    ///
    /// Both flags off means the rule never matches, so an empty rule can't
    /// accidentally catch every actor.
    pub fn matches(&self, actor_type: ActorType, npc_id: u32) -> bool {
        if !self.use_match_type && !self.use_match_npc_id {
            return false;
        }
        (!self.use_match_type || self.match_type == actor_type)
            && (!self.use_match_npc_id || self.match_npc_id == npc_id)
    }

    /// Name shown for this rule in filter lists
    pub fn summary_label(&self) -> &str {
        if self.use_match_npc_id {
            &self.description
        } else {
            "(multiple)"
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Presets
// ═══════════════════════════════════════════════════════════════════════════

/// Named, ordered collection of filters plus a visibility policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorFilterPreset {
    pub name: String,
    /// Hide actors that no filter matches
    #[serde(default)]
    pub show_only_matching: bool,
    /// Evaluation order is match priority
    #[serde(default)]
    pub filters: Vec<ActorFilter>,
}

impl ActorFilterPreset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            show_only_matching: false,
            filters: Vec::new(),
        }
    }
}
