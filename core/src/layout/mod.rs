//! Foreign memory layout of the actor table and camera block
//!
//! Decoding is pure: given captured bytes it always produces the same records,
//! so every rule here is covered by byte-fixture tests.
//!
//! # Actor slot
//!
//! The actor table is a fixed array of [`ACTOR_SLOT_COUNT`] slots, each
//! [`ACTOR_SLOT_SIZE`] bytes wide.
//!
//! ```text
//! Offset   Field        Size    Description
//! ──────────────────────────────────────────────────────
//! 0x00     Name         64      UTF-8, NUL/space padded
//! 0x40     ObjectId     4       u32, stable identity (0 / 0xE0000000 = none)
//! 0x44     NpcId        4       u32, kind id shared by same-kind actors
//! 0x48     ObjectKind   1       u8 type tag (0 = empty slot)
//! 0x49     SubKind      1       u8 (unused)
//! 0x4C     Flags        4       u32 (unused)
//! 0x50     PosX         4       f32
//! 0x54     PosY         4       f32
//! 0x58     PosZ         4       f32
//! 0x5C     Rotation     4       f32 (unused)
//! ```
//!
//! # Camera block
//!
//! ```text
//! Offset   Field        Size    Description
//! ──────────────────────────────────────────────────────
//! 0x00     Position     12      3×f32
//! 0x0C     Forward      12      3×f32, normalized on decode
//! 0x18     FovY         4       f32 radians
//! ```

#[cfg(test)]
pub(crate) mod fixtures;

use byteorder::{ByteOrder, LE};
use ffradar_types::ActorType;
use glam::Vec3;
use hashbrown::HashSet;
use thiserror::Error;
use tracing::debug;

/// Number of slots in the actor table
pub const ACTOR_SLOT_COUNT: usize = 424;
/// Bytes per actor slot
pub const ACTOR_SLOT_SIZE: usize = 0x60;
/// Total bytes read for one table snapshot
pub const ACTOR_TABLE_SIZE: usize = ACTOR_SLOT_COUNT * ACTOR_SLOT_SIZE;
/// Slot holding the local player
pub const LOCAL_PLAYER_SLOT: u16 = 0;

pub mod slot {
    pub const NAME: usize = 0x00;
    pub const NAME_LEN: usize = 64;
    pub const OBJECT_ID: usize = 0x40;
    pub const NPC_ID: usize = 0x44;
    pub const OBJECT_KIND: usize = 0x48;
    pub const POS_X: usize = 0x50;
    pub const POS_Y: usize = 0x54;
    pub const POS_Z: usize = 0x58;
}

/// Object id the game writes into unused slots
pub const INVALID_OBJECT_ID: u32 = 0xE000_0000;

pub const CAMERA_BLOCK_SIZE: usize = 0x1C;

pub mod camera {
    pub const POSITION: usize = 0x00;
    pub const FORWARD: usize = 0x0C;
    pub const FOV_Y: usize = 0x18;
}

/// Vertical field of view used when the game reports none
pub const DEFAULT_FOV_Y: f32 = 50.0 * std::f32::consts::PI / 180.0;

// ═══════════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════════

/// Stable identity of an actor across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// One decoded actor
#[derive(Debug, Clone, PartialEq)]
pub struct ActorRecord {
    pub stable_id: ActorId,
    /// Kind identifier matched by id-based filters
    pub npc_id: u32,
    pub actor_type: ActorType,
    pub display_name: String,
    pub position: Vec3,
    /// Distance to the local player, filled in by the registry
    pub local_distance: f32,
    pub slot: u16,
}

impl ActorRecord {
    pub fn is_local_player(&self) -> bool {
        self.slot == LOCAL_PLAYER_SLOT && self.actor_type == ActorType::Player
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("unknown type tag {0}")]
    UnknownTag(u8),
    #[error("non-finite position")]
    NonFinitePosition,
    #[error("duplicate object id {0}")]
    DuplicateId(ActorId),
}

/// A malformed slot left out of the batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slot {slot} skipped: {reason}")]
pub struct DecodeSkip {
    pub slot: u16,
    pub reason: SkipReason,
}

/// Result of decoding one actor table snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorTable {
    /// Actors in slot order
    pub actors: Vec<ActorRecord>,
    pub skipped: Vec<DecodeSkip>,
}

impl ActorTable {
    pub fn local_player(&self) -> Option<&ActorRecord> {
        self.actors.iter().find(|a| a.is_local_player())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Unit view direction
    pub forward: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            fov_y: DEFAULT_FOV_Y,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Decoding
// ═══════════════════════════════════════════════════════════════════════════

fn read_vec3(bytes: &[u8]) -> Vec3 {
    Vec3::new(
        LE::read_f32(&bytes[0..4]),
        LE::read_f32(&bytes[4..8]),
        LE::read_f32(&bytes[8..12]),
    )
}

/// Cut at the first NUL, decode lossily and trim padding
fn decode_name(raw: &[u8]) -> String {
    let end = memchr::memchr(0, raw).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

fn decode_slot(index: u16, bytes: &[u8]) -> Option<Result<ActorRecord, DecodeSkip>> {
    let tag = bytes[slot::OBJECT_KIND];
    let object_id = LE::read_u32(&bytes[slot::OBJECT_ID..]);
    if tag == 0 || object_id == 0 || object_id == INVALID_OBJECT_ID {
        return None;
    }

    let skip = |reason| Some(Err(DecodeSkip { slot: index, reason }));

    let Some(actor_type) = ActorType::from_tag(tag) else {
        return skip(SkipReason::UnknownTag(tag));
    };

    let position = read_vec3(&bytes[slot::POS_X..slot::POS_Z + 4]);
    if !position.is_finite() {
        return skip(SkipReason::NonFinitePosition);
    }

    Some(Ok(ActorRecord {
        stable_id: ActorId(object_id),
        npc_id: LE::read_u32(&bytes[slot::NPC_ID..]),
        actor_type,
        display_name: decode_name(&bytes[slot::NAME..slot::NAME + slot::NAME_LEN]),
        position,
        local_distance: f32::INFINITY,
        slot: index,
    }))
}

/// Decode a raw actor table snapshot.
///
/// Empty slots are ignored. Malformed slots are recorded in
/// [`ActorTable::skipped`] and left out; a slot whose object id was already
/// seen earlier in the table is malformed. Trailing bytes that don't fill a
/// whole slot are ignored.
pub fn decode_actor_table(bytes: &[u8]) -> ActorTable {
    let mut table = ActorTable::default();
    let mut seen = HashSet::new();

    for (index, raw) in bytes
        .chunks_exact(ACTOR_SLOT_SIZE)
        .take(ACTOR_SLOT_COUNT)
        .enumerate()
    {
        let index = index as u16;
        let decoded = match decode_slot(index, raw) {
            None => continue,
            Some(Ok(actor)) if !seen.insert(actor.stable_id) => Err(DecodeSkip {
                slot: index,
                reason: SkipReason::DuplicateId(actor.stable_id),
            }),
            Some(result) => result,
        };

        match decoded {
            Ok(actor) => table.actors.push(actor),
            Err(skip) => {
                debug!(slot = skip.slot, reason = %skip.reason, "Skipped malformed actor slot");
                table.skipped.push(skip);
            }
        }
    }

    table
}

/// Decode the camera block. Returns `None` when the buffer is short, any
/// component is non-finite, or the forward vector is zero.
pub fn decode_camera(bytes: &[u8]) -> Option<CameraState> {
    if bytes.len() < CAMERA_BLOCK_SIZE {
        return None;
    }

    let position = read_vec3(&bytes[camera::POSITION..camera::POSITION + 12]);
    let forward = read_vec3(&bytes[camera::FORWARD..camera::FORWARD + 12]);
    if !position.is_finite() || !forward.is_finite() {
        return None;
    }
    let forward = forward.try_normalize()?;

    let fov_y = LE::read_f32(&bytes[camera::FOV_Y..]);
    let fov_y = if fov_y.is_finite() && fov_y > 0.0 {
        fov_y
    } else {
        DEFAULT_FOV_Y
    };

    Some(CameraState {
        position,
        forward,
        fov_y,
    })
}
