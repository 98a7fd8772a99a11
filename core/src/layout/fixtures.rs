//! Byte fixture builders for layout, scanner and radar tests

use ffradar_types::ActorType;
use glam::Vec3;

use super::{ACTOR_TABLE_SIZE, ACTOR_SLOT_SIZE, CAMERA_BLOCK_SIZE, camera, slot};

/// Builds a raw actor table one slot at a time
#[derive(Debug, Clone)]
pub struct TableBuilder {
    bytes: Vec<u8>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self {
            bytes: vec![0; ACTOR_TABLE_SIZE],
        }
    }
}

impl TableBuilder {
    /// Write an actor into `index` with a raw type tag
    pub fn raw_slot(
        mut self,
        index: usize,
        object_id: u32,
        npc_id: u32,
        tag: u8,
        name: &str,
        position: [f32; 3],
    ) -> Self {
        let base = index * ACTOR_SLOT_SIZE;
        let raw = &mut self.bytes[base..base + ACTOR_SLOT_SIZE];
        raw.fill(0);

        let name = name.as_bytes();
        raw[slot::NAME..slot::NAME + name.len()].copy_from_slice(name);
        raw[slot::OBJECT_ID..slot::OBJECT_ID + 4].copy_from_slice(&object_id.to_le_bytes());
        raw[slot::NPC_ID..slot::NPC_ID + 4].copy_from_slice(&npc_id.to_le_bytes());
        raw[slot::OBJECT_KIND] = tag;
        raw[slot::POS_X..slot::POS_X + 4].copy_from_slice(&position[0].to_le_bytes());
        raw[slot::POS_Y..slot::POS_Y + 4].copy_from_slice(&position[1].to_le_bytes());
        raw[slot::POS_Z..slot::POS_Z + 4].copy_from_slice(&position[2].to_le_bytes());
        self
    }

    pub fn actor(
        self,
        index: usize,
        object_id: u32,
        npc_id: u32,
        actor_type: ActorType,
        name: &str,
        position: [f32; 3],
    ) -> Self {
        self.raw_slot(index, object_id, npc_id, actor_type as u8, name, position)
    }

    /// Local player in slot 0
    pub fn player(self, object_id: u32, name: &str, position: [f32; 3]) -> Self {
        self.actor(0, object_id, 0, ActorType::Player, name, position)
    }

    pub fn clear(mut self, index: usize) -> Self {
        let base = index * ACTOR_SLOT_SIZE;
        self.bytes[base..base + ACTOR_SLOT_SIZE].fill(0);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Raw camera block
pub fn camera_bytes(position: Vec3, forward: Vec3, fov_y: f32) -> Vec<u8> {
    let mut bytes = vec![0u8; CAMERA_BLOCK_SIZE];
    for (offset, v) in [(camera::POSITION, position), (camera::FORWARD, forward)] {
        for (i, c) in v.to_array().iter().enumerate() {
            bytes[offset + i * 4..offset + i * 4 + 4].copy_from_slice(&c.to_le_bytes());
        }
    }
    bytes[camera::FOV_Y..camera::FOV_Y + 4].copy_from_slice(&fov_y.to_le_bytes());
    bytes
}
