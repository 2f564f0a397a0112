use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::common::PlayerSlot;
use crate::pipeline::types::{JumpState, KickState, Movement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, Deserialize)]
pub struct PlayerControls {
    pub movement: Movement,
    pub jump: JumpState,
    pub kick: KickState,
}

impl PlayerControls {
    pub fn is_at_rest(&self) -> bool {
        *self == Self::default()
    }

    /// `movement`, `jump` and `kick` as their wire strings.
    pub fn to_fields(&self) -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("movement", self.movement.as_str()),
            ("jump", self.jump.as_str()),
            ("kick", self.kick.as_str()),
        ])
    }
}

/// Controls for both players. Always holds exactly players 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    players: [PlayerControls; 2],
}

impl ControlState {
    pub fn rest() -> Self {
        Self::default()
    }

    pub fn get(&self, player: PlayerSlot) -> &PlayerControls {
        &self.players[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerSlot) -> &mut PlayerControls {
        &mut self.players[player.index()]
    }

    pub fn is_at_rest(&self) -> bool {
        self.players.iter().all(PlayerControls::is_at_rest)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerSlot, &PlayerControls)> {
        PlayerSlot::ALL.into_iter().zip(self.players.iter())
    }

    pub fn to_map(&self) -> BTreeMap<u8, BTreeMap<&'static str, &'static str>> {
        self.iter()
            .map(|(player, controls)| (player.number(), controls.to_fields()))
            .collect()
    }
}

impl Serialize for ControlState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.players.len()))?;
        for (player, controls) in self.iter() {
            map.serialize_entry(&player.number(), controls)?;
        }
        map.end()
    }
}
