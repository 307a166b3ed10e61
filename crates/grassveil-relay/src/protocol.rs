//! Relay protocol - newline-delimited JSON message definitions

use serde::{Deserialize, Serialize};

/// World-space coordinate triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3Msg {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3Msg {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Public view of a connected player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: u64,
    pub position: Vec3Msg,
    pub direction: Vec3Msg,
    /// 0xRRGGBB
    pub color: u32,
}

/// Messages sent from a game client to the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// The sender moved
    PlayerUpdate { position: Vec3Msg, direction: Vec3Msg },
    /// The sender flattened grass around a point
    GrassBent { position: Vec3Msg, radius: f32 },
    /// Chat line to everyone
    ChatMessage { message: String },
}

/// Messages sent from the relay to game clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// First message on a new connection: your id and everyone present
    Init {
        #[serde(rename = "playerId")]
        player_id: u64,
        players: Vec<PlayerInfo>,
    },
    PlayerJoined { player: PlayerInfo },
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: u64,
    },
    PlayerMoved {
        #[serde(rename = "playerId")]
        player_id: u64,
        position: Vec3Msg,
        direction: Vec3Msg,
    },
    GrassBent {
        #[serde(rename = "playerId")]
        player_id: u64,
        position: Vec3Msg,
        radius: f32,
    },
    ChatMessage {
        #[serde(rename = "playerId")]
        player_id: u64,
        message: String,
        #[serde(rename = "playerName")]
        player_name: String,
    },
}
