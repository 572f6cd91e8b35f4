//! Wire protocol shared by the relay server and its clients.
//!
//! Every frame on the wire is a JSON text message shaped as
//! `{"event": "<name>", "data": <payload>}`. Connection identifiers always
//! travel as strings, including when they are used as map keys.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

pub const SPAWN_X: f64 = 0.0;
pub const SPAWN_Y: f64 = 0.0;
pub const PLAYER_RADIUS: f64 = 20.0;
pub const DEFAULT_PORT: u16 = 3000;

/// Handshake response header carrying the id the transport assigned to the connection.
pub const CONNECTION_ID_HEADER: &str = "x-connection-id";

/// Opaque per-connection token. Never reused within a server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConnectionId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Serialize for ConnectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConnectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Position state of one connected player.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl PlayerState {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    /// State every player starts with on connect.
    pub fn spawn() -> Self {
        Self::new(SPAWN_X, SPAWN_Y, PLAYER_RADIUS)
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::spawn()
    }
}

/// Payload of `playerMovement`. Values are taken as-is, without range checks.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Movement {
    pub x: f64,
    pub y: f64,
}

/// Messages a client may send.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    PlayerMovement(Movement),
}

/// Messages the server emits.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full registry snapshot, sent only to a newly connected client.
    CurrentPlayers(HashMap<ConnectionId, PlayerState>),
    NewPlayer {
        id: ConnectionId,
        #[serde(rename = "playerData")]
        player_data: PlayerState,
    },
    PlayerMoved {
        id: ConnectionId,
        x: f64,
        y: f64,
    },
    PlayerDisconnected(ConnectionId),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encodes a message into the JSON text carried by one frame.
pub fn encode<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

/// Decodes one text frame. Fails on unknown events and on payloads missing required fields.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use serde_json::{json, Value};

    fn to_value<T: Serialize>(message: &T) -> Value {
        serde_json::from_str(&encode(message).unwrap()).unwrap()
    }

    #[test]
    fn test_spawn_state() {
        let player = PlayerState::spawn();
        assert_eq!(player.x, 0.0);
        assert_eq!(player.y, 0.0);
        assert_eq!(player.radius, 20.0);
        assert_eq!(PlayerState::default(), player);
    }

    #[test]
    fn test_connection_id_display_and_parse() {
        let id = ConnectionId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!("42".parse::<ConnectionId>().unwrap(), id);
        assert!("abc".parse::<ConnectionId>().is_err());
        assert!("".parse::<ConnectionId>().is_err());
    }

    #[test]
    fn test_connection_id_is_a_json_string() {
        assert_eq!(to_value(&ConnectionId::new(7)), json!("7"));
        assert!(serde_json::from_str::<ConnectionId>("7").is_err());
        assert_eq!(
            serde_json::from_str::<ConnectionId>("\"7\"").unwrap(),
            ConnectionId::new(7)
        );
    }

    #[test]
    fn test_decode_player_movement() {
        let message: ClientMessage =
            decode(r#"{"event":"playerMovement","data":{"x":5,"y":10.5}}"#).unwrap();

        match message {
            ClientMessage::PlayerMovement(movement) => {
                assert_approx_eq!(movement.x, 5.0);
                assert_approx_eq!(movement.y, 10.5);
            }
        }
    }

    #[test]
    fn test_decode_movement_accepts_any_magnitude() {
        let message: ClientMessage =
            decode(r#"{"event":"playerMovement","data":{"x":-1e9,"y":123456789.25}}"#).unwrap();

        assert_eq!(
            message,
            ClientMessage::PlayerMovement(Movement {
                x: -1e9,
                y: 123456789.25
            })
        );
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        let malformed = [
            "",
            "not json",
            r#"{"event":"playerMovement"}"#,
            r#"{"event":"playerMovement","data":{"x":1}}"#,
            r#"{"event":"playerMovement","data":{"x":"1","y":2}}"#,
            r#"{"event":"teleport","data":{"x":1,"y":2}}"#,
            r#"{"data":{"x":1,"y":2}}"#,
        ];

        for text in malformed {
            assert!(
                decode::<ClientMessage>(text).is_err(),
                "should reject {:?}",
                text
            );
        }
    }

    #[test]
    fn test_current_players_shape() {
        let mut players = HashMap::new();
        players.insert(ConnectionId::new(1), PlayerState::spawn());
        players.insert(ConnectionId::new(2), PlayerState::new(5.0, 10.0, 20.0));

        let value = to_value(&ServerMessage::CurrentPlayers(players));

        assert_eq!(value["event"], "currentPlayers");
        assert_eq!(value["data"]["1"], json!({"x": 0.0, "y": 0.0, "radius": 20.0}));
        assert_eq!(value["data"]["2"], json!({"x": 5.0, "y": 10.0, "radius": 20.0}));
    }

    #[test]
    fn test_new_player_shape() {
        let value = to_value(&ServerMessage::NewPlayer {
            id: ConnectionId::new(3),
            player_data: PlayerState::spawn(),
        });

        assert_eq!(
            value,
            json!({
                "event": "newPlayer",
                "data": {"id": "3", "playerData": {"x": 0.0, "y": 0.0, "radius": 20.0}}
            })
        );
    }

    #[test]
    fn test_player_moved_shape() {
        let value = to_value(&ServerMessage::PlayerMoved {
            id: ConnectionId::new(2),
            x: 5.0,
            y: 10.0,
        });

        assert_eq!(
            value,
            json!({"event": "playerMoved", "data": {"id": "2", "x": 5.0, "y": 10.0}})
        );
    }

    #[test]
    fn test_player_disconnected_carries_bare_id() {
        let value = to_value(&ServerMessage::PlayerDisconnected(ConnectionId::new(9)));
        assert_eq!(value, json!({"event": "playerDisconnected", "data": "9"}));
    }

    #[test]
    fn test_server_message_decodes_from_wire_text() {
        let text = r#"{"event":"currentPlayers","data":{"4":{"x":1,"y":2,"radius":20}}}"#;
        let message: ServerMessage = decode(text).unwrap();

        match message {
            ServerMessage::CurrentPlayers(players) => {
                assert_eq!(players.len(), 1);
                assert_eq!(
                    players.get(&ConnectionId::new(4)),
                    Some(&PlayerState::new(1.0, 2.0, 20.0))
                );
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }
}
