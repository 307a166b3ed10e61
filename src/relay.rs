//! Payloads exchanged with the position relay.
//!
//! The core never talks to the network itself. It parses remote position
//! messages handed to it by the transport layer and produces outbound
//! `LocalMove` reports for the transport to send. Remote input is untrusted:
//! malformed coordinates are rejected before they reach the simulation.

use serde::Serialize;
use serde_json::Value;

use crate::core::types::{ActorId, Vec3};
use crate::core::{Error, Result};
use crate::math::planar_distance;

/// Height assumed when a remote position omits `y`.
pub const DEFAULT_ACTOR_HEIGHT: f32 = 0.2;

/// Coordinate triple as it appears on the wire (`{"x":..,"y":..,"z":..}`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WireVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for WireVec3 {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

/// A remote actor reported a new position.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteUpdate {
    pub actor_id: ActorId,
    pub position: Vec3,
    pub direction: Option<Vec3>,
}

impl RemoteUpdate {
    /// Parse a relay message such as
    /// `{"type":"playerMoved","playerId":7,"position":{"x":1,"z":2}}`.
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let actor_id = match value.get("playerId") {
            Some(Value::String(s)) if !s.is_empty() => ActorId::from(s.as_str()),
            Some(Value::Number(n)) => ActorId::new(n.to_string()),
            other => {
                return Err(Error::InvalidPosition(format!(
                    "missing or invalid playerId: {:?}",
                    other
                )));
            }
        };

        let position = value
            .get("position")
            .ok_or_else(|| {
                Error::InvalidPosition(format!("update from {} has no position", actor_id))
            })
            .and_then(parse_position)?;

        // A broken direction only costs us the facing hint.
        let direction = value.get("direction").and_then(|d| parse_vec3(d).ok());

        Ok(Self {
            actor_id,
            position,
            direction,
        })
    }
}

/// Outbound "local actor moved" report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalMove {
    pub position: Vec3,
    pub direction: Vec3,
}

#[derive(Serialize)]
#[serde(tag = "type", rename = "playerUpdate")]
struct PlayerUpdateMessage {
    position: WireVec3,
    direction: WireVec3,
}

impl LocalMove {
    /// Encode as the relay's `playerUpdate` message.
    pub fn to_json(&self) -> Result<String> {
        let msg = PlayerUpdateMessage {
            position: self.position.into(),
            direction: self.direction.into(),
        };
        Ok(serde_json::to_string(&msg)?)
    }
}

/// Decides when the local actor has moved enough to be worth reporting.
#[derive(Clone, Debug)]
pub struct MovementReporter {
    epsilon: f32,
    last_reported: Option<Vec3>,
}

impl MovementReporter {
    pub fn new(epsilon: f32) -> Self {
        Self {
            epsilon,
            last_reported: None,
        }
    }

    /// Returns a report if this is the first observation or the actor moved
    /// more than `epsilon` (ground plane) since the last report.
    pub fn observe(&mut self, position: Vec3, direction: Vec3) -> Option<LocalMove> {
        let moved = match self.last_reported {
            None => true,
            Some(last) => planar_distance(last, position) > self.epsilon,
        };
        if !moved {
            return None;
        }

        self.last_reported = Some(position);
        Some(LocalMove { position, direction })
    }

    pub fn reset(&mut self) {
        self.last_reported = None;
    }
}

fn parse_position(value: &Value) -> Result<Vec3> {
    let x = coord(value, "x")?.ok_or_else(|| Error::InvalidPosition("missing x".into()))?;
    let z = coord(value, "z")?.ok_or_else(|| Error::InvalidPosition("missing z".into()))?;
    let y = coord(value, "y")?.unwrap_or(DEFAULT_ACTOR_HEIGHT);
    Ok(Vec3::new(x, y, z))
}

fn parse_vec3(value: &Value) -> Result<Vec3> {
    Ok(Vec3::new(
        coord(value, "x")?.unwrap_or(0.0),
        coord(value, "y")?.unwrap_or(0.0),
        coord(value, "z")?.unwrap_or(0.0),
    ))
}

/// A single coordinate: absent/null is `None`, anything but a finite number
/// is an error.
fn coord(value: &Value, name: &str) -> Result<Option<f32>> {
    match value.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.is_finite() && f.abs() <= f32::MAX as f64 => Ok(Some(f as f32)),
            _ => Err(Error::InvalidPosition(format!("{} out of range: {}", name, n))),
        },
        Some(other) => Err(Error::InvalidPosition(format!("{} is not a number: {}", name, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_player_id() {
        let json = concat!(
            r#"{"type":"playerMoved","playerId":7,"#,
            r#""position":{"x":1.5,"y":0.2,"z":-3},"direction":{"x":0,"y":0,"z":-1}}"#,
        );
        let u = RemoteUpdate::parse(json).unwrap();
        assert_eq!(u.actor_id, ActorId::from("7"));
        assert_eq!(u.position, Vec3::new(1.5, 0.2, -3.0));
        assert_eq!(u.direction, Some(Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_missing_y_defaults() {
        let json = r#"{"playerId":"player_abc","position":{"x":1,"z":2}}"#;
        let u = RemoteUpdate::parse(json).unwrap();
        assert_eq!(u.actor_id.as_str(), "player_abc");
        assert_eq!(u.position, Vec3::new(1.0, DEFAULT_ACTOR_HEIGHT, 2.0));
        assert_eq!(u.direction, None);
    }

    #[test]
    fn test_rejects_non_numeric_coordinate() {
        let json = r#"{"playerId":1,"position":{"x":"left","z":2}}"#;
        let err = RemoteUpdate::parse(json).unwrap_err();
        assert!(matches!(err, Error::InvalidPosition(_)));
    }

    #[test]
    fn test_rejects_missing_coordinate() {
        let err = RemoteUpdate::parse(r#"{"playerId":1,"position":{"x":1}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidPosition(_)));
        let err = RemoteUpdate::parse(r#"{"playerId":1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidPosition(_)));
    }

    #[test]
    fn test_rejects_missing_id() {
        let err = RemoteUpdate::parse(r#"{"position":{"x":1,"z":1}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidPosition(_)));
    }

    #[test]
    fn test_bad_json_is_json_error() {
        assert!(matches!(RemoteUpdate::parse("{not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_bad_direction_is_dropped() {
        let json = r#"{"playerId":1,"position":{"x":1,"z":1},"direction":{"x":"?"}}"#;
        let u = RemoteUpdate::parse(json).unwrap();
        assert_eq!(u.direction, None);
    }

    #[test]
    fn test_local_move_json() {
        let m = LocalMove {
            position: Vec3::new(1.0, 0.2, 3.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let v: Value = serde_json::from_str(&m.to_json().unwrap()).unwrap();
        assert_eq!(v["type"], "playerUpdate");
        assert_eq!(v["position"]["x"], 1.0);
        assert_eq!(v["direction"]["z"], -1.0);
    }

    #[test]
    fn test_reporter_suppresses_tiny_moves() {
        let mut r = MovementReporter::new(0.001);
        let dir = Vec3::Z;
        assert!(r.observe(Vec3::ZERO, dir).is_some());
        assert!(r.observe(Vec3::new(0.0005, 0.0, 0.0), dir).is_none());
        assert!(r.observe(Vec3::new(0.0, 5.0, 0.0), dir).is_none());
        let m = r.observe(Vec3::new(0.08, 0.0, 0.0), dir).unwrap();
        assert_eq!(m.position.x, 0.08);
        r.reset();
        assert!(r.observe(Vec3::new(0.08, 0.0, 0.0), dir).is_some());
    }
}
