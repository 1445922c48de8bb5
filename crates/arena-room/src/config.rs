//! Room configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SpawnPoint
// ---------------------------------------------------------------------------

/// A ground-level spawn location. `y` is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub z: f32,
}

impl SpawnPoint {
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

/// The arena's stock spawn layout: four corners, then four edge midpoints.
pub const DEFAULT_SPAWN_POINTS: [SpawnPoint; 8] = [
    SpawnPoint::new(-20.0, -20.0),
    SpawnPoint::new(20.0, -20.0),
    SpawnPoint::new(-20.0, 20.0),
    SpawnPoint::new(20.0, 20.0),
    SpawnPoint::new(0.0, -25.0),
    SpawnPoint::new(25.0, 0.0),
    SpawnPoint::new(0.0, 25.0),
    SpawnPoint::new(-25.0, 0.0),
];

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for one room instance.
///
/// Deserializes from partial JSON: every missing field takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Client capacity. The room refuses joins at this count and locks
    /// itself if it is ever exceeded.
    pub max_clients: usize,

    /// Ordered spawn locations. Fixed for the life of the room.
    pub spawn_points: Vec<SpawnPoint>,

    /// Size of the cosmetic skin pool. 0 disables skins.
    pub skin_count: usize,

    /// Payload of the `hello` message sent to every joining client.
    pub greeting: String,

    /// Stop the room actor when its last client leaves.
    pub auto_dispose: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_clients: 8,
            spawn_points: DEFAULT_SPAWN_POINTS.to_vec(),
            skin_count: 0,
            greeting: "world".to_string(),
            auto_dispose: true,
        }
    }
}

impl RoomConfig {
    /// Fixes values the room can't run with.
    ///
    /// - An empty `spawn_points` list is replaced by [`DEFAULT_SPAWN_POINTS`].
    /// - `max_clients` of 0 is raised to 1.
    pub fn validated(mut self) -> Self {
        if self.spawn_points.is_empty() {
            tracing::warn!("spawn_points is empty, using the default layout");
            self.spawn_points = DEFAULT_SPAWN_POINTS.to_vec();
        }
        if self.max_clients == 0 {
            tracing::warn!("max_clients is 0, raising to 1");
            self.max_clients = 1;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.max_clients, 8);
        assert_eq!(config.spawn_points.len(), 8);
        assert_eq!(config.spawn_points[0], SpawnPoint::new(-20.0, -20.0));
        assert_eq!(config.spawn_points[7], SpawnPoint::new(-25.0, 0.0));
        assert_eq!(config.skin_count, 0);
        assert!(config.auto_dispose);
    }

    #[test]
    fn test_validated_replaces_empty_spawn_points() {
        let config = RoomConfig {
            spawn_points: Vec::new(),
            ..RoomConfig::default()
        }
        .validated();
        assert_eq!(config.spawn_points, DEFAULT_SPAWN_POINTS.to_vec());
    }

    #[test]
    fn test_validated_raises_zero_capacity() {
        let config = RoomConfig {
            max_clients: 0,
            ..RoomConfig::default()
        }
        .validated();
        assert_eq!(config.max_clients, 1);
    }

    #[test]
    fn test_validated_keeps_sane_config_untouched() {
        let config = RoomConfig {
            max_clients: 3,
            spawn_points: vec![SpawnPoint::new(1.0, 2.0)],
            ..RoomConfig::default()
        };
        assert_eq!(config.clone().validated(), config);
    }

    #[test]
    fn test_room_config_deserializes_partial_json() {
        let config: RoomConfig =
            serde_json::from_str(r#"{"max_clients": 4, "skin_count": 6}"#).unwrap();
        assert_eq!(config.max_clients, 4);
        assert_eq!(config.skin_count, 6);
        assert_eq!(config.spawn_points.len(), 8);
        assert_eq!(config.greeting, "world");
    }
}
