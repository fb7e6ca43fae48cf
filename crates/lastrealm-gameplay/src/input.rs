//! Directional input surface.
//!
//! The host feeds one [`DirectionalInput`] per tick. Hosts that receive input
//! over a wire format can use [`DirectionalInput::from_json`], which treats a
//! malformed or partial payload as "nothing held".

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which movement directions are held this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalInput {
    /// Move toward -y.
    pub up: bool,
    /// Move toward +y.
    pub down: bool,
    /// Move toward -x.
    pub left: bool,
    /// Move toward +x.
    pub right: bool,
}

impl DirectionalInput {
    /// No direction held.
    pub const NONE: Self = Self {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Parses a JSON payload, yielding [`Self::NONE`] when it is malformed.
    /// Missing or non-boolean flags read as not held.
    #[must_use]
    pub fn from_json(payload: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(serde_json::Value::Object(map)) => {
                let flag = |key: &str| map.get(key).and_then(serde_json::Value::as_bool).unwrap_or(false);
                Self {
                    up: flag("up"),
                    down: flag("down"),
                    left: flag("left"),
                    right: flag("right"),
                }
            },
            Ok(_) | Err(_) => {
                debug!("Ignoring malformed input payload");
                Self::NONE
            },
        }
    }

    /// Per-axis step direction. Each held axis contributes a full unit, so a
    /// diagonal is longer than a straight move.
    #[must_use]
    pub fn axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.up {
            axis.y -= 1.0;
        }
        if self.down {
            axis.y += 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis
    }

    /// Whether any direction is held.
    #[must_use]
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_is_not_normalized() {
        let input = DirectionalInput {
            up: true,
            right: true,
            ..DirectionalInput::NONE
        };
        assert_eq!(input.axis(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let input = DirectionalInput {
            left: true,
            right: true,
            ..DirectionalInput::NONE
        };
        assert_eq!(input.axis(), Vec2::ZERO);
        assert!(input.any());
    }

    #[test]
    fn test_partial_payload() {
        let input = DirectionalInput::from_json(r#"{"up": true, "left": "yes"}"#);
        assert!(input.up);
        assert!(!input.left);
        assert!(!input.down);
    }

    #[test]
    fn test_malformed_payload() {
        assert_eq!(DirectionalInput::from_json("{not json"), DirectionalInput::NONE);
        assert_eq!(DirectionalInput::from_json("[true]"), DirectionalInput::NONE);
    }
}
