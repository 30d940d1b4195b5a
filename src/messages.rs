// Message types for the runtime

use serde::{Deserialize, Serialize};

/// Bounded 2D command derived from pitch/roll, sent runtime -> controller.
///
/// Components stay within ±CLAMP_DEG after the tilt transform; `(0, 0)` is
/// the neutral (stop) command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlVector {
    pub x: i16,
    pub y: i16,
}

impl ControlVector {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub fn neutral() -> Self {
        Self::default()
    }

    /// Wire form: newline-terminated `<x>,<y>` token
    pub fn to_token(&self) -> String {
        format!("{},{}\n", self.x, self.y)
    }

    /// Inverse of [`to_token`](Self::to_token), used by controller-side tooling.
    /// Returns `None` for anything that is not two comma-separated integers.
    pub fn parse_token(line: &str) -> Option<Self> {
        let (x, y) = line.trim().split_once(',')?;
        Some(Self {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
        })
    }
}

/// Link health tracked by the runtime, logged on transition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LinkHealth {
    Connected,
    Reconnecting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let v = ControlVector::new(-18, 13);
        assert_eq!(v.to_token(), "-18,13\n");
        assert_eq!(ControlVector::parse_token(&v.to_token()), Some(v));
    }

    #[test]
    fn test_neutral_token() {
        assert_eq!(ControlVector::neutral().to_token(), "0,0\n");
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        assert_eq!(
            ControlVector::parse_token(" 12 , -24 \n"),
            Some(ControlVector::new(12, -24))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(ControlVector::parse_token(""), None);
        assert_eq!(ControlVector::parse_token(" \t "), None);
        assert_eq!(ControlVector::parse_token(","), None);
        assert_eq!(ControlVector::parse_token("12"), None);
        assert_eq!(ControlVector::parse_token("a,b"), None);
        assert_eq!(ControlVector::parse_token("1,2,3"), None);
        assert_eq!(ControlVector::parse_token("1.5,2"), None);
    }
}
