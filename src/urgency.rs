//! Message urgency levels (RFC 8030 §5.3).
//!
//! Push services use the `Urgency` header to decide whether a message is
//! worth waking a device for. The value is soft-validated: an unrecognized
//! level is treated as "unset" and the header simply omitted, never an error.

// Rust guideline compliant 2026-02

use serde::{Deserialize, Serialize};

/// Priority of a push message, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    /// Deliver only when the device is on power and Wi-Fi.
    VeryLow,
    /// Deliver on power or Wi-Fi.
    Low,
    /// Deliver whenever the device is awake (the service default).
    Normal,
    /// Deliver immediately, waking the device if needed.
    High,
}

impl Urgency {
    /// The wire value sent in the `Urgency` header.
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }

    /// Parse a wire value; anything but the four recognized levels is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "very-low" => Some(Urgency::VeryLow),
            "low" => Some(Urgency::Low),
            "normal" => Some(Urgency::Normal),
            "high" => Some(Urgency::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
