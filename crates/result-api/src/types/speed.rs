use std::fmt;

use serde::{Deserialize, Serialize};

const MODEM_SPEED: u32 = 56;
const CABLE_SPEED: u32 = 350;
const T1_SPEED: u32 = 1_000;

/// Coarse connection class derived from an advertised speed in kbit/s.
///
/// Two results in the same class are shown with the same label, which is
/// also what the speed facet groups on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeedClass {
    Modem,
    Cable,
    T1,
    T3,
}

impl SpeedClass {
    #[must_use]
    pub fn from_kbps(speed: u32) -> Self {
        if speed <= MODEM_SPEED {
            Self::Modem
        } else if speed <= CABLE_SPEED {
            Self::Cable
        } else if speed <= T1_SPEED {
            Self::T1
        } else {
            Self::T3
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Modem => "Modem",
            Self::Cable => "Cable/DSL",
            Self::T1 => "T1",
            Self::T3 => "T3 or higher",
        }
    }
}

impl fmt::Display for SpeedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_boundaries_are_inclusive() {
        assert_eq!(SpeedClass::from_kbps(0), SpeedClass::Modem);
        assert_eq!(SpeedClass::from_kbps(56), SpeedClass::Modem);
        assert_eq!(SpeedClass::from_kbps(57), SpeedClass::Cable);
        assert_eq!(SpeedClass::from_kbps(350), SpeedClass::Cable);
        assert_eq!(SpeedClass::from_kbps(1_000), SpeedClass::T1);
        assert_eq!(SpeedClass::from_kbps(1_001), SpeedClass::T3);
    }
}
