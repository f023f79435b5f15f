//! Contemplative UX preference enums.
//!
//! Each preference is a closed value set. Requests carry them as plain
//! strings so registration validation can accumulate "invalid preference"
//! violations alongside other errors instead of failing at deserialization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// UI color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

/// Animation pacing. Defaults to `Slow` for contemplative gravitas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    #[default]
    Slow,
    Normal,
    Fast,
}

/// Tone of the guided shepherd experience.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShepherdPersonality {
    #[default]
    Gentle,
    Encouraging,
    Wise,
}

macro_rules! impl_pref_str {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($ty::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $s,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_pref_str!(Theme { Light => "light", Dark => "dark", Auto => "auto" });
impl_pref_str!(AnimationSpeed { Slow => "slow", Normal => "normal", Fast => "fast" });
impl_pref_str!(ShepherdPersonality { Gentle => "gentle", Encouraging => "encouraging", Wise => "wise" });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!(Theme::Dark.as_str(), "dark");
        assert_eq!("fast".parse::<AnimationSpeed>(), Ok(AnimationSpeed::Fast));
        assert_eq!("wise".parse::<ShepherdPersonality>(), Ok(ShepherdPersonality::Wise));
    }

    #[test]
    fn rejects_values_outside_the_closed_set() {
        assert!("neon".parse::<Theme>().is_err());
        assert!("instant".parse::<AnimationSpeed>().is_err());
        assert!("stern".parse::<ShepherdPersonality>().is_err());
    }

    #[test]
    fn defaults_favor_the_contemplative() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(AnimationSpeed::default(), AnimationSpeed::Slow);
        assert_eq!(ShepherdPersonality::default(), ShepherdPersonality::Gentle);
    }
}
