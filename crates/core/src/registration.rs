//! Registration data validation for account creation and upgrade.
//!
//! Validation accumulates every violation into one list instead of failing
//! fast, so the user can correct the whole form in a single round trip.

use serde::Deserialize;

use crate::preferences::{AnimationSpeed, ShepherdPersonality, Theme};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Maximum first/last name length.
pub const MAX_NAME_LEN: usize = 50;
/// Maximum display name length.
pub const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Raw registration input as received from the client.
///
/// Preferences arrive as plain strings so out-of-set values surface as
/// accumulated validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub preferences: Option<PreferenceInput>,
}

/// Raw preference strings from the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceInput {
    pub theme: Option<String>,
    pub animation_speed: Option<String>,
    pub shepherd_personality: Option<String>,
    pub notifications: Option<bool>,
}

/// Registration data that passed validation, with preferences parsed into
/// their closed-set enums and defaults applied.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub theme: Theme,
    pub animation_speed: AnimationSpeed,
    pub shepherd_personality: ShepherdPersonality,
    pub notifications_enabled: bool,
}

impl RegistrationData {
    /// Validate the registration form, accumulating ALL violations.
    ///
    /// Returns the parsed form on success, or every violation found on
    /// failure -- never just the first one.
    pub fn validate(self) -> Result<ValidRegistration, Vec<String>> {
        let mut errors = Vec::new();

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }

        if let Some(name) = &self.first_name {
            if name.chars().count() > MAX_NAME_LEN {
                errors.push(format!("First name cannot exceed {MAX_NAME_LEN} characters"));
            }
        }

        if let Some(name) = &self.last_name {
            if name.chars().count() > MAX_NAME_LEN {
                errors.push(format!("Last name cannot exceed {MAX_NAME_LEN} characters"));
            }
        }

        if let Some(name) = &self.display_name {
            if name.chars().count() > MAX_DISPLAY_NAME_LEN {
                errors.push(format!(
                    "Display name cannot exceed {MAX_DISPLAY_NAME_LEN} characters"
                ));
            }
        }

        let prefs = self.preferences.unwrap_or_default();

        let theme = parse_pref(prefs.theme.as_deref(), "theme", &mut errors);
        let animation_speed =
            parse_pref(prefs.animation_speed.as_deref(), "animation speed", &mut errors);
        let shepherd_personality = parse_pref(
            prefs.shepherd_personality.as_deref(),
            "shepherd personality",
            &mut errors,
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidRegistration {
            password: self.password,
            first_name: self.first_name.map(|s| s.trim().to_string()),
            last_name: self.last_name.map(|s| s.trim().to_string()),
            display_name: self.display_name.map(|s| s.trim().to_string()),
            theme,
            animation_speed,
            shepherd_personality,
            notifications_enabled: prefs.notifications.unwrap_or(true),
        })
    }
}

/// Parse an optional preference string into its enum, recording a violation
/// for out-of-set values and falling back to the default.
fn parse_pref<T: Default + std::str::FromStr>(
    raw: Option<&str>,
    label: &str,
    errors: &mut Vec<String>,
) -> T {
    match raw {
        None => T::default(),
        Some(s) => match s.parse() {
            Ok(v) => v,
            Err(_) => {
                errors.push(format!("Invalid {label} preference"));
                T::default()
            }
        },
    }
}
