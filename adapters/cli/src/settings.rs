//! TOML settings file overriding the default world configuration.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use maze_chase_system_controller::ContactPasses;
use maze_chase_world::Config;
use serde::Deserialize;

/// Optional overrides read from a settings file. Missing keys keep the defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) speed: Option<f32>,
    pub(crate) scared_speed_factor: Option<f32>,
    pub(crate) scare_seconds: Option<f32>,
    pub(crate) lives: Option<u32>,
    pub(crate) dot_value: Option<u32>,
    pub(crate) pellet_value: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) animate: Option<bool>,
    pub(crate) post_contacts_only: Option<bool>,
}

impl Settings {
    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Applies the overrides on top of the default world configuration.
    pub(crate) fn world_config(&self) -> Result<Config> {
        let mut config = Config::default();
        if let Some(speed) = self.speed {
            config = config.with_speed(speed);
        }
        if let Some(factor) = self.scared_speed_factor {
            config = config.with_scared_speed_factor(factor);
        }
        if let Some(seconds) = self.scare_seconds {
            let duration = Duration::try_from_secs_f32(seconds)
                .with_context(|| format!("scare_seconds must be a non-negative number, got {seconds}"))?;
            config = config.with_scare_duration(duration);
        }
        if let Some(lives) = self.lives {
            config = config.with_initial_lives(lives);
        }
        if let Some(value) = self.dot_value {
            config = config.with_dot_value(value);
        }
        if let Some(value) = self.pellet_value {
            config = config.with_pellet_value(value);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(animate) = self.animate {
            config = config.with_animation(animate);
        }
        Ok(config)
    }

    pub(crate) fn contact_passes(&self) -> ContactPasses {
        if self.post_contacts_only.unwrap_or(false) {
            ContactPasses::PostOnly
        } else {
            ContactPasses::PreAndPost
        }
    }
}
