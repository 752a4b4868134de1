//! JSON configuration for a run.
//!
//! ```json
//! {
//!   "agent": "pogo-bouncer",
//!   "settings": { "max_steps": 1000, "seed": 7 },
//!   "pogo_bouncer": { "survival_bonus": 0.2 }
//! }
//! ```
//!
//! Every field is optional and unknown fields are rejected.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agents::{CaveCrawlerConfig, PogoBouncerConfig};
use crate::control_loop::LoopSettings;
use crate::error::ConfigError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    #[default]
    CaveCrawler,
    PogoBouncer,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    pub agent: AgentKind,
    pub settings: LoopSettings,
    pub cave_crawler: CaveCrawlerConfig,
    pub pogo_bouncer: PogoBouncerConfig,
}

impl ArenaConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        text.parse()
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the loop settings and the selected agent's section.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.settings.validate()?;
        match self.agent {
            AgentKind::CaveCrawler => self.cave_crawler.validate(),
            AgentKind::PogoBouncer => self.pogo_bouncer.validate(),
        }
    }
}

impl FromStr for ArenaConfig {
    type Err = ConfigError;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ArenaConfig = "{}".parse().unwrap();
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(config.cave_crawler.side_rays, 6);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config: ArenaConfig =
            r#"{"agent": "pogo-bouncer", "pogo_bouncer": {"survival_bonus": 0.2}, "settings": {"max_steps": 50}}"#
                .parse()
                .unwrap();
        assert_eq!(config.agent, AgentKind::PogoBouncer);
        assert!((config.pogo_bouncer.survival_bonus - 0.2).abs() < 1e-6);
        assert!((config.pogo_bouncer.fall_height - 0.4).abs() < 1e-6);
        assert_eq!(config.settings.max_steps, 50);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = r#"{"cave_crawler": {"warp_drive": true}}"#.parse::<ArenaConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(message) if message.contains("warp_drive")));
    }

    #[test]
    fn json_round_trip() {
        let mut config = ArenaConfig::default();
        config.cave_crawler.target_reset_distance = 4.0;
        config.settings.seed = 99;
        let parsed: ArenaConfig = config.to_json().unwrap().parse().unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn overflowing_values_fail_validation() {
        let mut config: ArenaConfig = r#"{"cave_crawler": {"max_view_distance": 1e39}}"#.parse().unwrap();
        assert_eq!(config.validate(), Err(ConfigError::NonFinite("max_view_distance")));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ArenaConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
