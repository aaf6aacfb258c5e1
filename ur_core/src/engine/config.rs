use crate::logic::game::UtilityWeights;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Utility weights
    pub score_weight: i32,
    pub advancement_weight: i32,
    pub win_weight: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let weights = UtilityWeights::default();
        Self {
            score_weight: weights.score,
            advancement_weight: weights.advancement,
            win_weight: weights.win,
        }
    }
}

/// Tuning file format: every value scales the matching default.
#[derive(Deserialize)]
struct EngineConfigJson {
    score_weight: Option<f32>,
    advancement_weight: Option<f32>,
    win_weight: Option<f32>,
}

impl EngineConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            score_weight: apply_scale(default.score_weight, json_config.score_weight),
            advancement_weight: apply_scale(
                default.advancement_weight,
                json_config.advancement_weight,
            ),
            win_weight: apply_scale(default.win_weight, json_config.win_weight),
        })
    }

    pub const fn utility_weights(&self) -> UtilityWeights {
        UtilityWeights {
            score: self.score_weight,
            advancement: self.advancement_weight,
            win: self.win_weight,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    scale.map_or(default_val, |s| (default_val as f32 * s) as i32)
}
