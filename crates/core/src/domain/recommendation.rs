use std::fmt;

use serde::{Deserialize, Serialize};

/// Diversification axis of a top-3 result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationProfile {
    OverallBest,
    Ecological,
    Economic,
}

pub const DEFAULT_PROFILE_COLOR: &str = "#15803d";

impl RecommendationProfile {
    /// Selection order. Changing it changes results on near-ties.
    pub const ORDER: [RecommendationProfile; 3] = [
        RecommendationProfile::OverallBest,
        RecommendationProfile::Ecological,
        RecommendationProfile::Economic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::OverallBest => "Best Overall",
            Self::Ecological => "Ecological Profile",
            Self::Economic => "Economic Profile",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::OverallBest => DEFAULT_PROFILE_COLOR,
            Self::Ecological => "#0369a1",
            Self::Economic => "#b45309",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|profile| profile.label() == label.trim())
    }
}

impl fmt::Display for RecommendationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Uniform recommendation shape shared by the local ranking path and
/// cards extracted from assistant text.
///
/// `cost` is higher-is-cheaper. `co2_saved` is negative when the material
/// emits less than the baseline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub name: String,
    pub category: String,
    pub score: f64,
    pub sustainability: f64,
    pub co2: f64,
    pub cost: f64,
    pub co2_saved: f64,
    pub profile: String,
    pub profile_color: String,
}
