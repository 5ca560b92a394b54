//! Multi-criteria material scoring.
//!
//! Every score is a pure function of one [`Material`] and lands in `[0, 10]`
//! for catalog values inside their documented ranges. Rounding is half-up.

use serde::{Deserialize, Serialize};

use crate::domain::material::Material;

/// Stiffness the mechanical-compatibility score is centred on.
pub const TARGET_MODULUS_GPA: f64 = 20.0;

/// Fixed blend used by [`global_score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalWeights {
    pub clinical: f64,
    pub environmental: f64,
    /// Applied to `success_rate_pct / 10`.
    pub success_rate: f64,
    /// Applied to availability rescaled to 0-10.
    pub availability: f64,
    pub mechanical: f64,
}

pub const GLOBAL_WEIGHTS: GlobalWeights = GlobalWeights {
    clinical: 0.40,
    environmental: 0.25,
    success_rate: 0.20,
    availability: 0.10,
    mechanical: 0.05,
};

const BIODEGRADABLE_BONUS: f64 = 1.5;
const RECYCLABLE_BONUS: f64 = 0.5;

/// The four scores of one material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub clinical: f64,
    pub environmental: f64,
    pub mechanical: f64,
    pub global: f64,
}

impl ScoreCard {
    pub fn of(material: &Material) -> Self {
        Self {
            clinical: clinical_score(material),
            environmental: environmental_score(material),
            mechanical: mechanical_score(material),
            global: global_score(material),
        }
    }
}

/// Rounds half away from negative infinity, so `x.xx5` always goes up.
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

pub fn clinical_score(material: &Material) -> f64 {
    let raw = material.success_rate_pct / 100.0 * 3.5
        + f64::from(material.biocompatibility) / 5.0 * 2.5
        + f64::from(material.integration) / 5.0 * 2.0
        - f64::from(material.infection_risk) / 5.0
        - f64::from(material.allergy_risk) / 5.0;
    round_half_up(raw.clamp(0.0, 10.0), 2)
}

/// Piecewise-linear footprint curve without sustainability bonuses.
pub fn environmental_base(co2_kg_per_kg: f64) -> f64 {
    let co2 = co2_kg_per_kg;
    if co2 <= 2.0 {
        9.5
    } else if co2 <= 5.0 {
        9.0 - (co2 - 2.0) / 3.0 * 2.0
    } else if co2 <= 15.0 {
        7.0 - (co2 - 5.0) / 10.0 * 3.0
    } else if co2 <= 50.0 {
        4.0 - (co2 - 15.0) / 35.0 * 3.0
    } else {
        (1.0 - (co2 - 50.0) / 150.0).max(0.3)
    }
}

/// Footprint curve plus additive bonuses, saturating at 10.
pub fn environmental_score(material: &Material) -> f64 {
    let mut score = environmental_base(material.co2_kg_per_kg);
    if material.biodegradable {
        score += BIODEGRADABLE_BONUS;
    }
    if material.recyclable {
        score += RECYCLABLE_BONUS;
    }
    round_half_up(score.min(10.0), 2)
}

/// Penalises stiffness mismatch with [`TARGET_MODULUS_GPA`]; saturates at 0.
pub fn mechanical_score(material: &Material) -> f64 {
    let deviation = (material.elastic_modulus_gpa - TARGET_MODULUS_GPA).abs() / TARGET_MODULUS_GPA;
    let score = (10.0 - deviation * 2.0).max(0.0);
    round_half_up(score.min(10.0), 2)
}

pub fn global_score(material: &Material) -> f64 {
    let weights = GLOBAL_WEIGHTS;
    let blended = clinical_score(material) * weights.clinical
        + environmental_score(material) * weights.environmental
        + material.success_rate_pct / 10.0 * weights.success_rate
        + f64::from(material.availability) / 5.0 * 10.0 * weights.availability
        + mechanical_score(material) * weights.mechanical;
    round_half_up(blended, 2)
}
