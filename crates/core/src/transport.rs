//! Transport footprint of shipping a material sample from its origin.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::material::{Origin, TransportMode};
use crate::scoring::round_half_up;

/// Reference shipment weight when none is configured.
pub const DEFAULT_WEIGHT_KG: f64 = 0.1;

/// Per kilometre and kilogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportFactors {
    pub co2_kg: f64,
    pub cost_eur: f64,
}

impl TransportMode {
    pub fn factors(&self) -> TransportFactors {
        match self {
            Self::Air => TransportFactors { co2_kg: 0.000_50, cost_eur: 0.000_30 },
            Self::Sea => TransportFactors { co2_kg: 0.000_01, cost_eur: 0.000_030 },
            Self::Road => TransportFactors { co2_kg: 0.000_10, cost_eur: 0.000_080 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportFootprint {
    pub co2_kg: f64,
    pub cost_eur: f64,
    pub distance_km: f64,
    /// `None` when the catalog has no origin for the material.
    pub mode: Option<TransportMode>,
}

impl TransportFootprint {
    pub fn unknown() -> Self {
        Self { co2_kg: 0.0, cost_eur: 0.0, distance_km: 0.0, mode: None }
    }
}

pub fn footprint(origin: &Origin, weight_kg: f64) -> TransportFootprint {
    let factors = origin.mode.factors();
    let kg_km = origin.distance_km * weight_kg;
    TransportFootprint {
        co2_kg: round_half_up(kg_km * factors.co2_kg, 4),
        cost_eur: round_half_up(kg_km * factors.cost_eur, 4),
        distance_km: origin.distance_km,
        mode: Some(origin.mode),
    }
}

impl Catalog {
    pub fn transport_footprint(&self, key: &str, weight_kg: f64) -> TransportFootprint {
        self.origin(key)
            .map(|origin| footprint(origin, weight_kg))
            .unwrap_or_else(TransportFootprint::unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::{footprint, TransportFootprint, DEFAULT_WEIGHT_KG};
    use crate::catalog::Catalog;
    use crate::domain::material::{Origin, TransportMode};

    fn origin(distance_km: f64, mode: TransportMode) -> Origin {
        Origin {
            country: "Japan".to_string(),
            city: "Osaka".to_string(),
            latitude: 34.69,
            longitude: 135.5,
            distance_km,
            mode,
        }
    }

    #[test]
    fn air_freight_uses_air_factors() {
        let result = footprint(&origin(9700.0, TransportMode::Air), DEFAULT_WEIGHT_KG);
        assert!((result.co2_kg - 0.485).abs() < 1e-9);
        assert!((result.cost_eur - 0.291).abs() < 1e-9);
        assert_eq!(result.distance_km, 9700.0);
        assert_eq!(result.mode, Some(TransportMode::Air));
    }

    #[test]
    fn sea_freight_is_rounded_to_four_decimals() {
        let result = footprint(&origin(1234.0, TransportMode::Sea), DEFAULT_WEIGHT_KG);
        // 123.4 * 0.00001 = 0.001234
        assert!((result.co2_kg - 0.0012).abs() < 1e-9);
        // 123.4 * 0.00003 = 0.003702
        assert!((result.cost_eur - 0.0037).abs() < 1e-9);
    }

    #[test]
    fn materials_without_origin_yield_zeroes() {
        let catalog = Catalog::bundled().expect("bundled catalog");
        let known = catalog.transport_footprint("titanium_grade5", DEFAULT_WEIGHT_KG);
        assert!(known.mode.is_some());
        assert!(known.co2_kg > 0.0);

        let missing = catalog.transport_footprint("not_a_material", DEFAULT_WEIGHT_KG);
        assert_eq!(missing, TransportFootprint::unknown());
    }
}
