use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::material::{Material, MaterialCategory};
use crate::scoring::{round_half_up, ScoreCard};

/// One scored material for a single application query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub key: String,
    pub name: String,
    pub category: MaterialCategory,
    pub scores: ScoreCard,
    /// Success rate on a 0-10 scale.
    pub safety: f64,
    /// `10 - 2 * price_tier`, higher is cheaper. Not clamped.
    pub price_score: f64,
    /// Baseline footprint minus this footprint; positive means cleaner.
    pub co2_delta: f64,
    pub co2_kg_per_kg: f64,
    pub biodegradable: bool,
    pub mri_compatible: bool,
    pub service_life_years: u32,
    pub reference: String,
}

impl CandidateRow {
    fn from_material(material: &Material, baseline: &Material) -> Self {
        Self {
            key: material.key.clone(),
            name: material.name.clone(),
            category: material.category,
            scores: ScoreCard::of(material),
            safety: round_half_up(material.success_rate_pct / 10.0, 1),
            price_score: round_half_up(10.0 - f64::from(material.price_tier) * 2.0, 1),
            co2_delta: round_half_up(baseline.co2_kg_per_kg - material.co2_kg_per_kg, 1),
            co2_kg_per_kg: material.co2_kg_per_kg,
            biodegradable: material.biodegradable,
            mri_compatible: material.mri_compatible,
            service_life_years: material.service_life_years,
            reference: material.reference.clone(),
        }
    }
}

pub struct CandidateBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> CandidateBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Every material tagged with `application`, best global score first.
    ///
    /// An unknown baseline yields an empty list. Equal scores keep catalog order.
    pub fn build(&self, application: &str, baseline_key: &str) -> Vec<CandidateRow> {
        let Some(baseline) = self.catalog.find(baseline_key) else {
            return Vec::new();
        };

        let mut rows: Vec<CandidateRow> = self
            .catalog
            .iter()
            .filter(|material| material.applies_to(application))
            .map(|material| CandidateRow::from_material(material, baseline))
            .collect();
        rows.sort_by(|a, b| b.scores.global.total_cmp(&a.scores.global));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::CandidateBuilder;
    use crate::catalog::Catalog;
    use crate::domain::material::fixtures::material;
    use crate::domain::material::Material;

    fn tagged(key: &str, tags: &[&str], availability: u8) -> Material {
        let mut entry = material(key, &key.to_uppercase());
        entry.applications = tags.iter().map(|tag| tag.to_string()).collect();
        entry.availability = availability;
        entry
    }

    fn catalog() -> Catalog {
        let mut baseline = tagged("baseline", &["hip"], 5);
        baseline.co2_kg_per_kg = 42.0;
        let mut clean = tagged("clean", &["Spine", "hip"], 2);
        clean.co2_kg_per_kg = 1.5;
        clean.price_tier = 1;
        Catalog::new(
            vec![
                baseline,
                tagged("tie_first", &["spine"], 3),
                clean,
                tagged("tie_second", &["spine"], 3),
                tagged("top", &["spine"], 5),
            ],
            [],
        )
        .expect("catalog")
    }

    #[test]
    fn filters_by_tag_and_sorts_by_global_score() {
        let catalog = catalog();
        let rows = CandidateBuilder::new(&catalog).build("SPINE", "baseline");

        let keys: Vec<&str> = rows.iter().map(|row| row.key.as_str()).collect();
        assert_eq!(keys.len(), 4);
        assert!(!keys.contains(&"baseline"));
        for pair in rows.windows(2) {
            assert!(pair[0].scores.global >= pair[1].scores.global);
        }
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = catalog();
        let rows = CandidateBuilder::new(&catalog).build("spine", "baseline");

        let first = rows.iter().position(|row| row.key == "tie_first").expect("tie_first");
        let second = rows.iter().position(|row| row.key == "tie_second").expect("tie_second");
        assert_eq!(rows[first].scores.global, rows[second].scores.global);
        assert!(first < second);
    }

    #[test]
    fn derived_columns_follow_baseline_and_price_tier() {
        let catalog = catalog();
        let rows = CandidateBuilder::new(&catalog).build("hip", "baseline");
        let clean = rows.iter().find(|row| row.key == "clean").expect("clean row");

        assert_eq!(clean.co2_delta, 40.5);
        assert_eq!(clean.price_score, 8.0);
        assert_eq!(clean.safety, 9.0);

        let baseline = rows.iter().find(|row| row.key == "baseline").expect("baseline row");
        assert_eq!(baseline.co2_delta, 0.0);
        assert_eq!(baseline.price_score, 4.0);
    }

    #[test]
    fn unknown_baseline_or_tag_yields_empty_result() {
        let catalog = catalog();
        let builder = CandidateBuilder::new(&catalog);
        assert!(builder.build("spine", "unobtainium").is_empty());
        assert!(builder.build("ophthalmology", "baseline").is_empty());
    }
}
