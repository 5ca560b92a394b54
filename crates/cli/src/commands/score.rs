use mater_core::scoring::{round_half_up, ScoreCard};
use mater_core::transport::TransportFootprint;
use serde::Serialize;

use crate::commands::{load_catalog, CommandResult, EXIT_INPUT};

const COMMAND: &str = "score";

#[derive(Debug, Serialize)]
struct ScoreReport<'a> {
    key: &'a str,
    name: &'a str,
    category: &'a str,
    scores: ScoreCard,
    safety: f64,
    price_score: f64,
    co2_kg_per_kg: f64,
    transport_weight_kg: f64,
    transport: TransportFootprint,
}

pub fn run(key: &str) -> CommandResult {
    let (config, catalog) = match load_catalog(COMMAND) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };
    let Some(material) = catalog.find(key.trim()) else {
        return CommandResult::failure(
            COMMAND,
            "unknown_material",
            format!("material `{key}` is not in the catalog"),
            EXIT_INPUT,
        );
    };

    let weight_kg = config.catalog.transport_weight_kg;
    let report = ScoreReport {
        key: &material.key,
        name: &material.name,
        category: material.category.label(),
        scores: ScoreCard::of(material),
        safety: round_half_up(material.success_rate_pct / 10.0, 1),
        price_score: round_half_up(10.0 - f64::from(material.price_tier) * 2.0, 1),
        co2_kg_per_kg: material.co2_kg_per_kg,
        transport_weight_kg: weight_kg,
        transport: catalog.transport_footprint(&material.key, weight_kg),
    };

    let message = format!(
        "{}: global {:.2} (clinical {:.2}, environmental {:.2}, mechanical {:.2})",
        report.name,
        report.scores.global,
        report.scores.clinical,
        report.scores.environmental,
        report.scores.mechanical
    );
    CommandResult::success_with(COMMAND, message, Some(&report))
}
