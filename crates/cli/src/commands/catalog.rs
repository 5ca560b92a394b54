use mater_core::scoring::ScoreCard;
use mater_core::Field;

use crate::commands::{load_catalog, CommandResult, EXIT_INPUT};

const COMMAND: &str = "catalog";

/// Lists materials with their global score, all fields when `field` is `None`.
pub fn run(field: Option<&str>) -> CommandResult {
    let field = match field.map(str::parse::<Field>).transpose() {
        Ok(field) => field,
        Err(error) => {
            return CommandResult::failure(COMMAND, "invalid_input", error.to_string(), EXIT_INPUT);
        }
    };
    let (_, catalog) = match load_catalog(COMMAND) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let materials: Vec<_> = match field {
        Some(field) => catalog.for_field(field).collect(),
        None => catalog.iter().collect(),
    };

    let mut lines = vec![match field {
        Some(field) => format!("{} materials for {field}:", materials.len()),
        None => format!("{} materials:", materials.len()),
    }];
    for material in materials {
        let scores = ScoreCard::of(material);
        lines.push(format!(
            "- {:<22} {:>5.2}  {} [{}] {}",
            material.key,
            scores.global,
            material.name,
            material.category.label(),
            material.applications.join(", ")
        ));
    }
    CommandResult::text(lines.join("\n"))
}
