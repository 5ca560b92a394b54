use std::collections::HashSet;

use mater_core::cards::{ParsedCard, PROFILE_COLORS};
use mater_core::{Catalog, Field};
use serde::Serialize;

use crate::prompt::allowed_materials;

pub const EXPECTED_CARD_COUNT: usize = 3;

/// Something off about a reply's cards. Findings annotate, they never drop cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason_code", rename_all = "snake_case")]
pub enum GuardrailFinding {
    UnlistedMaterial { name: String },
    UnexpectedCardCount { count: usize },
    UnknownProfile { name: String, profile: String },
}

impl GuardrailFinding {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::UnlistedMaterial { .. } => "unlisted_material",
            Self::UnexpectedCardCount { .. } => "unexpected_card_count",
            Self::UnknownProfile { .. } => "unknown_profile",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::UnlistedMaterial { name } => {
                format!("`{name}` is not in the reference list for this field. Verify before use.")
            }
            Self::UnexpectedCardCount { count } => format!(
                "Expected {EXPECTED_CARD_COUNT} recommendation cards but received {count}."
            ),
            Self::UnknownProfile { name, profile } => {
                format!("`{name}` carries an unrecognised profile label `{profile}`.")
            }
        }
    }
}

/// Checks parsed cards against the materials a field is allowed to recommend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    allowed: HashSet<String>,
}

impl GuardrailPolicy {
    pub fn for_field(catalog: &Catalog, field: Field) -> Self {
        let allowed =
            allowed_materials(catalog, field).into_iter().map(normalize).collect::<HashSet<_>>();
        Self { allowed }
    }

    pub fn allows(&self, name: &str) -> bool {
        self.allowed.contains(&normalize(name))
    }

    /// A reply without cards (clarifying questions, refusals) is clean.
    pub fn review(&self, cards: &[ParsedCard]) -> Vec<GuardrailFinding> {
        let mut findings = Vec::new();
        if !cards.is_empty() && cards.len() != EXPECTED_CARD_COUNT {
            findings.push(GuardrailFinding::UnexpectedCardCount { count: cards.len() });
        }
        for card in cards {
            if !self.allows(&card.name) {
                findings.push(GuardrailFinding::UnlistedMaterial { name: card.name.clone() });
            }
            if !PROFILE_COLORS.iter().any(|(label, _)| *label == card.profile) {
                findings.push(GuardrailFinding::UnknownProfile {
                    name: card.name.clone(),
                    profile: card.profile.clone(),
                });
            }
        }
        findings
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
