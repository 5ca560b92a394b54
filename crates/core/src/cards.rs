//! Extraction of `---CARD---` blocks from assistant prose.
//!
//! The extractor is a pure function of its input text, so it can be run on
//! every growing prefix of a stream as well as on the final reply.

use serde::{Deserialize, Serialize};

use crate::domain::recommendation::{Recommendation, DEFAULT_PROFILE_COLOR};

pub const CARD_START: &str = "---CARD---";
pub const CARD_END: &str = "---END---";
pub const DEFAULT_PROFILE: &str = "Best Overall";

/// A card is the same record the local ranking produces.
pub type ParsedCard = Recommendation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardField {
    Name,
    Category,
    Score,
    Sustainability,
    Co2,
    Cost,
    Co2Saved,
    Profile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Number,
}

/// Accepted labels for one field, primary label first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRule {
    pub field: CardField,
    pub labels: &'static [&'static str],
    pub shape: ValueShape,
}

pub const CARD_GRAMMAR: &[FieldRule] = &[
    FieldRule { field: CardField::Name, labels: &["name", "material name"], shape: ValueShape::Text },
    FieldRule { field: CardField::Category, labels: &["category"], shape: ValueShape::Text },
    FieldRule {
        field: CardField::Score,
        labels: &["score", "performance score", "clinical score"],
        shape: ValueShape::Number,
    },
    FieldRule {
        field: CardField::Sustainability,
        labels: &["sustainability", "sustainability score"],
        shape: ValueShape::Number,
    },
    FieldRule { field: CardField::Co2, labels: &["co2", "co2 emissions"], shape: ValueShape::Number },
    FieldRule { field: CardField::Cost, labels: &["cost", "cost score"], shape: ValueShape::Number },
    FieldRule {
        field: CardField::Co2Saved,
        labels: &["co2saved", "estimated co2 savings"],
        shape: ValueShape::Number,
    },
    FieldRule { field: CardField::Profile, labels: &["profile"], shape: ValueShape::Text },
];

pub const PROFILE_COLORS: &[(&str, &str)] = &[
    ("Best Overall", "#15803d"),
    ("Ecological Profile", "#0369a1"),
    ("Economic Profile", "#b45309"),
    ("Most Sustainable", "#15803d"),
    ("Lowest Carbon", "#0369a1"),
    ("Best Value", "#b45309"),
];

pub fn profile_color(label: &str) -> &'static str {
    PROFILE_COLORS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_PROFILE_COLOR)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardExtraction {
    pub cards: Vec<ParsedCard>,
    /// Input with every complete block removed, trimmed.
    pub clean_text: String,
}

#[derive(Clone, Copy, Debug)]
pub struct CardExtractor {
    grammar: &'static [FieldRule],
}

impl Default for CardExtractor {
    fn default() -> Self {
        Self { grammar: CARD_GRAMMAR }
    }
}

impl CardExtractor {
    pub fn with_grammar(grammar: &'static [FieldRule]) -> Self {
        Self { grammar }
    }

    pub fn grammar(&self) -> &'static [FieldRule] {
        self.grammar
    }

    pub fn extract(&self, text: &str) -> CardExtraction {
        let mut cards = Vec::new();
        let mut clean_text = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(CARD_START) {
            let body_start = start + CARD_START.len();
            let Some(body_len) = rest[body_start..].find(CARD_END) else {
                break;
            };
            clean_text.push_str(&rest[..start]);
            cards.push(self.parse_block(&rest[body_start..body_start + body_len]));
            rest = &rest[body_start + body_len + CARD_END.len()..];
        }
        clean_text.push_str(rest);

        CardExtraction { cards, clean_text: clean_text.trim().to_string() }
    }

    fn parse_block(&self, block: &str) -> ParsedCard {
        let mut card = ParsedCard::default();
        for rule in self.grammar {
            let Some(raw) = rule.labels.iter().find_map(|label| find_value(block, label)) else {
                continue;
            };
            match rule.shape {
                ValueShape::Text => set_text(&mut card, rule.field, raw),
                ValueShape::Number => set_number(&mut card, rule.field, parse_leading_float(&raw)),
            }
        }

        if card.profile.is_empty() {
            card.profile = DEFAULT_PROFILE.to_string();
        }
        card.profile_color = profile_color(&card.profile).to_string();
        card
    }
}

fn set_text(card: &mut ParsedCard, field: CardField, value: String) {
    match field {
        CardField::Name => card.name = value,
        CardField::Category => card.category = value,
        CardField::Profile => card.profile = value,
        _ => set_number(card, field, parse_leading_float(&value)),
    }
}

fn set_number(card: &mut ParsedCard, field: CardField, value: f64) {
    match field {
        CardField::Score => card.score = value,
        CardField::Sustainability => card.sustainability = value,
        CardField::Co2 => card.co2 = value,
        CardField::Cost => card.cost = value,
        CardField::Co2Saved => card.co2_saved = value,
        CardField::Name | CardField::Category | CardField::Profile => {}
    }
}

/// First line of `block` reading `label: value`, ignoring case, surrounding
/// whitespace and `*` emphasis around the label. Empty values do not match.
fn find_value(block: &str, label: &str) -> Option<String> {
    block.lines().find_map(|line| {
        let line = line.trim_start().trim_start_matches('*');
        let head = line.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let value = line[label.len()..].trim_start_matches('*').strip_prefix(':')?;
        let value = value.replace("**", "");
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Writes a recommendation in the block format [`CardExtractor`] reads.
pub fn render_card(card: &ParsedCard) -> String {
    format!(
        "{CARD_START}\nname: {}\ncategory: {}\nscore: {}\nsustainability: {}\nco2: {}\ncost: {}\nco2Saved: {}\nprofile: {}\n{CARD_END}",
        card.name,
        card.category,
        card.score,
        card.sustainability,
        card.co2,
        card.cost,
        card.co2_saved,
        card.profile,
    )
}

/// Parses the longest numeric prefix, `0.0` when there is none.
pub fn parse_leading_float(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if frac_digits > 0 || int_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f64>().ok().filter(|value| value.is_finite()).unwrap_or(0.0)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}
