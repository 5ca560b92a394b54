//! Keyword-based reading of a free-text case description.

use serde::{Deserialize, Serialize};

pub const DEFAULT_AGE: u32 = 35;
pub const DEFAULT_BASELINE: &str = "titanium_grade5";
const PEDIATRIC_AGE_LIMIT: u32 = 18;

/// Application tag and the phrases that vote for it. Order breaks ties.
pub const APPLICATION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "bone oncology",
        &["cancer", "tumor", "tumour", "oncology", "sarcoma", "metastasis", "osteosarcoma", "resection"],
    ),
    (
        "pediatrics",
        &["child", "children", "pediatric", "paediatric", "pediatrics", "infant", "adolescent", "growth"],
    ),
    (
        "spine",
        &[
            "spine", "spinal", "vertebra", "vertebrae", "scoliosis", "lumbar", "cervical", "disc",
            "back", "hernia",
        ],
    ),
    (
        "trauma",
        &["fracture", "trauma", "fixation", "broken", "osteosynthesis", "plate", "screw"],
    ),
    ("dental", &["tooth", "teeth", "dental", "dental implant", "crown", "bridge", "alveolar"]),
    (
        "maxillofacial",
        &["jaw", "maxillary", "facial", "mandible", "face", "cranial", "orbit"],
    ),
    (
        "hip",
        &["hip", "hip replacement", "femoral neck", "proximal femur", "hip arthroplasty"],
    ),
    (
        "knee",
        &["knee", "knee replacement", "cruciate ligament", "meniscus", "patella", "knee arthroplasty"],
    ),
    (
        "hand",
        &["hand", "finger", "wrist", "carpal", "metacarpal", "phalanx", "carpal tunnel"],
    ),
    ("orthopedics", &["orthopedic", "orthopaedic", "orthopedics", "joint", "articular", "long bone"]),
    (
        "neurosurgery",
        &["neuro", "neurosurgery", "skull", "brain", "cranio", "cranioplasty", "dura"],
    ),
    (
        "cardiovascular",
        &["heart", "cardiac", "valve", "aorta", "coronary", "cardiovascular", "bypass"],
    ),
    (
        "vascular",
        &["artery", "vein", "vascular", "stent", "endoprosthesis", "ischemia", "ischaemia"],
    ),
    (
        "ophthalmology",
        &["eye", "eyes", "ophthalmology", "retina", "cornea", "lens", "glaucoma"],
    ),
    ("reconstruction", &["reconstruction", "plasty", "graft", "scar", "flap", "soft tissue"]),
    ("ent", &["ent", "ear", "nose", "throat", "eardrum", "otolaryngology", "cochlear"]),
];

/// Material word to catalog key. The first alias present in the text wins.
pub const MATERIAL_ALIASES: &[(&str, &str)] = &[
    ("titanium", "titanium_grade5"),
    ("steel", "steel_316l"),
    ("peek", "peek"),
    ("cobalt", "cobalt_chrome"),
    ("zirconia", "zirconia"),
    ("plga", "plga_resorbable"),
    ("pla", "pla_bio"),
    ("magnesium", "magnesium_bio"),
    ("tantalum", "tantalum_porous"),
    ("nitinol", "nitinol"),
    ("alumina", "alumina"),
    ("silicone", "silicone_medical"),
    ("hydroxyapatite", "hydroxyapatite"),
    ("pmma", "pmma_neuro"),
    ("dacron", "dacron_polyester"),
    ("ptfe", "ptfe_expanded"),
    ("pyrocarbon", "pyrocarbon"),
    ("collagen", "collagen_bovine"),
];

const AGE_MARKERS: &[&str] = &["years", "year", "yrs", "yr", "y/o", "y.o", "yo"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseIntake {
    pub age: u32,
    pub application: String,
    pub baseline_key: String,
}

impl CaseIntake {
    pub fn from_text(text: &str, default_baseline: &str) -> Self {
        let lowered = text.to_lowercase();
        let words = tokenize(&lowered);
        let age = detect_age(&lowered);
        Self {
            age,
            application: detect_application(&words, age).to_string(),
            baseline_key: detect_baseline(&words).unwrap_or(default_baseline).to_string(),
        }
    }
}

/// Number followed by a years marker, else the first number, else [`DEFAULT_AGE`].
pub fn detect_age(text: &str) -> u32 {
    let text = text.to_lowercase();
    let mut first_number = None;
    let mut rest = text.as_str();

    while let Some(start) = rest.find(|ch: char| ch.is_ascii_digit()) {
        let digits_len =
            rest[start..].find(|ch: char| !ch.is_ascii_digit()).unwrap_or(rest.len() - start);
        let digits = &rest[start..start + digits_len];
        let after = &rest[start + digits_len..];
        rest = after;

        let Ok(number) = digits.parse::<u32>() else {
            continue;
        };
        first_number.get_or_insert(number);

        let marker_text = after.trim_start_matches(|ch: char| ch.is_whitespace() || ch == '-');
        let has_marker = AGE_MARKERS.iter().any(|marker| {
            marker_text.strip_prefix(*marker).is_some_and(|tail| {
                !tail.starts_with(|ch: char| ch.is_alphanumeric())
            })
        });
        if has_marker {
            return number;
        }
    }

    first_number.unwrap_or(DEFAULT_AGE)
}

fn detect_application(words: &[&str], age: u32) -> &'static str {
    let mut best: Option<(&'static str, usize)> = None;
    for &(tag, keywords) in APPLICATION_KEYWORDS {
        let hits = keywords.iter().filter(|keyword| contains_phrase(words, keyword)).count();
        if hits > best.map_or(0, |(_, count)| count) {
            best = Some((tag, hits));
        }
    }

    match best {
        Some((tag, _)) => tag,
        None if age < PEDIATRIC_AGE_LIMIT => "pediatrics",
        None => "orthopedics",
    }
}

fn detect_baseline(words: &[&str]) -> Option<&'static str> {
    MATERIAL_ALIASES
        .iter()
        .find(|(alias, _)| contains_phrase(words, alias))
        .map(|(_, key)| *key)
}

fn tokenize(text: &str) -> Vec<&str> {
    text.split(|ch: char| !ch.is_alphanumeric()).filter(|word| !word.is_empty()).collect()
}

fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let needle = tokenize(phrase);
    !needle.is_empty() && words.windows(needle.len()).any(|window| window == needle.as_slice())
}
