use std::collections::HashSet;

use mater_core::cards::render_card;
use mater_core::scoring::{clinical_score, environmental_score, global_score, mechanical_score};
use mater_core::{recommend, CardExtractor, Catalog, RecommendationProfile};

fn catalog() -> Catalog {
    Catalog::bundled().expect("bundled catalog should load")
}

#[test]
fn every_bundled_score_stays_within_zero_and_ten() {
    let catalog = catalog();
    for material in catalog.iter() {
        for (label, score) in [
            ("clinical", clinical_score(material)),
            ("environmental", environmental_score(material)),
            ("mechanical", mechanical_score(material)),
            ("global", global_score(material)),
        ] {
            assert!((0.0..=10.0).contains(&score), "{} {label} score {score}", material.key);
        }
    }
}

#[test]
fn orthopedic_query_yields_three_distinct_profiles() {
    let catalog = catalog();
    let selection = recommend(&catalog, "Orthopedics", "titanium_grade5");

    assert!(selection.candidates.len() >= 3);
    for pair in selection.candidates.windows(2) {
        assert!(pair[0].scores.global >= pair[1].scores.global);
    }

    let profiles: Vec<RecommendationProfile> =
        selection.top.iter().map(|pick| pick.profile).collect();
    assert_eq!(profiles, RecommendationProfile::ORDER.to_vec());

    let names: HashSet<&str> = selection.top.iter().map(|pick| pick.row.name.as_str()).collect();
    assert_eq!(names.len(), 3);
    assert_eq!(selection.top[0].row, selection.candidates[0]);
}

#[test]
fn non_medical_tags_rank_against_the_same_baseline() {
    let catalog = catalog();
    let selection = recommend(&catalog, "facade", "titanium_grade5");
    assert!(!selection.top.is_empty());
    assert!(selection.candidates.iter().all(|row| row.co2_delta.is_finite()));
}

#[test]
fn unknown_inputs_degrade_to_empty_selections() {
    let catalog = catalog();
    assert!(recommend(&catalog, "orthopedics", "unobtainium").top.is_empty());
    assert!(recommend(&catalog, "underwater basket weaving", "titanium_grade5").top.is_empty());
}

#[test]
fn local_picks_survive_a_trip_through_card_text() {
    let catalog = catalog();
    let selection = recommend(&catalog, "spine", "titanium_grade5");
    let local: Vec<_> = selection.top.iter().map(|pick| pick.to_recommendation()).collect();

    let text = local.iter().map(render_card).collect::<Vec<_>>().join("\n\nNext pick:\n");
    let extraction = CardExtractor::default().extract(&format!("Summary first.\n{text}"));

    assert_eq!(extraction.cards, local);
    assert!(extraction.clean_text.starts_with("Summary first."));
    assert!(!extraction.clean_text.contains("---CARD---"));
}

#[test]
fn recommendation_json_uses_camel_case_keys() {
    let catalog = catalog();
    let selection = recommend(&catalog, "hip", "titanium_grade5");
    let json = serde_json::to_value(selection.top[0].to_recommendation()).expect("json");

    for key in [
        "name",
        "category",
        "score",
        "sustainability",
        "co2",
        "cost",
        "co2Saved",
        "profile",
        "profileColor",
    ] {
        assert!(json.get(key).is_some(), "missing `{key}`");
    }
    assert_eq!(json["profile"], "Best Overall");
}
