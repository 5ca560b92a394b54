use serde::{Deserialize, Serialize};

use super::CandidateRow;
use crate::domain::recommendation::{Recommendation, RecommendationProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfiledCandidate {
    pub profile: RecommendationProfile,
    pub row: CandidateRow,
}

impl ProfiledCandidate {
    pub fn to_recommendation(&self) -> Recommendation {
        let row = &self.row;
        Recommendation {
            name: row.name.clone(),
            category: row.category.label().to_string(),
            score: row.scores.global,
            sustainability: row.scores.environmental,
            co2: row.co2_kg_per_kg,
            cost: row.price_score,
            // cards report savings as negative numbers; `+ 0.0` folds -0.0
            co2_saved: -row.co2_delta + 0.0,
            profile: self.profile.label().to_string(),
            profile_color: self.profile.color().to_string(),
        }
    }
}

/// Greedy top-3 diversification over a ranked candidate list.
///
/// Steps run in [`RecommendationProfile::ORDER`]. Rows are told apart by
/// display name, so two keys sharing a name count as one pick.
pub struct ProfileSelector;

impl ProfileSelector {
    pub fn select(ranked: &[CandidateRow]) -> Vec<ProfiledCandidate> {
        let Some(first) = ranked.first() else {
            return Vec::new();
        };

        let mut picks = vec![ProfiledCandidate {
            profile: RecommendationProfile::OverallBest,
            row: first.clone(),
        }];

        let steps: [(RecommendationProfile, fn(&CandidateRow) -> f64); 2] = [
            (RecommendationProfile::Ecological, |row| row.scores.environmental),
            (RecommendationProfile::Economic, |row| row.price_score),
        ];
        for (profile, key) in steps {
            let mut reordered: Vec<&CandidateRow> = ranked.iter().collect();
            reordered.sort_by(|a, b| key(b).total_cmp(&key(a)));

            let next = reordered
                .into_iter()
                .find(|row| picks.iter().all(|pick| pick.row.name != row.name));
            if let Some(row) = next {
                picks.push(ProfiledCandidate { profile, row: row.clone() });
            }
        }

        picks
    }
}

#[cfg(test)]
mod tests {
    use super::ProfileSelector;
    use crate::domain::material::MaterialCategory;
    use crate::domain::recommendation::RecommendationProfile;
    use crate::recommend::CandidateRow;
    use crate::scoring::ScoreCard;

    fn row(name: &str, global: f64, environmental: f64, price_score: f64) -> CandidateRow {
        CandidateRow {
            key: name.to_lowercase(),
            name: name.to_string(),
            category: MaterialCategory::Metal,
            scores: ScoreCard { clinical: 7.0, environmental, mechanical: 5.0, global },
            safety: 9.0,
            price_score,
            co2_delta: 12.3,
            co2_kg_per_kg: 29.7,
            biodegradable: false,
            mri_compatible: true,
            service_life_years: 20,
            reference: String::new(),
        }
    }

    fn names(picks: &[super::ProfiledCandidate]) -> Vec<(&str, RecommendationProfile)> {
        picks.iter().map(|pick| (pick.row.name.as_str(), pick.profile)).collect()
    }

    #[test]
    fn picks_one_row_per_axis_in_fixed_order() {
        let ranked = vec![
            row("Titanium", 8.0, 4.0, 4.0),
            row("PEEK", 7.5, 5.0, 2.0),
            row("PLA", 7.0, 9.0, 8.0),
            row("Steel", 6.5, 6.0, 8.0),
        ];
        let picks = ProfileSelector::select(&ranked);

        assert_eq!(
            names(&picks),
            vec![
                ("Titanium", RecommendationProfile::OverallBest),
                ("PLA", RecommendationProfile::Ecological),
                ("Steel", RecommendationProfile::Economic),
            ]
        );
    }

    #[test]
    fn ecological_pick_skips_the_overall_winner() {
        let ranked = vec![row("Cork", 9.0, 10.0, 8.0), row("Hemp", 8.0, 9.5, 6.0)];
        let picks = ProfileSelector::select(&ranked);

        assert_eq!(
            names(&picks),
            vec![
                ("Cork", RecommendationProfile::OverallBest),
                ("Hemp", RecommendationProfile::Ecological),
            ]
        );
    }

    #[test]
    fn duplicate_names_never_pad_the_result() {
        let mut twin = row("Titanium", 7.9, 9.0, 9.0);
        twin.key = "titanium_alt".to_string();
        let ranked = vec![row("Titanium", 8.0, 4.0, 4.0), twin];

        let picks = ProfileSelector::select(&ranked);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].row.key, "titanium");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(ProfileSelector::select(&[]).is_empty());
    }

    #[test]
    fn equal_axis_scores_resolve_to_ranked_order() {
        let ranked = vec![
            row("A", 9.0, 3.0, 2.0),
            row("B", 8.0, 7.0, 6.0),
            row("C", 7.0, 7.0, 6.0),
        ];
        let picks = ProfileSelector::select(&ranked);

        assert_eq!(picks[1].row.name, "B");
        assert_eq!(picks[2].row.name, "C");
    }

    #[test]
    fn recommendation_flips_delta_sign_and_carries_profile_color() {
        let picks = ProfileSelector::select(&[row("Titanium", 8.0, 4.0, 4.0)]);
        let recommendation = picks[0].to_recommendation();

        assert_eq!(recommendation.profile, "Best Overall");
        assert_eq!(recommendation.profile_color, "#15803d");
        assert_eq!(recommendation.co2_saved, -12.3);
        assert_eq!(recommendation.cost, 4.0);
        assert_eq!(recommendation.category, "Metal");

        let mut neutral = row("Baseline", 5.0, 5.0, 5.0);
        neutral.co2_delta = 0.0;
        let picks = ProfileSelector::select(&[neutral]);
        assert!(picks[0].to_recommendation().co2_saved.is_sign_positive());
    }
}
