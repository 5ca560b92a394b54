use mater_core::intake::CaseIntake;
use mater_core::recommend::recommend;
use mater_core::Recommendation;
use serde::Serialize;
use tracing::info;

use crate::commands::{load_catalog, CommandResult, EXIT_INPUT};

const COMMAND: &str = "recommend";

#[derive(Debug, Serialize)]
struct RecommendReport {
    application: String,
    baseline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    intake: Option<CaseIntake>,
    candidates: usize,
    recommendations: Vec<Recommendation>,
}

pub fn run(
    application: Option<&str>,
    case: Option<&str>,
    baseline: Option<&str>,
    json_output: bool,
) -> CommandResult {
    let (config, catalog) = match load_catalog(COMMAND) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };
    let default_baseline = baseline.unwrap_or(&config.catalog.baseline_material);

    let (application, baseline, intake) = match (application, case) {
        (_, Some(case)) => {
            let intake = CaseIntake::from_text(case, default_baseline);
            // An explicit --baseline wins over one read from the case text.
            let baseline =
                baseline.map(str::to_string).unwrap_or_else(|| intake.baseline_key.clone());
            (intake.application.clone(), baseline, Some(intake))
        }
        (Some(application), None) => {
            (application.trim().to_string(), default_baseline.to_string(), None)
        }
        (None, None) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_input",
                "provide an application tag or --case \"<description>\"",
                EXIT_INPUT,
            );
        }
    };

    if catalog.find(&baseline).is_none() {
        return CommandResult::failure(
            COMMAND,
            "unknown_baseline",
            format!("baseline material `{baseline}` is not in the catalog"),
            EXIT_INPUT,
        );
    }

    let selection = recommend(&catalog, &application, &baseline);
    info!(
        event_name = "cli.recommend.ranked",
        application = %application,
        baseline = %baseline,
        candidates = selection.candidates.len(),
        picked = selection.top.len(),
        "local recommendation ranked"
    );

    let report = RecommendReport {
        candidates: selection.candidates.len(),
        recommendations: selection.top.iter().map(|pick| pick.to_recommendation()).collect(),
        application,
        baseline,
        intake,
    };

    if json_output {
        let message = format!(
            "{} recommendation(s) for `{}` from {} candidate(s)",
            report.recommendations.len(),
            report.application,
            report.candidates
        );
        return CommandResult::success_with(COMMAND, message, Some(&report));
    }
    CommandResult::text(render_human(&report))
}

fn render_human(report: &RecommendReport) -> String {
    let mut lines = Vec::new();
    if let Some(intake) = &report.intake {
        lines.push(format!(
            "case: age {} -> application `{}`, baseline `{}`",
            intake.age, intake.application, intake.baseline_key
        ));
    }
    if report.recommendations.is_empty() {
        lines.push(format!("no catalog materials are tagged `{}`", report.application));
        return lines.join("\n");
    }

    lines.push(format!(
        "top picks for `{}` (baseline `{}`, {} candidates):",
        report.application, report.baseline, report.candidates
    ));
    for pick in &report.recommendations {
        lines.push(format!(
            "- {}: {} [{}] score {:.2} | sustainability {:.2} | co2 {:.1} kg/kg | cost {:.1} | co2Saved {:.1}",
            pick.profile,
            pick.name,
            pick.category,
            pick.score,
            pick.sustainability,
            pick.co2,
            pick.cost,
            pick.co2_saved
        ));
    }
    lines.join("\n")
}
