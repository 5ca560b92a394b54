use mater_core::catalog::Catalog;
use mater_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    fn passed(&self) -> bool {
        self.overall_status == CheckStatus::Pass
    }
}

/// Returns the rendered report and whether every check passed.
pub fn run(json_output: bool) -> (bool, String) {
    let report = build_report();

    if json_output {
        let rendered = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return (report.passed(), rendered);
    }

    (report.passed(), render_human(&report))
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match Catalog::load(config.catalog.path.as_deref()) {
                Ok(catalog) => {
                    checks.push(DoctorCheck {
                        name: "catalog_load",
                        status: CheckStatus::Pass,
                        details: format!(
                            "{} materials, {} origins ({})",
                            catalog.len(),
                            catalog.origin_count(),
                            config
                                .catalog
                                .path
                                .as_ref()
                                .map(|path| path.display().to_string())
                                .unwrap_or_else(|| "bundled".to_string())
                        ),
                    });
                    checks.push(check_baseline(&config, &catalog));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "catalog_load",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("baseline_known", "catalog did not load"));
                }
            }
            checks.push(check_llm_credentials(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["catalog_load", "baseline_known", "llm_credentials"] {
                checks.push(skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

fn check_baseline(config: &AppConfig, catalog: &Catalog) -> DoctorCheck {
    let key = &config.catalog.baseline_material;
    match catalog.find(key) {
        Some(material) => DoctorCheck {
            name: "baseline_known",
            status: CheckStatus::Pass,
            details: format!("`{key}` resolves to {}", material.name),
        },
        None => DoctorCheck {
            name: "baseline_known",
            status: CheckStatus::Fail,
            details: format!("baseline material `{key}` is not in the catalog"),
        },
    }
}

/// A missing key is only a failure for remote endpoints; local servers run keyless.
fn check_llm_credentials(config: &AppConfig) -> DoctorCheck {
    let endpoint = &config.llm.endpoint;
    let local = endpoint.contains("://localhost") || endpoint.contains("://127.0.0.1");
    if config.has_llm_credentials() {
        DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Pass,
            details: format!("api key configured for `{endpoint}`"),
        }
    } else if local {
        DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Pass,
            details: format!("no api key needed for local endpoint `{endpoint}`"),
        }
    } else {
        DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Fail,
            details: format!("set MATER_LLM_API_KEY to call `{endpoint}`"),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
