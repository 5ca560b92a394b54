use std::env;
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use mater_cli::commands::{cards, catalog, chat, config, doctor, recommend, score};
use serde_json::Value;

#[test]
fn recommend_returns_three_profiles_as_json() {
    with_env(&[], || {
        let result = recommend::run(Some("orthopedics"), None, None, true);
        assert_eq!(result.exit_code, 0, "expected successful local ranking");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["baseline"], "titanium_grade5");

        let picks = payload["data"]["recommendations"].as_array().cloned().unwrap_or_default();
        let profiles: Vec<_> = picks.iter().map(|pick| pick["profile"].clone()).collect();
        assert_eq!(profiles, vec!["Best Overall", "Ecological Profile", "Economic Profile"]);
        assert_eq!(picks[1]["profileColor"], "#0369a1");
    });
}

#[test]
fn recommend_reads_application_and_baseline_from_case_text() {
    with_env(&[], || {
        let result = recommend::run(
            None,
            Some("72 year old patient, hip replacement, current stainless steel stem"),
            None,
            true,
        );
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["application"], "hip");
        assert_eq!(payload["data"]["baseline"], "steel_316l");
        assert_eq!(payload["data"]["intake"]["age"], 72);
    });
}

#[test]
fn recommend_human_output_lists_profiles() {
    with_env(&[], || {
        let result = recommend::run(Some("dental"), None, Some("titanium_grade5"), false);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("top picks for `dental`"));
        assert!(result.output.contains("- Best Overall: "));
    });
}

#[test]
fn recommend_requires_an_application_or_case() {
    with_env(&[], || {
        let result = recommend::run(None, None, None, true);
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_input");
    });
}

#[test]
fn recommend_rejects_unknown_baseline() {
    with_env(&[("MATER_CATALOG_BASELINE_MATERIAL", "unobtainium")], || {
        let result = recommend::run(Some("orthopedics"), None, None, true);
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "unknown_baseline");
    });
}

#[test]
fn commands_report_config_failures() {
    with_env(&[("MATER_LOG_FORMAT", "xml")], || {
        let result = recommend::run(Some("orthopedics"), None, None, true);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn score_reports_scores_and_transport() {
    with_env(&[("MATER_CATALOG_TRANSPORT_WEIGHT_KG", "0.2")], || {
        let result = score::run("titanium_grade5");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let data = &payload["data"];
        assert_eq!(data["key"], "titanium_grade5");
        assert_eq!(data["transport_weight_kg"], 0.2);
        let global = data["scores"]["global"].as_f64().unwrap_or_default();
        assert!(global > 0.0 && global <= 10.0);
        assert!(data["transport"]["mode"].is_string());
    });
}

#[test]
fn score_rejects_unknown_material() {
    with_env(&[], || {
        let result = score::run("unobtainium");
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "unknown_material");
    });
}

#[test]
fn catalog_lists_materials_for_a_field() {
    with_env(&[], || {
        let result = catalog::run(Some("aerospace"));
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("materials for Aerospace:"));
        assert!(result.output.contains("inconel_718"));
        assert!(!result.output.contains("collagen_bovine"));

        let invalid = catalog::run(Some("geology"));
        assert_eq!(invalid.exit_code, 4);
    });
}

#[test]
fn cards_extracts_blocks_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "Short analysis.\n---CARD---\n**name:** PEEK Standard (Victrex 450G)\ncategory: Polymer\nscore: 8.1\nprofile: Lowest Carbon\n---END---\n"
    )
    .expect("write");

    let result = cards::run(Some(file.path()));
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    let card = &payload["data"]["cards"][0];
    assert_eq!(card["name"], "PEEK Standard (Victrex 450G)");
    assert_eq!(card["score"], 8.1);
    assert_eq!(card["profileColor"], "#0369a1");
    assert_eq!(payload["data"]["cleanText"], "Short analysis.");
}

#[test]
fn chat_replays_a_recorded_transcript() {
    with_env(&[], || {
        let reply = "Recommended options.\n---CARD---\nname: Stainless Steel 316L\nprofile: Economic Profile\n---END---";
        let mut transcript = String::new();
        for piece in reply.as_bytes().chunks(9) {
            let content = String::from_utf8_lossy(piece).into_owned();
            transcript.push_str(&format!(
                "data: {}\n\n",
                serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
            ));
        }
        transcript.push_str("data: [DONE]\n\n");

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(transcript.as_bytes()).expect("write");

        let result = chat::run(chat::ChatOptions {
            message: "cheap femoral plate",
            field: Some("medicine"),
            replay: Some(file.path()),
            ..chat::ChatOptions::default()
        });
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["completed"], true);
        assert_eq!(payload["data"]["cards"][0]["name"], "Stainless Steel 316L");
        assert_eq!(payload["data"]["findings"][0]["reason_code"], "unexpected_card_count");
    });
}

#[test]
fn chat_answers_unknown_fields_as_medicine() {
    with_env(&[], || {
        let transcript = format!(
            "data: {}\n\ndata: [DONE]\n\n",
            serde_json::json!({ "choices": [{ "delta": { "content": "Which bone is involved?" } }] })
        );
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(transcript.as_bytes()).expect("write");

        let result = chat::run(chat::ChatOptions {
            message: "implant for a wrist",
            field: Some("biology"),
            replay: Some(file.path()),
            ..chat::ChatOptions::default()
        });
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["field"], "medicine");
        assert_eq!(payload["data"]["clean_text"], "Which bone is involved?");
    });
}

#[test]
fn doctor_passes_with_defaults_and_local_endpoint() {
    with_env(&[], || {
        let (passed, output) = doctor::run(true);
        assert!(passed, "{output}");

        let report = parse_payload(&output);
        assert_eq!(report["overall_status"], "pass");
        let names: Vec<_> =
            report["checks"].as_array().into_iter().flatten().map(|c| c["name"].clone()).collect();
        assert_eq!(
            names,
            vec!["config_validation", "catalog_load", "baseline_known", "llm_credentials"]
        );
    });
}

#[test]
fn doctor_flags_remote_endpoint_without_key() {
    with_env(&[("MATER_LLM_ENDPOINT", "https://llm.example.com/v1/chat/completions")], || {
        let (passed, output) = doctor::run(false);
        assert!(!passed);
        assert!(output.contains("- [fail] llm_credentials: set MATER_LLM_API_KEY"));
    });
}

#[test]
fn config_attributes_sources_and_redacts_keys() {
    with_env(&[("MATER_LLM_MODEL", "mistral-small"), ("MATER_LLM_API_KEY", "sk-secret-value")], || {
        let output = config::run();
        assert!(output.contains("- llm.model = mistral-small (source: env (MATER_LLM_MODEL))"));
        assert!(output.contains("- llm.api_key = sk-*** (source: env (MATER_LLM_API_KEY))"));
        assert!(output.contains("- server.port = 8080 (source: default)"));
        assert!(!output.contains("secret-value"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "MATER_LLM_ENDPOINT",
        "MATER_LLM_API_KEY",
        "MATER_LLM_MODEL",
        "MATER_LLM_CONNECT_TIMEOUT_SECS",
        "MATER_CATALOG_PATH",
        "MATER_CATALOG_BASELINE_MATERIAL",
        "MATER_CATALOG_TRANSPORT_WEIGHT_KG",
        "MATER_SERVER_BIND_ADDRESS",
        "MATER_SERVER_PORT",
        "MATER_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "MATER_LOGGING_LEVEL",
        "MATER_LOGGING_FORMAT",
        "MATER_LOG_LEVEL",
        "MATER_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
