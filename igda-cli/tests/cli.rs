use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "igda-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

/// Working directory with its own snapshot path, isolated from any `.env`.
fn workspace(label: &str) -> (PathBuf, PathBuf) {
    let dir = temp_path(label);
    std::fs::create_dir_all(&dir).expect("create workspace");
    let data = dir.join("datos.json");
    (dir, data)
}

fn igda(dir: &Path, data: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_igda");
    Command::new(exe)
        .current_dir(dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("IGDA_DATA")
        .env_remove("IGDA_MODEL")
        .env_remove("IGDA_API_BASE")
        .env("NO_COLOR", "1")
        .args(args)
        .arg("--data")
        .arg(data)
        .output()
        .expect("run cli")
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_runs_the_whole_wizard_with_manual_geography() {
    let (dir, data) = workspace("wizard");

    let output = igda(
        &dir,
        &data,
        &["geography", "Example", "--length", "1500", "--width", "500"],
    );
    assert_ok(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("PD: 1000.00 km"));

    assert_ok(&igda(
        &dir,
        &data,
        &["foods", "coffee", "rice", "cheese", "lettuce"],
    ));
    let output = igda(&dir, &data, &["tables"]);
    assert_ok(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Nacional table"));

    assert_ok(&igda(
        &dir,
        &data,
        &["distances", "10500", "450", "55", "8"],
    ));
    assert_ok(&igda(
        &dir,
        &data,
        &["modes", "buy", "buy", "barter", "produce"],
    ));

    let values_path = dir.join("values.json");
    let mut values_args = vec!["values", "--report", "json", "--output"];
    let values_arg = values_path.to_string_lossy().into_owned();
    values_args.push(&values_arg);
    assert_ok(&igda(&dir, &data, &values_args));
    let values: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&values_path).expect("read values"))
            .expect("values json");
    let scored: Vec<i64> = values
        .as_array()
        .expect("value rows")
        .iter()
        .map(|row| row["value"].as_i64().expect("value"))
        .collect();
    assert_eq!(scored, vec![0, 3, 6, 10]);

    let before_result = std::fs::read(&data).expect("read snapshot");
    let report_path = dir.join("report.json");
    let report_arg = report_path.to_string_lossy().into_owned();
    assert_ok(&igda(
        &dir,
        &data,
        &["result", "--report", "json", "--output", &report_arg],
    ));
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).expect("read report"))
            .expect("report json");
    assert_eq!(report["total_value"], 19);
    assert_eq!(report["igda"], 2.11);
    assert_eq!(report["category"], "regional");
    assert_eq!(report["insufficient_data"], false);

    // The result stage saves the record again; nothing in it changes.
    assert_eq!(std::fs::read(&data).expect("reread snapshot"), before_result);
    let snapshot = std::fs::read_to_string(&data).expect("read snapshot");
    assert!(snapshot.contains("\n    \"country\": \"Example\""));
    assert!(snapshot.contains("\"accumulated_value\": 10"));

    let output = igda(&dir, &data, &["status"]);
    assert_ok(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("values aggregated"));
    assert!(stdout.contains("igda result"));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn cli_refuses_out_of_order_stage_with_exit_code_two() {
    let (dir, data) = workspace("order");
    let output = igda(&dir, &data, &["tables"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot reach 'tables built' before 'geography resolved'"));
    assert!(stderr.contains("igda geography"));
    assert!(!data.exists());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn cli_failed_stage_leaves_snapshot_untouched() {
    let (dir, data) = workspace("untouched");
    assert_ok(&igda(&dir, &data, &["geography", "--length", "80", "--width", "40"]));
    assert_ok(&igda(&dir, &data, &["foods", "bread", "milk"]));
    assert_ok(&igda(&dir, &data, &["tables"]));
    let before = std::fs::read(&data).expect("read snapshot");

    let output = igda(&dir, &data, &["distances", "5"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("expected 2 distances"));

    let output = igda(&dir, &data, &["distances", "5", "-1"]);
    assert_eq!(output.status.code(), Some(2));

    let too_many: Vec<String> = (1..=10).map(|i| format!("food{i}")).collect();
    let mut args = vec!["foods"];
    args.extend(too_many.iter().map(String::as_str));
    let output = igda(&dir, &data, &args);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("between 1 and 9 foods"));

    assert_eq!(std::fs::read(&data).expect("reread snapshot"), before);
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn cli_lookup_without_key_stops_the_stage() {
    let (dir, data) = workspace("nokey");
    let output = igda(&dir, &data, &["geography", "Chile"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("OPENAI_API_KEY"));
    assert!(!data.exists());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn cli_unreachable_lookup_suggests_manual_entry() {
    let (dir, data) = workspace("offline");
    let output = igda(
        &dir,
        &data,
        &[
            "geography",
            "Chile",
            "--api-key",
            "test",
            "--api-base",
            "http://127.0.0.1:9/v1",
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--length <km> --width <km>"));
    assert!(!data.exists());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn cli_reads_legacy_snapshot() {
    let (dir, data) = workspace("legacy");
    std::fs::write(
        &data,
        r#"{
    "pais": "Ecuador",
    "largo": 714,
    "ancho": 658,
    "pd": 686.0,
    "alimentos": [
        {"nombre": "arroz", "km": 300, "nivel": "Nacional", "categoria": "Intermedio", "modo": "Compra", "valor_acumulado": 3},
        {"nombre": "yuca", "km": 5, "nivel": "Local", "categoria": "Cercano", "modo": "Produce", "valor_acumulado": 10}
    ],
    "tablas": {}
}"#,
    )
    .expect("write legacy snapshot");

    let output = igda(&dir, &data, &["status"]);
    assert_ok(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Country: Ecuador"));
    assert!(stdout.contains("arroz"));
    // The empty legacy tables are dropped, so the tables stage is next.
    assert!(stdout.contains("igda tables"));

    let output = igda(&dir, &data, &["result", "--report", "markdown"]);
    assert_ok(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("- **i-GDA**: 1.54"));
    assert!(stdout.contains("- **Diet type**: LOCAL"));

    let saved = std::fs::read_to_string(&data).expect("read saved snapshot");
    assert!(saved.contains("\"foods\": ["));
    assert!(!saved.contains("alimentos"));
    std::fs::remove_dir_all(dir).ok();
}
