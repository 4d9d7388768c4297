//! CLI integration tests for the pcgstat binary

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

/// A small table with every default column, thousands separators included
fn fixture_csv() -> String {
    let mut csv = String::from(
        "title,pcg,avg_dev_time,budget,revenue,profit,user_satisfaction,team_size\n",
    );
    let rows = [
        ("a", true, 14.0, "\"1,200,000\"", "\"2,500,000\"", "\"1,300,000\"", 7.1, 12.0),
        ("b", true, 11.5, "\"900,000\"", "\"2,100,000\"", "\"1,200,000\"", 7.9, 9.0),
        ("c", true, 16.0, "\"1,500,000\"", "\"2,300,000\"", "\"800,000\"", 6.4, 15.0),
        ("d", true, 12.5, "\"1,050,000\"", "\"1,900,000\"", "\"850,000\"", 8.2, 10.0),
        ("e", true, 15.0, "\"1,350,000\"", "\"2,700,000\"", "\"1,350,000\"", 7.5, 13.0),
        ("f", true, 13.0, "\"1,100,000\"", "\"2,000,000\"", "\"900,000\"", 6.9, 11.0),
        ("g", false, 20.0, "\"1,800,000\"", "\"2,600,000\"", "\"800,000\"", 6.2, 18.0),
        ("h", false, 24.0, "\"2,200,000\"", "\"3,000,000\"", "\"800,000\"", 5.8, 22.0),
        ("i", false, 18.5, "\"1,700,000\"", "\"2,400,000\"", "\"700,000\"", 6.8, 17.0),
        ("j", false, 22.0, "\"2,000,000\"", "\"2,900,000\"", "\"900,000\"", 5.5, 20.0),
        ("k", false, 25.5, "\"2,400,000\"", "\"3,200,000\"", "\"800,000\"", 5.2, 24.0),
        ("l", false, 19.0, "\"1,750,000\"", "\"2,500,000\"", "\"750,000\"", 6.5, 16.0),
    ];
    for (title, pcg, dev, budget, revenue, profit, sat, team) in rows {
        csv.push_str(&format!(
            "{title},{pcg:?},{dev},{budget},{revenue},{profit},{sat},{team}\n"
        ));
    }
    csv
}

fn write_fixture(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("game_data.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(fixture_csv().as_bytes()).unwrap();
    path
}

#[test]
fn test_full_run_reports_and_renders() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());
    let out_dir = dir.path().join("results");

    Command::cargo_bin("pcgstat")
        .unwrap()
        .arg(&input)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Statistics"))
        .stdout(predicate::str::contains("Correlations"))
        .stdout(predicate::str::contains("Avg Dev Time Results:"))
        .stdout(predicate::str::contains("Shapiro-Wilk Test Statistic:"))
        .stdout(predicate::str::contains("Team Size vs Budget Correlation Results:"));

    // One histogram and one bar chart per metric, one scatter per pair
    for metric in ["avg_dev_time", "budget", "profit", "user_satisfaction", "team_size"] {
        assert!(
            out_dir.join("distributions").join(format!("{metric}.png")).is_file(),
            "missing histogram for {metric}"
        );
        assert!(
            out_dir
                .join("bar_charts")
                .join(format!("{metric}_bar_chart.png"))
                .is_file(),
            "missing bar chart for {metric}"
        );
    }
    assert!(out_dir
        .join("correlations")
        .join("team_size_vs_budget.png")
        .is_file());
    assert!(out_dir
        .join("correlations")
        .join("budget_vs_pcg.png")
        .is_file());
}

#[test]
fn test_generated_metrics_excluded_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());

    // The fixture has no performance/innovation columns; the default run
    // must not ask for them
    Command::cargo_bin("pcgstat")
        .unwrap()
        .arg(&input)
        .arg("--no-plots")
        .assert()
        .success()
        .stdout(predicate::str::contains("performance").not());
}

#[test]
fn test_include_generated_requires_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());

    Command::cargo_bin("pcgstat")
        .unwrap()
        .arg(&input)
        .arg("--include-generated")
        .arg("--no-plots")
        .assert()
        .failure()
        .stderr(predicate::str::contains("performance"));
}

#[test]
fn test_no_plots_skips_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());
    let out_dir = dir.path().join("results");

    Command::cargo_bin("pcgstat")
        .unwrap()
        .arg(&input)
        .arg("--out-dir")
        .arg(&out_dir)
        .arg("--no-plots")
        .assert()
        .success()
        .stdout(predicate::str::contains("Statistics"));

    assert!(!out_dir.exists());
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("pcgstat")
        .unwrap()
        .arg(dir.path().join("nonexistent.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn test_invalid_alpha_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());

    Command::cargo_bin("pcgstat")
        .unwrap()
        .arg(&input)
        .arg("--alpha")
        .arg("1.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--alpha"));
}

#[test]
fn test_config_file_overrides_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path());
    let config_path = dir.path().join("analysis.toml");
    std::fs::write(
        &config_path,
        r#"
metrics = ["team_size"]
thousands_separated_columns = []
regression_pairs = []
"#,
    )
    .unwrap();

    Command::cargo_bin("pcgstat")
        .unwrap()
        .arg(&input)
        .arg("--config")
        .arg(&config_path)
        .arg("--no-plots")
        .assert()
        .success()
        .stdout(predicate::str::contains("Team Size Results:"))
        .stdout(predicate::str::contains("Budget Results:").not());
}
