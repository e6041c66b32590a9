use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn scenario(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs/scenarios")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn reports_each_cut_of_the_mars_scenario() {
    Command::cargo_bin("termpt")
        .expect("termpt bin")
        .args(["--scenario", &scenario("mars.yaml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Method:         UMBRAL/TANGENT/ELLIPSOID"))
        .stdout(predicate::str::contains("Number of cuts: 3"))
        .stdout(
            predicate::str::contains("Number of terminator points at this roll angle: 1").count(3),
        );
}

#[test]
fn overrides_and_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv = dir.path().join("points.csv");
    let json = dir.path().join("summary.json");

    Command::cargo_bin("termpt")
        .expect("termpt bin")
        .args([
            "--scenario",
            &scenario("mars.yaml"),
            "--method",
            "penumbral/tangent/ellipsoid",
            "--abcorr",
            "cn+s",
            "--locus",
            "ellipsoid terminator",
            "--cuts",
            "4",
            "--refvec",
            "0,1,1",
            "--csv",
            csv.to_str().unwrap(),
            "--json",
            json.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("PENUMBRAL/TANGENT/ELLIPSOID"))
        .stdout(predicate::str::contains("CN+S (ELLIPSOID TERMINATOR)"))
        .stdout(predicate::str::contains("Number of cuts: 4"));

    let contents = std::fs::read_to_string(&csv).expect("csv");
    assert_eq!(contents.lines().count(), 5);
    assert!(contents.starts_with("cut,roll_deg,point,"));
    let summary = std::fs::read_to_string(&json).expect("json");
    assert!(summary.contains("\"locus\": \"ELLIPSOID TERMINATOR\""));
}

#[test]
fn topographic_scenario_runs() {
    Command::cargo_bin("termpt")
        .expect("termpt bin")
        .args(["--scenario", &scenario("phobos.yaml"), "--cuts", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SURFACES=\"PHOBOS LOW RES\""))
        .stdout(predicate::str::contains("Number of cuts: 4"));
}

#[test]
fn configuration_errors_fail_with_a_message() {
    Command::cargo_bin("termpt")
        .expect("termpt bin")
        .args([
            "--scenario",
            &scenario("mars.yaml"),
            "--method",
            "umbral/guided/dsk/unprioritized",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GUIDED"));

    Command::cargo_bin("termpt")
        .expect("termpt bin")
        .args(["--scenario", &scenario("mars.yaml"), "--max-points", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than 2 terminator points"));
}

#[test]
fn missing_scenario_is_reported() {
    Command::cargo_bin("termpt")
        .expect("termpt bin")
        .args(["--scenario", "does/not/exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading scenario"));
}

#[test]
fn refvec_takes_three_comma_separated_components() {
    Command::cargo_bin("termpt")
        .expect("termpt bin")
        .args(["--scenario", &scenario("mars.yaml"), "--refvec", "-0.5,0,1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of cuts: 3"));

    Command::cargo_bin("termpt")
        .expect("termpt bin")
        .args(["--scenario", &scenario("mars.yaml"), "--refvec", "0,1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("three components, got 2"));
}
