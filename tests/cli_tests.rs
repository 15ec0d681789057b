// CLI regression tests: run the `harness` binary against a fake course layout
// Requires: assert_cmd, predicates crates in [dev-dependencies]

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

use common::Course;

fn harness(course: &Course) -> Command {
    let mut cmd = Command::cargo_bin("harness").unwrap();
    cmd.arg("--root")
        .arg(course.root())
        .arg("--case-list")
        .arg(course.case_list())
        .arg("--fail-log")
        .arg(course.fail_log());
    cmd
}

#[test]
fn cli_run_prints_one_line_per_case() {
    let course = Course::new();
    course.add_case("t1", "42\n");
    course.add_case("t2", "x\n");
    course.write_case_list(&["t1", "missing", "t2"]);

    harness(&course)
        .args(["run", "PA4", "--skip-build", "--timeout", "5", "--reference-bin-dir"])
        .arg(course.reference_dir())
        .assert()
        .success()
        .stdout("case t1 PASS\ncase t2 FAIL\n");

    let log = fs::read_to_string(course.fail_log()).unwrap();
    assert!(log.contains("===== case t2 result for golden is ====="));
    assert!(!log.contains("case t1 "));
}

#[test]
fn cli_run_from_subdirectory_with_relative_paths() {
    let course = Course::new();
    course.add_case("t1", "42\n");
    course.add_case("t2", "x\n");
    course.write_case_list(&["t1", "t2"]);
    let work = course.root().join("work");
    fs::create_dir_all(&work).unwrap();

    Command::cargo_bin("harness")
        .unwrap()
        .current_dir(&work)
        .args(["--root", "..", "--case-list", "../case.list", "--fail-log", "faillog.txt"])
        .args(["run", "PA4", "--skip-build", "--reference-bin-dir", "../reference"])
        .assert()
        .success()
        .stdout("case t1 PASS\ncase t2 FAIL\n");

    let log = fs::read_to_string(work.join("faillog.txt")).unwrap();
    assert!(log.contains("+   1 | y"));
    assert!(!log.contains("No such file"));
}

#[test]
fn cli_run_reports_repeated_case_once() {
    let course = Course::new();
    course.add_case("t1", "42\n");
    course.write_case_list(&["t1", "t1"]);

    harness(&course)
        .args(["run", "PA4", "--skip-build", "--reference-bin-dir"])
        .arg(course.reference_dir())
        .assert()
        .success()
        .stdout("case t1 PASS\n");
}

#[test]
fn cli_run_truncates_previous_fail_log() {
    let course = Course::new();
    course.add_case("t1", "42\n");
    course.write_case_list(&["t1"]);
    fs::write(course.fail_log(), "===== case old result for golden is =====\n").unwrap();

    harness(&course)
        .args(["run", "PA4", "--skip-build", "--reference-bin-dir"])
        .arg(course.reference_dir())
        .assert()
        .success()
        .stdout("case t1 PASS\n");

    assert_eq!(fs::read_to_string(course.fail_log()).unwrap(), "");
}

#[test]
fn cli_run_aborts_on_timeout() {
    let course = Course::new();
    course.add_case("t1", "HANG\n");
    course.add_case("t2", "42\n");
    course.write_case_list(&["t1", "t2"]);

    harness(&course)
        .args(["run", "PA4", "--skip-build", "--timeout", "1", "--reference-bin-dir"])
        .arg(course.reference_dir())
        .assert()
        .code(255)
        .stdout("")
        .stderr(contains(">>>>cd ").and(contains("timeout")));
}

#[test]
fn cli_run_writes_summary_json() {
    let course = Course::new();
    course.add_case("t1", "42\n");
    course.write_case_list(&["t1"]);
    let summary = course.root().join("summary.json");

    harness(&course)
        .args(["run", "PA4", "--skip-build", "--reference-bin-dir"])
        .arg(course.reference_dir())
        .arg("--summary-json")
        .arg(&summary)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(json["passed"], 1);
    assert_eq!(json["phase"], "PA4");
    assert!(json["aborted"].is_null());
}

#[test]
fn cli_clean_removes_artifacts() {
    let course = Course::new();
    course.add_case("t1", "42\n");
    fs::write(course.examples().join("t1.s"), "main:\n").unwrap();
    fs::write(course.examples().join("keep.s"), "main:\n").unwrap();
    course.write_case_list(&["t1"]);

    // Exits 0 whether or not `make clean` itself succeeds here.
    harness(&course).args(["clean", "PA4"]).assert().success();

    assert!(!course.examples().join("t1.s").exists());
    assert!(course.examples().join("keep.s").exists());
    assert!(course.examples().join("t1.cl").exists());
}

#[test]
fn cli_missing_case_list_fails() {
    let course = Course::new();

    harness(&course)
        .args(["run", "PA4", "--skip-build"])
        .assert()
        .code(1)
        .stderr(contains("cannot read case list"));
}

#[test]
fn cli_rejects_unknown_phase() {
    let course = Course::new();
    course.write_case_list(&[]);

    harness(&course)
        .args(["run", "PA9"])
        .assert()
        .failure()
        .stderr(contains("unknown phase"));
}
