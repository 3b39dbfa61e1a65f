use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use test_support::Scratch;

fn fileinfo_query() -> Command {
    let mut command = Command::new(cargo_bin("fileinfo-query"));
    command.env_remove("FILEINFO_LOG");
    command
}

#[test]
fn describes_a_regular_file() {
    let scratch = Scratch::new().expect("scratch");
    let path = scratch.file("report.txt", b"hello world").expect("write");

    fileinfo_query()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("  standard:name: report.txt\n"))
        .stdout(predicate::str::contains("  stat:size: 11\n"))
        .stdout(predicate::str::contains("  stat:type: regular\n"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn name_only_request_skips_stat_fields() {
    let scratch = Scratch::new().expect("scratch");
    let path = scratch.file(".dotfile", b"").expect("write");

    fileinfo_query()
        .args(["-a", "standard:name,standard:is-hidden"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("  standard:is-hidden: true\n"))
        .stdout(predicate::str::contains("stat:").not());
}

#[test]
fn missing_file_exits_with_one() {
    let scratch = Scratch::new().expect("scratch");

    fileinfo_query()
        .arg(scratch.path().join("nope"))
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("fileinfo-query: error stating file"));
}

#[test]
fn usage_error_exits_with_two() {
    fileinfo_query()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn json_lines_per_path() {
    let scratch = Scratch::new().expect("scratch");
    let first = scratch.file("a", b"1").expect("write");
    let second = scratch.file("b", b"22").expect("write");

    let output = fileinfo_query()
        .args(["--json", "-a", "stat:size"])
        .arg(&first)
        .arg(&second)
        .output()
        .expect("run");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let sizes: Vec<u64> = stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).expect("json line");
            value["attributes"]["stat:size"].as_u64().expect("size")
        })
        .collect();
    assert_eq!(sizes, vec![1, 2]);
}

#[test]
fn verbose_logging_goes_to_stderr() {
    let scratch = Scratch::new().expect("scratch");
    let path = scratch.file("logged", b"").expect("write");

    fileinfo_query()
        .args(["-vv", "-a", "stat:size"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("stat:size: 0"))
        .stderr(predicate::str::contains("collected file info"));
}

#[test]
fn log_directive_from_environment() {
    let scratch = Scratch::new().expect("scratch");
    let path = scratch.file("quiet", b"").expect("write");

    fileinfo_query()
        .env("FILEINFO_LOG", "fileinfo::collect=debug")
        .args(["-a", "stat:size"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("fileinfo::collect"));
}

#[cfg(target_os = "linux")]
#[test]
fn extended_attributes_by_name() {
    let scratch = Scratch::new().expect("scratch");
    let path = scratch.file("tagged", b"").expect("write");
    if !test_support::xattrs_supported(&path) {
        eprintln!("xattrs not supported, skipping test");
        return;
    }
    xattr::set(&path, "user.colour", b"blue").expect("set colour");
    xattr::set(&path, "user.shape", b"round").expect("set shape");

    fileinfo_query()
        .args(["-a", "xattr:user.colour"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("  xattr:user.colour: blue\n"))
        .stdout(predicate::str::contains("user.shape").not());
}
