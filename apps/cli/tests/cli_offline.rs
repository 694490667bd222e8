//! 离线子命令测试（不需要 CAN 硬件）

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn cli(config: &NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("ak-cli").unwrap();
    cmd.arg("--config").arg(config.path());
    cmd
}

const CUSTOM: &str = r#"
[default]
model = "AK80_9_V2"

[profiles.unit]
p_min = -1.0
p_max = 1.0
v_min = -1.0
v_max = 1.0
t_min = -1.0
t_max = 1.0
kp_max = 10.0
kd_max = 1.0
"#;

#[test]
fn profiles_lists_builtin_models() {
    let config = config_file("");
    cli(&config)
        .arg("profiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("AK80_6_V1p1"))
        .stdout(predicate::str::contains("AK80_64_V2"))
        .stdout(predicate::str::contains("(default)"));
}

#[test]
fn profiles_lists_custom_profiles() {
    let config = config_file(CUSTOM);
    cli(&config)
        .arg("profiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Custom profiles:"))
        .stdout(predicate::str::contains("unit"));
}

#[test]
fn encode_zero_command() {
    let config = config_file("");
    cli(&config)
        .args(["--model", "ak80-9-v2", "encode"])
        .assert()
        .success()
        .stdout("8000800000000800\n");
}

#[test]
fn encode_uses_model_from_config() {
    let config = config_file(CUSTOM);
    cli(&config)
        .args(["encode", "--kp", "250"])
        .assert()
        .success()
        .stdout("8000800800000800\n");
}

#[test]
fn encode_clamps_torque() {
    let config = config_file("");
    cli(&config)
        .args(["--model", "AK80_9_V2", "encode", "--tau", "100"])
        .assert()
        .success()
        .stdout("8000800000000FFF\n")
        .stderr(predicate::str::contains("clamped"));
}

#[test]
fn encode_with_custom_profile() {
    let config = config_file(CUSTOM);
    cli(&config)
        .args(["--model", "unit", "encode", "--pos", "1"])
        .assert()
        .success()
        .stdout("FFFF800000000800\n");
}

#[test]
fn encode_with_profile_file() {
    let config = config_file("");
    let profile = config_file(
        "p_min = -1.0\np_max = 1.0\nv_min = -1.0\nv_max = 1.0\nt_min = -1.0\nt_max = 1.0\nkp_max = 10.0\nkd_max = 1.0\naxis_direction = -1\n",
    );
    cli(&config)
        .arg("--profile-file")
        .arg(profile.path())
        .args(["encode", "--pos", "1"])
        .assert()
        .success()
        .stdout("0000800000000800\n");
}

#[test]
fn encode_negative_values_in_degrees() {
    let config = config_file("");
    cli(&config)
        .args(["--model", "AK80_9_V2", "encode", "--pos", "-716.2", "--degrees"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0000"));
}

#[test]
fn unknown_model_fails() {
    let config = config_file("");
    cli(&config)
        .args(["--model", "AK10", "encode"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AK10"));
}

#[test]
fn device_id_out_of_range_fails() {
    let config = config_file("");
    cli(&config)
        .args(["--id", "0x800", "encode"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("0x800"));
}

#[test]
fn invalid_config_fails() {
    let config = config_file("[default]\nbitrate = 1\n");
    cli(&config).arg("profiles").assert().failure();
}

#[cfg(target_os = "linux")]
#[test]
fn enable_on_missing_interface_fails() {
    let config = config_file("");
    cli(&config)
        .args(["--interface", "nonexistent_can99", "enable"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent_can99"));
}
