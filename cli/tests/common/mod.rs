#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

pub fn cli_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("courier").expect("courier binary should be built");
    cmd.arg("--db").arg(data_dir.join("courier.sqlite"));
    cmd.env_remove("COURIER_DB");
    cmd
}

/// First column of the first listed row.
pub fn first_listed_id(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .map(str::to_string)
        .expect("Expected an id in list output")
}
