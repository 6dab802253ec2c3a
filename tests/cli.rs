//
//  bitbucket-server-driver
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bbs_driver(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bbs-driver").unwrap();
    cmd.env_remove("BBS_DOMAINS")
        .env_remove("BBS_TOKEN")
        .env_remove("BBS_USERNAME")
        .arg("--config")
        .arg(config_dir.path().join("config.toml"));
    cmd
}

#[test]
fn test_supports_allow_listed_url() {
    let dir = TempDir::new().unwrap();

    bbs_driver(&dir)
        .args([
            "supports",
            "https://bitbucket.mycompany.com/scm/project/repo.git",
            "--domain",
            "bitbucket.mycompany.com",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"supported\": true"))
        .stdout(predicate::str::contains("\"origin\": \"bitbucket.mycompany.com\""));
}

#[test]
fn test_supports_reads_domains_from_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "bitbucket-server-domains = [\"git.example.com:7990\"]\n",
    )
    .unwrap();

    bbs_driver(&dir)
        .args(["supports", "http://git.example.com:7990/scm/PROJ/app.git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slug\": \"app\""));
}

#[test]
fn test_supports_foreign_url_exits_unsupported() {
    let dir = TempDir::new().unwrap();

    bbs_driver(&dir)
        .args([
            "supports",
            "https://github.com/acme/app.git",
            "--domain",
            "bitbucket.mycompany.com",
        ])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("\"supported\": false"));
}

#[test]
fn test_supports_rejects_scp_style_url() {
    let dir = TempDir::new().unwrap();

    bbs_driver(&dir)
        .args([
            "supports",
            "git@bitbucket.mycompany.com:project/repo.git",
            "--domain",
            "bitbucket.mycompany.com",
        ])
        .assert()
        .code(3);
}
