//! Integration tests for the monolith-versions CLI.

use std::fs;
use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "name": "park-manager/park-manager",
    "require": {
        "rollerworks/search": "^2.0",
        "rollerworks/search-doctrine-dbal": "^2.0",
        "rollerworks/search-doctrine-orm": "^2.0",
        "symfony/framework-bundle": "^8.1"
    },
    "extra": {
        "monolith-versions": {
            "rollersearch": {"package": "rollerworks/search-*", "constraint": "^2.0"},
            "symfony": {"package": "symfony/*", "constraint": "^8.1"}
        }
    }
}"#;

const LOCKFILE: &str = r#"{
    "packages": [
        {"name": "rollerworks/search", "version": "2.0.0"},
        {"name": "rollerworks/search-doctrine-dbal", "version": "2.0.0"},
        {"name": "rollerworks/search-doctrine-orm", "version": "2.0.0"},
        {"name": "symfony/framework-bundle", "version": "8.1.0", "type": "symfony-bundle"}
    ]
}"#;

/// Create a project directory with a manifest, lock file and empty settings file.
fn project(manifest: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("composer.json"), manifest).unwrap();
    fs::write(dir.path().join("composer.lock"), LOCKFILE).unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();
    dir
}

/// Helper to run monolith-versions in `dir` and return (stdout, stderr, exit_code).
fn run(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> (String, String, i32) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_monolith-versions"));
    command
        .current_dir(dir)
        .arg("--config")
        .arg(dir.join("config.toml"))
        .args(args)
        .env_remove("COMPOSER_MONOLITH_ROLLERSEARCH")
        .env_remove("COMPOSER_MONOLITH_SYMFONY");
    for (key, value) in env {
        command.env(key, value);
    }

    let output = command.output().expect("Failed to run monolith-versions");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn find<'a>(pool: &'a [Value], name: &str) -> &'a Value {
    pool.iter()
        .find(|p| p["name"] == name)
        .unwrap_or_else(|| panic!("{} not in pool", name))
}

#[test]
fn test_version() {
    let dir = project(MANIFEST);
    let (stdout, _stderr, exit_code) = run(dir.path(), &["version"], &[]);

    assert_eq!(exit_code, 0);
    assert_eq!(
        stdout.trim(),
        format!("monolith-versions {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_check_valid_configuration() {
    let dir = project(MANIFEST);
    let (_stdout, stderr, exit_code) = run(dir.path(), &["check"], &[]);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stderr.contains("rollersearch: ^2.0 <- ^((rollerworks/search-[a-z0-9-.]+))$"));
    assert!(stderr.contains("symfony: ^8.1 <- ^((symfony/[a-z0-9-.]+))$"));
    assert!(stderr.contains("Configuration is valid."));
}

#[test]
fn test_check_invalid_pattern() {
    let dir = project(
        r#"{
            "name": "acme/app",
            "extra": {
                "monolith-versions": {
                    "rollersearch": {"package": "rollerworks/he-*-{you,now}", "constraint": "^2.0"}
                }
            }
        }"#,
    );
    let (_stdout, stderr, exit_code) = run(dir.path(), &["check"], &[]);

    assert_ne!(exit_code, 0);
    assert!(stderr.contains("Invalid configuration detected in \"extra.monolith-versions\""));
    assert!(stderr.contains(
        "\"rollersearch\": package \"rollerworks/he-*-{you,now}\" is not valid. Cannot contain both a wildcard and expands."
    ));
}

#[test]
fn test_resolve_adds_metapackages() {
    let dir = project(MANIFEST);
    let (stdout, stderr, exit_code) = run(dir.path(), &["resolve"], &[]);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    let pool: Vec<Value> = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = pool.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(
        names,
        vec![
            "rollerworks/search",
            "rollerworks/search-doctrine-dbal",
            "rollerworks/search-doctrine-orm",
            "symfony/framework-bundle",
            "park-manager/park-manager",
            "rollersearch",
            "symfony",
        ]
    );

    let rollersearch = find(&pool, "rollersearch");
    assert_eq!(rollersearch["type"], "metapackage");
    assert_eq!(rollersearch["version"], "dev-main");
    assert_eq!(rollersearch["dist"]["type"], "path");
    assert_eq!(rollersearch["require"]["rollerworks/search-doctrine-dbal"], "^2.0");
    assert_eq!(rollersearch["require"]["rollerworks/search-doctrine-orm"], "^2.0");
    assert!(rollersearch["require"].get("rollerworks/search").is_none());

    let root = find(&pool, "park-manager/park-manager");
    assert_eq!(root["kind"], "root");
    assert_eq!(root["require"]["rollersearch"], "== dev-main");
    assert_eq!(root["require"]["symfony"], "== dev-main");
    assert_eq!(root["require"]["rollerworks/search"], "^2.0");

    assert!(stderr.contains(
        "Restricting package \"rollerworks/search-doctrine-dbal\" to \"^2.0\" by monolith config \"rollersearch\""
    ));
    assert!(stderr.contains(
        "Restricting package \"symfony/framework-bundle\" to \"^8.1\" by monolith config \"symfony\""
    ));
}

#[test]
fn test_resolve_with_env_override() {
    let dir = project(MANIFEST);
    let (stdout, stderr, exit_code) = run(
        dir.path(),
        &["resolve"],
        &[("COMPOSER_MONOLITH_ROLLERSEARCH", "^2.1")],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stderr.contains(
        "Monolith config \"rollersearch\" overwritten by ENV configuration to \"^2.1\"."
    ));

    let pool: Vec<Value> = serde_json::from_str(&stdout).unwrap();
    let rollersearch = find(&pool, "rollersearch");
    assert_eq!(rollersearch["require"]["rollerworks/search-doctrine-dbal"], "^2.1");
    assert_eq!(find(&pool, "symfony")["require"]["symfony/framework-bundle"], "^8.1");
}

#[test]
fn test_resolve_with_branch_alias_override() {
    let dir = project(MANIFEST);
    let (stdout, stderr, exit_code) = run(
        dir.path(),
        &["resolve"],
        &[("COMPOSER_MONOLITH_ROLLERSEARCH", "2.x-dev")],
    );

    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    let pool: Vec<Value> = serde_json::from_str(&stdout).unwrap();
    let rollersearch = find(&pool, "rollersearch");
    assert_eq!(rollersearch["require"]["rollerworks/search-doctrine-orm"], "2.x-dev");
}

#[test]
fn test_resolve_keeps_unparsed_root_requirements() {
    let dir = project(
        r#"{
            "name": "park-manager/park-manager",
            "require": {
                "rollerworks/search": "self.version",
                "rollerworks/search-doctrine-dbal": "2.0-beta1",
                "symfony/framework-bundle": "1.0 - 9.0"
            },
            "extra": {
                "monolith-versions": {
                    "rollersearch": {"package": "rollerworks/search-*", "constraint": "^2.0"}
                }
            }
        }"#,
    );
    let (stdout, stderr, exit_code) = run(dir.path(), &["resolve"], &[]);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    let pool: Vec<Value> = serde_json::from_str(&stdout).unwrap();
    let root = find(&pool, "park-manager/park-manager");
    let targets: Vec<&String> = root["require"].as_object().unwrap().keys().collect();
    assert_eq!(
        targets,
        vec![
            "rollerworks/search",
            "rollerworks/search-doctrine-dbal",
            "symfony/framework-bundle",
            "rollersearch",
        ]
    );
    assert_eq!(root["require"]["rollerworks/search"], "self.version");
    assert_eq!(root["require"]["rollerworks/search-doctrine-dbal"], "2.0-beta1");
}

#[test]
fn test_resolve_with_invalid_env_override() {
    let dir = project(MANIFEST);
    let (_stdout, stderr, exit_code) = run(
        dir.path(),
        &["resolve"],
        &[("COMPOSER_MONOLITH_ROLLERSEARCH", "not a constraint")],
    );

    assert_ne!(exit_code, 0);
    assert!(stderr.contains("Monolith config \"rollersearch\" constraint by ENV is not valid."));
}

#[test]
fn test_resolve_with_invalid_configuration_keeps_pool() {
    let dir = project(r#"{"name": "acme/app", "extra": {"monolith-versions": "broken"}}"#);
    let (stdout, stderr, exit_code) = run(dir.path(), &["resolve"], &[]);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(stderr.contains(
        "<warning>The \"extra.monolith-versions\" option must be an object.</warning>"
    ));

    let pool: Vec<Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(pool.len(), 5);
}

#[test]
fn test_quiet_hides_info_lines() {
    let dir = project(MANIFEST);
    let (stdout, stderr, exit_code) = run(dir.path(), &["resolve", "--quiet"], &[]);

    assert_eq!(exit_code, 0);
    assert!(!stderr.contains("Restricting package"));
    assert!(!stdout.is_empty());
}

#[test]
fn test_init_creates_settings() {
    let dir = project(MANIFEST);
    let target = dir.path().join("nested").join("config.toml");
    let (_stdout, stderr, exit_code) =
        run(dir.path(), &["init", "--path", target.to_str().unwrap()], &[]);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert!(target.exists());
    assert!(stderr.contains("Settings file created at:"));
}

#[test]
fn test_missing_manifest() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();
    let (_stdout, stderr, exit_code) = run(dir.path(), &["check"], &[]);

    assert_ne!(exit_code, 0);
    assert!(stderr.contains("Failed to read"));
}
