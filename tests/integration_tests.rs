//! Integration tests for the vineyard-gate CLI
//!
//! These drive the real binary against a temporary project directory.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const TOKEN: &str = "GJDFHDFHFDJGSDAGKGHK";

/// Helper to create a vineyard-gate Command with a clean gate environment
fn vineyard() -> Command {
    let mut cmd = cargo_bin_cmd!("vineyard-gate");
    cmd.env_remove("VINEYARD_GATE_ENDPOINT")
        .env_remove("VINEYARD_GATE_TOKEN")
        .env_remove("VINEYARD_ACCESS_CODE")
        .env_remove("VINEYARD_GATE_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

fn init_project(dir: &TempDir) {
    vineyard()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
}

fn store_contents(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join(".vineyard/defaults.json")).unwrap()
}

fn save_redirect(dir: &TempDir, url: &str) {
    fs::create_dir_all(dir.path().join(".vineyard")).unwrap();
    fs::write(
        dir.path().join(".vineyard/defaults.json"),
        format!(r#"{{"savedWebViewURL": "{}"}}"#, url),
    )
    .unwrap();
}

/// Serve `body` for every GET on a local gate endpoint.
///
/// Returns `None` when the sandbox forbids binding a socket.
fn spawn_gate(body: &'static str) -> Option<String> {
    let listener = match std::net::TcpListener::bind("127.0.0.1:0") {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Skipping: cannot bind local gate server: {}", e);
            return None;
        }
    };
    listener.set_nonblocking(true).ok()?;
    let addr = listener.local_addr().ok()?;

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = axum::Router::new()
                .route("/server.php", axum::routing::get(move || async move { body }));
            axum::serve(listener, app).await.unwrap();
        });
    });

    Some(format!("http://{}/server.php", addr))
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        vineyard()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("launch"))
            .stdout(predicate::str::contains("inventory"));
    }

    #[test]
    fn test_version() {
        vineyard().arg("--version").assert().success();
    }

    #[test]
    fn test_init_creates_structure() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized"));

        assert!(dir.path().join(".vineyard/gate.toml").exists());
        assert!(dir.path().join(".vineyard/defaults.json").exists());
        assert!(dir.path().join(".vineyard/logs").is_dir());
    }

    #[test]
    fn test_init_idempotent() {
        let dir = create_temp_project();
        init_project(&dir);

        vineyard()
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_project_dir_flag() {
        let dir = create_temp_project();

        vineyard()
            .arg("--project-dir")
            .arg(dir.path())
            .arg("init")
            .assert()
            .success();

        assert!(dir.path().join(".vineyard").exists());
    }

    #[test]
    fn test_verbose_and_json_log_flags_accepted() {
        let dir = create_temp_project();
        init_project(&dir);

        vineyard()
            .current_dir(dir.path())
            .args(["--verbose", "--log-json", "gate", "status"])
            .assert()
            .success();
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_config_show_defaults() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No gate.toml found"))
            .stdout(predicate::str::contains("retry_delay_ms = 2000"))
            .stdout(predicate::str::contains("GJDF****"))
            .stdout(predicate::str::contains(TOKEN).not());
    }

    #[test]
    fn test_config_init_creates_toml() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created gate.toml"));

        let content = fs::read_to_string(dir.path().join(".vineyard/gate.toml")).unwrap();
        assert!(content.contains("[gate]"));
        assert!(content.contains("[launch]"));

        vineyard()
            .current_dir(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_config_validate_defaults() {
        let dir = create_temp_project();
        init_project(&dir);

        vineyard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid"));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = create_temp_project();
        fs::create_dir_all(dir.path().join(".vineyard")).unwrap();
        fs::write(
            dir.path().join(".vineyard/gate.toml"),
            "[launch]\nretry_delay_ms = 0\n",
        )
        .unwrap();

        vineyard()
            .current_dir(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("retry_delay_ms = 0"));
    }

    #[test]
    fn test_config_validate_checks_overridden_endpoint() {
        let dir = create_temp_project();
        init_project(&dir);

        vineyard()
            .current_dir(dir.path())
            .env("VINEYARD_GATE_ENDPOINT", "mailto:gate@example.com")
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cannot carry a query"));

        vineyard()
            .current_dir(dir.path())
            .args(["--endpoint", "mailto:gate@example.com", "config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Invalid gate endpoint"));
    }

    #[test]
    fn test_env_overrides_endpoint() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .env("VINEYARD_GATE_ENDPOINT", "https://env.test/server.php")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "endpoint = \"https://env.test/server.php\"",
            ));
    }

    #[test]
    fn test_malformed_toml_fails() {
        let dir = create_temp_project();
        fs::create_dir_all(dir.path().join(".vineyard")).unwrap();
        fs::write(dir.path().join(".vineyard/gate.toml"), "[gate\n").unwrap();

        vineyard()
            .current_dir(dir.path())
            .args(["gate", "status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("gate.toml"));
    }
}

// =============================================================================
// Launch gate
// =============================================================================

mod gate {
    use super::*;

    #[test]
    fn test_status_without_saved_redirect() {
        let dir = create_temp_project();
        init_project(&dir);

        vineyard()
            .current_dir(dir.path())
            .args(["gate", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No saved redirect"));
    }

    #[test]
    fn test_status_shows_saved_redirect() {
        let dir = create_temp_project();
        save_redirect(&dir, "https://cached.test/home");

        vineyard()
            .current_dir(dir.path())
            .args(["gate", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("https://cached.test/home"));
    }

    #[test]
    fn test_reset_force_clears_saved_redirect() {
        let dir = create_temp_project();
        save_redirect(&dir, "https://cached.test/home");

        vineyard()
            .current_dir(dir.path())
            .args(["gate", "reset", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared"));

        assert!(!store_contents(&dir).contains("savedWebViewURL"));
    }

    #[test]
    fn test_probe_prints_request_parameters() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["--endpoint", "https://probe.test/server.php?p=ACCESS", "gate", "probe"])
            .assert()
            .success()
            .stdout(predicate::str::contains("https://probe.test/server.php?p=Bs2675kDjkb5Ga"))
            .stdout(predicate::str::contains("devicemodel"))
            .stdout(predicate::str::contains("country"));
    }

    #[test]
    fn test_probe_rejects_malformed_endpoint() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["--endpoint", "not a url", "gate", "probe"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid gate endpoint"));
    }

    #[test]
    fn test_launch_uses_saved_redirect_without_network() {
        let dir = create_temp_project();
        save_redirect(&dir, "https://cached.test/home");

        // An unroutable endpoint proves no request is made
        vineyard()
            .current_dir(dir.path())
            .args(["--endpoint", "http://127.0.0.1:9/server.php", "launch"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Redirecting to https://cached.test/home"));
    }

    #[test]
    fn test_launch_trusted_response_is_saved() {
        let Some(endpoint) =
            spawn_gate("GJDFHDFHFDJGSDAGKGHK#https://web.test/landing")
        else {
            return;
        };
        let dir = create_temp_project();
        init_project(&dir);

        vineyard()
            .current_dir(dir.path())
            .args(["--endpoint", &endpoint, "launch"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Redirecting to https://web.test/landing"));

        assert!(store_contents(&dir).contains("https://web.test/landing"));
    }

    #[test]
    fn test_launch_untrusted_response_shows_native() {
        let Some(endpoint) = spawn_gate("WRONGTOKEN#https://evil.test") else {
            return;
        };
        let dir = create_temp_project();
        init_project(&dir);

        vineyard()
            .current_dir(dir.path())
            .args(["--endpoint", &endpoint, "launch"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Showing the cellar app"));

        assert!(!store_contents(&dir).contains("savedWebViewURL"));
    }

    #[test]
    fn test_probe_send_does_not_save() {
        let Some(endpoint) =
            spawn_gate("GJDFHDFHFDJGSDAGKGHK#https://web.test/landing")
        else {
            return;
        };
        let dir = create_temp_project();
        init_project(&dir);

        vineyard()
            .current_dir(dir.path())
            .args(["--endpoint", &endpoint, "gate", "probe", "--send"])
            .assert()
            .success()
            .stdout(predicate::str::contains("redirect to https://web.test/landing"))
            .stdout(predicate::str::contains("nothing was saved"));

        assert!(!store_contents(&dir).contains("savedWebViewURL"));
    }
}

// =============================================================================
// Inventory
// =============================================================================

mod inventory {
    use super::*;

    #[test]
    fn test_list_shows_bundled_catalog() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Stainless Tank A1"))
            .stdout(predicate::str::contains("7 containers"));
    }

    #[test]
    fn test_undecodable_saved_list_is_not_replaced() {
        let dir = create_temp_project();
        fs::create_dir_all(dir.path().join(".vineyard")).unwrap();
        let saved = r#"{"SavedContainers": [{"id": 1, "name": "My Edited Tank", "status": "Bottled"}]}"#;
        fs::write(dir.path().join(".vineyard/defaults.json"), saved).unwrap();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("inventory reset"));
        assert!(store_contents(&dir).contains("My Edited Tank"));

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "reset", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Restored 7 containers"));

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("7 containers"));
    }

    #[test]
    fn test_edit_persists_and_logs_activity() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "edit", "1", "--temperature", "9.5", "--status", "ready"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Updated status, temperature"));

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "show", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("9.5"))
            .stdout(predicate::str::contains("Ready"));

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "activity"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Updated status and temperature for Stainless Tank A1",
            ));
    }

    #[test]
    fn test_edit_without_fields_fails() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "edit", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Nothing to change"));
    }

    #[test]
    fn test_edit_rejects_unknown_status() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "edit", "1", "--status", "bottled"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown status"));
    }

    #[test]
    fn test_show_unknown_container_fails() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "show", "999"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Container 999 not found"));
    }

    #[test]
    fn test_like_and_list_favorites() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "like", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Added Oak Barrel B7 to favorites"));

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "list", "--favorites"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Oak Barrel B7"))
            .stdout(predicate::str::contains("Stainless Tank A1").not());

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "like", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed Oak Barrel B7 from favorites"));
    }

    #[test]
    fn test_add_remove_and_reset() {
        let dir = create_temp_project();
        let file = dir.path().join("tank.json");
        fs::write(
            &file,
            r#"{
                "id": 50,
                "name": "Overflow Tank",
                "type": "Stainless Steel Tank",
                "capacity": 2000,
                "currentVolume": 0,
                "grapeVariety": null,
                "harvestDate": null,
                "status": "Empty",
                "location": "Crush Pad",
                "temperature": 17.0,
                "ph": null,
                "coordinates": { "latitude": 38.5, "longitude": -122.26 }
            }"#,
        )
        .unwrap();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "add"])
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("Added container 50"));

        // duplicate ids are rejected
        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "add"])
            .arg(&file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "remove", "1"])
            .assert()
            .success();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "reset", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Restored 7 containers"));

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Stainless Tank A1"))
            .stdout(predicate::str::contains("Overflow Tank").not());
    }

    #[test]
    fn test_stats() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "stats", "--top", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cellar Overview"))
            .stdout(predicate::str::contains("Oak Barrel B7"))
            .stdout(predicate::str::contains("Stainless Tank A4"))
            .stdout(predicate::str::contains("Concrete Egg C2").not());
    }

    #[test]
    fn test_activity_clear() {
        let dir = create_temp_project();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "remove", "3"])
            .assert()
            .success();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "activity", "--clear"])
            .assert()
            .success();

        vineyard()
            .current_dir(dir.path())
            .args(["inventory", "activity"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No recent activity"));
    }
}
