use anyhow::Result;
use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const MANIFEST: &str = r#"
[Environment]
ipc = true
network = true

["Session Bus Policy"]
"org.freedesktop.Notifications" = "talk"

["Environment Vars"]
LD_LIBRARY_PATH = "/app/lib"
"#;

const RUNTIME_MANIFEST: &str = r#"
["Session Bus Policy"]
"org.freedesktop.portal.*" = "talk"
"#;

/// `applaunch` with a scrubbed environment rooted in `root`.
fn applaunch(root: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("applaunch")?;
    cmd.env_clear()
        .env("HOME", root.path())
        .env("XDG_CONFIG_HOME", root.child("config").path())
        .env("XDG_RUNTIME_DIR", root.child("runtime").path())
        .current_dir(root.path());
    Ok(cmd)
}

fn write_manifests(root: &TempDir) -> Result<()> {
    root.child("metadata.toml").write_str(MANIFEST)?;
    root.child("runtime.toml").write_str(RUNTIME_MANIFEST)?;
    Ok(())
}

#[test]
fn resolve_combines_flags_after_forbid() -> Result<()> {
    let root = TempDir::new()?;
    write_manifests(&root)?;

    let output = applaunch(&root)?
        .args(["resolve", "org.example.Player", "--manifest", "metadata.toml"])
        .args(["--forbid", "network", "--json"])
        .output()?;
    assert!(output.status.success());

    let context: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(context["app_id"], "org.example.Player");
    assert_eq!(context["launcher_args"], serde_json::json!(["-i"]));
    assert_eq!(context["grants"]["network"]["granted"], false);
    Ok(())
}

#[test]
fn resolve_rejects_unknown_capability() -> Result<()> {
    let root = TempDir::new()?;
    write_manifests(&root)?;

    applaunch(&root)?
        .args(["resolve", "org.example.Player", "-m", "metadata.toml"])
        .args(["--allow", "network,bluetooth"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown capability: bluetooth"));

    assert!(!root.child("runtime/bus-proxy").path().exists());
    Ok(())
}

#[test]
fn filters_list_runtime_rules_before_manifest_rules() -> Result<()> {
    let root = TempDir::new()?;
    write_manifests(&root)?;

    applaunch(&root)?
        .args(["filters", "org.example.Player", "-m", "metadata.toml"])
        .args(["--runtime-manifest", "runtime.toml"])
        .assert()
        .success()
        .stdout(
            "--filter\n\
             --own=org.example.Player\n\
             --own=org.example.Player.*\n\
             --talk=org.freedesktop.portal.*\n\
             --talk=org.freedesktop.Notifications\n",
        );
    Ok(())
}

#[test]
fn env_points_xdg_dirs_at_app_data_dir() -> Result<()> {
    let root = TempDir::new()?;
    write_manifests(&root)?;
    let app_dir = root.child(".var/app/org.example.Player");

    applaunch(&root)?
        .args(["env", "org.example.Player", "-m", "metadata.toml", "--ensure-data-dir"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "XDG_DATA_HOME={}",
            app_dir.child("data").path().display()
        )))
        .stdout(predicate::str::contains("_LD_LIBRARY_PATH=/app/lib"));

    app_dir.child("cache").assert(predicate::path::is_dir());
    app_dir.child("config").assert(predicate::path::is_dir());
    Ok(())
}

#[test]
fn register_honours_disabled_confinement() -> Result<()> {
    let root = TempDir::new()?;

    applaunch(&root)?
        .args(["-c", "confinement.enabled=false"])
        .args(["register", "org.example.Player", "--pid", "4321"])
        .assert()
        .success()
        .stdout("disabled\n");
    Ok(())
}

#[test]
fn invalid_config_override_is_reported() -> Result<()> {
    let root = TempDir::new()?;

    applaunch(&root)?
        .args(["-c", "confinement.unit_prefix=\"has space\""])
        .args(["verify", "network"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unit_prefix"));
    Ok(())
}

#[test]
fn verify_accepts_known_names_only() -> Result<()> {
    let root = TempDir::new()?;

    applaunch(&root)?
        .args(["verify", "network,x11", "pulseaudio"])
        .assert()
        .success()
        .stdout("ok: network, x11, pulseaudio\n");

    applaunch(&root)?
        .args(["verify", "nost-fs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown capability: nost-fs"));
    Ok(())
}

#[test]
fn broken_user_config_is_reported_on_stderr() -> Result<()> {
    let root = TempDir::new()?;
    root.child("config/applaunch/applaunch.toml")
        .write_str("[launch\nproxy = ")?;

    applaunch(&root)?
        .args(["verify", "network"])
        .assert()
        .success()
        .stdout("ok: network\n")
        .stderr(predicate::str::contains("Ignoring configuration layer"));
    Ok(())
}

#[test]
fn session_proxy_lands_in_default_proxy_dir() -> Result<()> {
    let root = TempDir::new()?;
    write_manifests(&root)?;

    let output = applaunch(&root)?
        .env("DBUS_SESSION_BUS_ADDRESS", "unix:abstract=/tmp/dbus-test")
        .args(["resolve", "org.example.Player", "-m", "metadata.toml", "--json"])
        .output()?;
    assert!(output.status.success());

    let context: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let bus = &context["grants"]["session-dbus"]["access"]["bus"];
    assert_eq!(bus["mode"], "proxied");
    assert_eq!(bus["filtered"], true);
    let endpoint = bus["endpoint"].as_str().unwrap_or_default();
    assert!(
        endpoint.starts_with(&root.child("runtime/bus-proxy").path().display().to_string()),
        "{endpoint}"
    );
    Ok(())
}
