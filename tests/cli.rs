use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_scene(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(xml.as_bytes()).expect("write scene");
    tmp
}

const SCENE: &str = r#"<scene>
  <object>
    <name>Camera</name>
    <type>camera</type>
    <background>0 0 0</background>
  </object>
  <object>
    <name>Sphere</name>
    <type>mesh</type>
    <position>1 2 3</position>
    <color>255 0 0</color>
    <emission>255 255 255</emission>
  </object>
  <object>
    <name>Region</name>
    <type>region</type>
    <position>0 0 1</position>
    <scale>1 1 1</scale>
  </object>
  <vibration target="Sphere" seed="1">
    <waveform>jitter</waveform>
    <amplitude>0.01</amplitude>
  </vibration>
  <toggle target="Sphere" region="Region"/>
  <hand preference="right"/>
  <track>
    <frame><hand side="right">0 0 1</hand></frame>
    <frame></frame>
  </track>
</scene>
"#;

#[test]
fn cli_replays_track_and_prints_final_state() {
    let scene = write_scene(SCENE);
    let mut cmd = Command::cargo_bin("palmfx").expect("binary exists");
    cmd.arg(scene.path()).arg("--ticks").arg("5");
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 3 objects (1 vibrations, 1 toggles)"))
        .stdout(contains(" - Sphere (mesh)"))
        .stdout(contains("Ran 5 tick(s)"))
        // The track ends on an empty frame, so the sphere is back at rest.
        .stdout(contains(
            " - Sphere pos=(1.000, 2.000, 3.000) color=(1.00, 0.00, 0.00) emission=on",
        ))
        .stdout(contains("Background color=(0.00, 0.00, 0.00)"))
        .stdout(contains("Toggle Sphere: normal"));
}

#[test]
fn cli_holds_last_frame_inside_region() {
    let held = SCENE.replace("<frame></frame>", "");
    let scene = write_scene(&held);
    let mut cmd = Command::cargo_bin("palmfx").expect("binary exists");
    cmd.arg(scene.path()).arg("--ticks").arg("3").arg("--seed").arg("7");
    cmd.assert()
        .success()
        .stdout(contains("color=(0.00, 0.00, 0.00) emission=off"))
        .stdout(contains("Background color=(1.00, 1.00, 1.00)"))
        .stdout(contains("Toggle Sphere: inverted"));
}

#[test]
fn cli_keeps_running_when_a_toggle_target_is_missing() {
    let ghost = SCENE.replace(
        r#"<toggle target="Sphere" region="Region"/>"#,
        r#"<toggle target="Sphere" region="Region"/><toggle target="Ghost" region="Region"/>"#,
    );
    let scene = write_scene(&ghost);
    let mut cmd = Command::cargo_bin("palmfx").expect("binary exists");
    cmd.arg(scene.path()).arg("--ticks").arg("2");
    cmd.assert()
        .success()
        .stdout(contains("(1 vibrations, 2 toggles)"))
        .stdout(contains("Toggle Ghost: normal"));
}

#[test]
fn cli_rejects_unknown_arguments() {
    let scene = write_scene(SCENE);
    let mut cmd = Command::cargo_bin("palmfx").expect("binary exists");
    cmd.arg(scene.path()).arg("--render");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --render"));
}

#[test]
fn cli_reports_missing_usage() {
    let mut cmd = Command::cargo_bin("palmfx").expect("binary exists");
    cmd.assert().failure().stderr(contains("Usage: palmfx"));
}
