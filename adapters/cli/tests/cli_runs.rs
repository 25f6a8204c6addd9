use std::{
    path::PathBuf,
    process::{Command, Output},
};

fn demo_terrain() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/terrain.json")
}

fn skirmish(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skirmish"))
        .arg(demo_terrain())
        .args(args)
        .output()
        .expect("failed to launch the skirmish binary")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "skirmish exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("stdout is utf-8")
}

#[test]
fn summary_reports_demo_terrain() {
    let stdout = stdout_of(&skirmish(&["summary"]));

    assert!(stdout.contains("title:          Twin Fords"), "{stdout}");
    assert!(stdout.contains("surface cells:  8x8"), "{stdout}");
    assert!(stdout.contains("unit cells:     16x16"), "{stdout}");
    assert!(stdout.contains("checksum:"), "{stdout}");
    assert!(stdout.contains("start 0:        (2, 2)"), "{stdout}");
    assert!(stdout.contains("start 1:        (12, 12)"), "{stdout}");
}

#[test]
fn summary_is_stable_between_runs() {
    let first = stdout_of(&skirmish(&["summary"]));
    let second = stdout_of(&skirmish(&["summary"]));

    assert_eq!(first, second);
}

#[test]
fn inspect_reports_lake_cell_blocked_for_land() {
    let stdout = stdout_of(&skirmish(&["inspect", "--x", "6", "--y", "6"]));

    assert!(stdout.contains("cell:           (6, 6) Land"), "{stdout}");
    assert!(stdout.contains("free:           false"), "{stdout}");

    let stdout = stdout_of(&skirmish(&["inspect", "--x", "6", "--y", "6", "--field", "air"]));
    assert!(stdout.contains("free:           true"), "{stdout}");
}

#[test]
fn fog_draws_one_row_per_surface_row() {
    let stdout = stdout_of(&skirmish(&["fog", "--x", "0", "--y", "0", "--sight", "4"]));
    let rows: Vec<&str> = stdout.lines().collect();

    assert_eq!(rows.len(), 8, "{stdout}");
    assert!(rows.iter().all(|row| row.chars().count() == 8), "{stdout}");
    assert!(rows[0].starts_with('o'), "observer cell must be visible: {stdout}");
    assert!(rows[7].ends_with('#'), "far corner stays unexplored: {stdout}");
}

#[test]
fn inspect_outside_the_grid_fails() {
    let output = skirmish(&["inspect", "--x", "99", "--y", "0"]);

    assert!(!output.status.success());
}
