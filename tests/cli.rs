use assert_cmd::prelude::*;
use image::{Rgb, RgbImage};
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn earth_live() -> Command {
    Command::cargo_bin("earth-live").expect("binary exists")
}

#[test]
fn summary_lists_the_composed_scene() {
    earth_live()
        .arg("--summary-only")
        .assert()
        .success()
        .stdout(contains(
            "Composed scene with 7 nodes (camera at (0.00, 0.00, 4.00), fov 45)",
        ))
        .stdout(contains(" - background #020924"))
        .stdout(contains(
            " - stars count=20000 radius=300 depth=60 factor=7 fade=true",
        ))
        .stdout(contains(" - ambient light intensity=0.3"))
        .stdout(contains(
            " - directional light intensity=1.5 pos=(1.00, 1.00, 1.00)",
        ))
        .stdout(contains(
            " - point light intensity=1 pos=(-10.00, -10.00, -10.00) color=#2860d8",
        ))
        .stdout(contains(" - earth radius=1 segments=64 rings=64"))
        .stdout(contains(
            " - orbit controls zoom=true pan=true rotate=true speeds=(0.6, 0.5, 0.4)",
        ))
        .stdout(contains("Generated 20000 stars"))
        .stdout(contains(
            "Earth ready: 4225 vertices, 8064 triangles (procedural surface)",
        ));
}

#[test]
fn star_seed_is_reported() {
    earth_live()
        .args(["--summary-only", "--star-seed", "7"])
        .assert()
        .success()
        .stdout(contains("Generated 20000 stars (seed 7)"));
}

#[test]
fn json_summary_is_machine_readable() {
    let output = earth_live().arg("--json").output().expect("run binary");
    assert!(output.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(summary["stars"], 20_000);
    assert_eq!(summary["earth"]["vertices"], 4225);
    assert_eq!(summary["earth"]["textured"], false);

    let scene = &summary["scene"];
    assert_eq!(scene["viewport"]["fov"], 45.0);
    let nodes = scene["nodes"].as_array().expect("node list");
    let kinds: Vec<&str> = nodes
        .iter()
        .map(|node| node["node"].as_str().expect("node tag"))
        .collect();
    assert_eq!(
        kinds,
        [
            "background",
            "stars",
            "light",
            "light",
            "light",
            "earth",
            "orbit_controls"
        ]
    );
    assert_eq!(nodes[0]["color"], "#020924");
}

#[test]
fn texture_is_sampled_onto_the_earth() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("earth.png");
    RgbImage::from_pixel(8, 4, Rgb([20, 60, 200]))
        .save(&path)
        .expect("write texture");

    earth_live()
        .arg("--summary-only")
        .arg("--texture")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Earth ready: 4225 vertices, 8064 triangles (textured)"));
}

#[test]
fn missing_texture_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    earth_live()
        .arg("--summary-only")
        .arg("--texture")
        .arg(dir.path().join("missing.png"))
        .assert()
        .failure()
        .stderr(contains("failed to load Earth assets"))
        .stderr(contains("failed to read texture"));
}

#[test]
fn undecodable_texture_fails() {
    let mut tmp = NamedTempFile::new().expect("temp texture");
    tmp.write_all(b"definitely not an image").expect("write texture");

    earth_live()
        .arg("--summary-only")
        .arg("--texture")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(contains("failed to decode texture"));
}
