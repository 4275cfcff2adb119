use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn dentmark_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dentmark").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd
}

fn write_photo(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("photo.png");
    image::RgbaImage::from_pixel(width, height, image::Rgba([230, 220, 210, 255]))
        .save(&path)
        .unwrap();
    path
}

fn write_payload(dir: &Path) -> PathBuf {
    let path = dir.join("annotations.json");
    let payload = serde_json::json!({
        "annotations": [
            { "id": "a1", "type": "rectangle", "x": 10, "y": 10, "width": 40, "height": 20,
              "stroke": "#DC2626", "strokeWidth": 2 },
            { "id": "a2", "type": "circle", "x": 60, "y": 40, "radius": 10,
              "stroke": "#92400E", "strokeWidth": 2, "fill": "#92400E40" }
        ],
        "recommendations": "Fill the lower molar",
        "patientRef": "p-17"
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&payload).unwrap()).unwrap();
    path
}

#[test]
fn help_prints_usage() {
    let temp = TempDir::new().unwrap();
    dentmark_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Annotate dental photos and produce report-ready images",
        ));
}

#[test]
fn tools_lists_builtin_tools() {
    let temp = TempDir::new().unwrap();
    dentmark_cmd(temp.path())
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("rectangle"))
        .stdout(predicate::str::contains("cavity"))
        .stdout(predicate::str::contains("(no drawing)"));
}

#[test]
fn tools_honours_stroke_width_from_config() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    std::fs::write(&config, "[tools]\nstroke_width = 6.0\n").unwrap();

    dentmark_cmd(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("width 6"));
}

#[test]
fn render_writes_flattened_png() {
    let temp = TempDir::new().unwrap();
    let photo = write_photo(temp.path(), 120, 80);
    let payload = write_payload(temp.path());
    let output = temp.path().join("out.png");

    dentmark_cmd(temp.path())
        .arg("render")
        .arg("--image")
        .arg(&photo)
        .arg("--annotations")
        .arg(&payload)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 2 annotation(s) onto 120x80"));

    let rendered = image::open(&output).unwrap();
    assert_eq!((rendered.width(), rendered.height()), (120, 80));
}

#[test]
fn render_rejects_undecodable_image() {
    let temp = TempDir::new().unwrap();
    let photo = temp.path().join("photo.png");
    std::fs::write(&photo, b"not an image").unwrap();

    dentmark_cmd(temp.path())
        .arg("render")
        .arg("--image")
        .arg(&photo)
        .arg("--output")
        .arg(temp.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load image"));
}

#[test]
fn inspect_summarises_payload() {
    let temp = TempDir::new().unwrap();
    let payload = write_payload(temp.path());

    dentmark_cmd(temp.path())
        .arg("inspect")
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 annotation(s)"))
        .stdout(predicate::str::contains(
            "- a1 rectangle stroke #DC2626 at (10.0, 10.0) size 40.0x20.0",
        ))
        .stdout(predicate::str::contains("Recommendations: Fill the lower molar"))
        .stdout(predicate::str::contains("Extra fields: patientRef"));
}

#[test]
fn save_then_report_uses_store_directory() {
    let temp = TempDir::new().unwrap();
    let photo = write_photo(temp.path(), 120, 80);
    let payload = write_payload(temp.path());
    let store = temp.path().join("store");

    dentmark_cmd(temp.path())
        .args(["save", "--submission", "sub-42", "--image"])
        .arg(&photo)
        .arg("--annotations")
        .arg(&payload)
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Saved 2 annotation(s) for sub-42 (status: annotated)",
        ));

    assert!(store.join("sub-42").join("annotations.json").exists());
    assert!(store.join("sub-42").join("annotated.png").exists());

    dentmark_cmd(temp.path())
        .args(["report", "--submission", "sub-42", "--store"])
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("file://"))
        .stdout(predicate::str::contains("report.json"))
        .stdout(predicate::str::contains("Status: reported"));

    assert!(store.join("sub-42").join("report.json").exists());
}

#[test]
fn report_before_save_fails() {
    let temp = TempDir::new().unwrap();
    let store = temp.path().join("store");

    dentmark_cmd(temp.path())
        .args(["report", "--submission", "missing", "--store"])
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "no saved annotations for submission 'missing'",
        ));
}
