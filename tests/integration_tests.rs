use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;
use videocrop::command::{build_command, compute_output_dimensions, render_preview, CommandIo, CommandPlan};
use videocrop::output::download_name;
use videocrop::selector::input::InputEvent;
use videocrop::*;

/// The binary, run inside `dir` with no inherited configuration
fn videocrop(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("videocrop").unwrap();
    cmd.current_dir(dir);
    for var in [
        "VIDEOCROP_CONFIG",
        "VIDEOCROP_FFMPEG",
        "VIDEOCROP_FFPROBE",
        "VIDEOCROP_SCALE",
        "VIDEOCROP_REMOVE_AUDIO",
        "VIDEOCROP_LOG_LEVEL",
        "VIDEOCROP_LOG_FORMAT",
        "VIDEOCROP_BANNER_MS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

// Library-level checks

#[test]
fn test_reference_command() {
    let plan = CommandPlan {
        io: CommandIo::new("a.mp4", "b.mp4"),
        bbox: BoundingBox::new(10.0, 20.0, 200.0, 100.0),
        time: TimeRange::new(1.0, 5.0).unwrap(),
        transform: Transform::new(1.0, true),
    };
    let args = build_command(&plan);
    assert_eq!(
        render_preview("ffmpeg", &args),
        "ffmpeg -i a.mp4 -ss 1 -to 5 -vf crop=200:100:10:20,scale=200:100 -an b.mp4"
    );
}

#[test]
fn test_output_dimensions_are_even() {
    assert_eq!(compute_output_dimensions(213.33, 120.0, 1.0), (212, 120));
    assert_eq!(compute_output_dimensions(101.0, 51.0, 1.0), (100, 50));
    assert_eq!(compute_output_dimensions(640.0, 360.0, 0.25), (160, 90));
}

#[test]
fn test_download_names() {
    assert_eq!(download_name("clip.mp4"), "clip cropped.mp4");
    assert_eq!(download_name("my.holiday.webm"), "my.holiday cropped.mp4");
}

#[test]
fn test_selector_stays_inside_parent_under_script() {
    let script = r#"[
        {"type": "pointer_down", "pointer_id": 1, "page_x": 50, "page_y": 50},
        {"type": "pointer_move", "pointer_id": 1, "page_x": 5000, "page_y": 5000},
        {"type": "pointer_up", "pointer_id": 1},
        {"type": "pointer_down", "pointer_id": 2, "page_x": 0, "page_y": 0, "target": "top-left"},
        {"type": "pointer_move", "pointer_id": 2, "page_x": 4000, "page_y": 4000},
        {"type": "pointer_up", "pointer_id": 2}
    ]"#;
    let events: Vec<InputEvent> = serde_json::from_str(script).unwrap();

    let parent = ParentBox::new(640.0, 360.0).unwrap();
    let mut selector = AreaSelector::attached(parent);
    for event in &events {
        selector.handle(event);
    }

    let bbox = selector.bounding_box();
    assert!(bbox.fits_within(&parent));
    assert!(bbox.width >= 50.0 && bbox.height >= 50.0);
}

// CLI tests

#[test]
fn test_cli_dims() {
    let temp_dir = TempDir::new().unwrap();
    let out = stdout_of(
        videocrop(temp_dir.path()).args(["dims", "--width", "213.33333333333334", "--height", "120"]),
    );
    assert_eq!(out, "Output Dimensions: 212 x 120\n");

    let out = stdout_of(videocrop(temp_dir.path()).args([
        "dims", "--width", "213.33", "--height", "120", "--scale", "0.5",
    ]));
    assert_eq!(out, "Output Dimensions: 106 x 60\n");
}

#[test]
fn test_cli_preview_with_given_frame() {
    let temp_dir = TempDir::new().unwrap();
    let out = stdout_of(videocrop(temp_dir.path()).args([
        "preview", "-i", "clip.mp4", "--frame", "640x360", "--duration", "10",
    ]));
    assert_eq!(
        out.trim_end(),
        "ffmpeg -i clip.mp4 -ss 0 -to 10 -vf crop=213.33333333333334:120:0:0,scale=212:120 output.mp4"
    );
}

#[test]
fn test_cli_preview_options_and_json() {
    let temp_dir = TempDir::new().unwrap();
    let out = stdout_of(videocrop(temp_dir.path()).args([
        "preview",
        "-i",
        "my clip.mp4",
        "--frame",
        "1280x720",
        "--duration",
        "60",
        "--area",
        "100,50,640,360",
        "--start",
        "0:10",
        "--end",
        "0:20.5",
        "--scale",
        "0.5",
        "--no-audio",
        "--json",
    ]));
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        report["command"],
        "ffmpeg -i 'my clip.mp4' -ss 10 -to 20.5 -vf crop=640:360:100:50,scale=320:180 -an output.mp4"
    );
    assert_eq!(report["args"][1], "my clip.mp4");
    assert_eq!(report["area"], "640 x 360");
    assert_eq!(report["output_width"], 320);
    assert_eq!(report["output_height"], 180);
}

#[test]
fn test_cli_preview_uses_config_defaults() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("videocrop.toml"),
        "[engine]\nffmpeg = \"/opt/ffmpeg\"\n\n[crop]\nscale = 0.5\nremove_audio = true\n",
    )
    .unwrap();

    let out = stdout_of(videocrop(temp_dir.path()).args([
        "preview", "-i", "clip.mp4", "--frame", "640x360", "--duration", "10",
    ]));
    assert_eq!(
        out.trim_end(),
        "/opt/ffmpeg -i clip.mp4 -ss 0 -to 10 -vf crop=213.33333333333334:120:0:0,scale=106:60 -an output.mp4"
    );

    // environment beats the file
    let out = stdout_of(
        videocrop(temp_dir.path())
            .env("VIDEOCROP_SCALE", "1")
            .args(["preview", "-i", "clip.mp4", "--frame", "640x360", "--duration", "10"]),
    );
    assert!(out.contains("scale=212:120"));
}

#[test]
fn test_cli_preview_rejections() {
    let temp_dir = TempDir::new().unwrap();

    let output = videocrop(temp_dir.path())
        .args(["preview", "-i", "notes.txt", "--frame", "640x360", "--duration", "10"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("Did not recognize \"notes.txt\" as a video file."));

    videocrop(temp_dir.path())
        .args(["preview", "-i", "clip.mp4", "--frame", "640x360"])
        .assert()
        .failure();

    videocrop(temp_dir.path())
        .args([
            "preview", "-i", "clip.mp4", "--frame", "640x360", "--duration", "10", "--area",
            "600,0,100,100",
        ])
        .assert()
        .failure();

    videocrop(temp_dir.path())
        .args([
            "preview", "-i", "clip.mp4", "--frame", "640x360", "--duration", "10", "--end", "11",
        ])
        .assert()
        .failure();
}

#[test]
fn test_cli_select_script_file() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("events.json");
    std::fs::write(
        &script,
        r#"[
            {"type": "focus"},
            {"type": "key_down", "key": "ArrowRight", "meta": true},
            {"type": "key_down", "key": "ArrowDown"},
            {"type": "key_down", "key": "a"},
            {"type": "pointer_down", "pointer_id": 1, "page_x": 0, "page_y": 0},
            {"type": "pointer_move", "pointer_id": 1, "page_x": 30, "page_y": 0},
            {"type": "pointer_up", "pointer_id": 1}
        ]"#,
    )
    .unwrap();

    let out = stdout_of(videocrop(temp_dir.path()).args([
        "select",
        "--frame",
        "640x360",
        "--script",
        script.to_str().unwrap(),
        "--json",
    ]));
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["x"], 40.0);
    assert_eq!(report["y"], 1.0);
    assert_eq!(report["height"], 120.0);
    assert_eq!(report["output_width"], 212);
    assert_eq!(report["events"], 7);
}

#[test]
fn test_cli_select_from_stdin() {
    let temp_dir = TempDir::new().unwrap();
    let out = stdout_of(
        videocrop(temp_dir.path())
            .args(["select", "--frame", "300x300"])
            .write_stdin("[]"),
    );
    assert_eq!(
        out,
        "Area: 100 x 100 at (0, 0)\nOutput Dimensions: 100 x 100\nHandled: 0 of 0 events\n"
    );
}

#[test]
fn test_cli_select_bad_input() {
    let temp_dir = TempDir::new().unwrap();
    videocrop(temp_dir.path())
        .args(["select", "--frame", "640x360"])
        .write_stdin("{not json")
        .assert()
        .failure();
    videocrop(temp_dir.path())
        .args(["select", "--frame", "wide"])
        .write_stdin("[]")
        .assert()
        .failure();
}

#[test]
fn test_cli_bad_log_level_fails() {
    let temp_dir = TempDir::new().unwrap();
    videocrop(temp_dir.path())
        .args(["dims", "--width", "10", "--height", "10", "--log-level", "loud"])
        .assert()
        .failure();
}

/// Stand-in ffprobe/ffmpeg pair for end-to-end crops
#[cfg(unix)]
fn fake_tools(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let ffprobe = r#"#!/bin/sh
cat <<'EOF'
{"streams": [{"codec_type": "video", "width": 640, "height": 360}], "format": {"duration": "10.000000"}}
EOF
"#;
    let ffmpeg = r#"#!/bin/sh
if [ "$1" = "-version" ]; then echo "ffmpeg version fake"; exit 0; fi
for last; do :; done
echo out_time_us=5000000
printf 'cropped bytes' > "$last"
"#;
    for (name, body) in [("ffprobe", ffprobe), ("ffmpeg", ffmpeg)] {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

#[cfg(unix)]
#[test]
fn test_cli_crop_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    fake_tools(temp_dir.path());
    std::fs::write(temp_dir.path().join("clip.mp4"), b"source").unwrap();

    let out = stdout_of(
        videocrop(temp_dir.path())
            .env("VIDEOCROP_FFMPEG", temp_dir.path().join("ffmpeg"))
            .env("VIDEOCROP_FFPROBE", temp_dir.path().join("ffprobe"))
            .args(["crop", "-i", "clip.mp4", "--area", "0,0,320,180", "--progress", "none"]),
    );

    let expected = Path::new("clip cropped.mp4");
    assert_eq!(out.trim_end(), expected.display().to_string());
    assert_eq!(
        std::fs::read(temp_dir.path().join(expected)).unwrap(),
        b"cropped bytes"
    );
}

#[cfg(unix)]
#[test]
fn test_cli_crop_explicit_output_and_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    fake_tools(temp_dir.path());
    std::fs::write(temp_dir.path().join("clip.mp4"), b"source").unwrap();

    let out_path = temp_dir.path().join("result.mp4");
    stdout_of(
        videocrop(temp_dir.path())
            .env("VIDEOCROP_FFMPEG", temp_dir.path().join("ffmpeg"))
            .env("VIDEOCROP_FFPROBE", temp_dir.path().join("ffprobe"))
            .args(["crop", "-i", "clip.mp4", "-o"])
            .arg(&out_path)
            .args(["--progress", "json"]),
    );
    assert_eq!(std::fs::read(&out_path).unwrap(), b"cropped bytes");

    // probing succeeds but the input cannot be read into the engine
    videocrop(temp_dir.path())
        .env("VIDEOCROP_FFMPEG", temp_dir.path().join("ffmpeg"))
        .env("VIDEOCROP_FFPROBE", temp_dir.path().join("ffprobe"))
        .args(["crop", "-i", "gone.mp4", "--progress", "none"])
        .assert()
        .failure();
}
