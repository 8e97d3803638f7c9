use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use media_display::config::{Configuration, PixelFormat};
use media_display::error::Error;

const BASE: &str = r#"
date-format: "%Y-%m-%d"
display:
  width: 1920
  height: 1080
  fullscreen: true
photos:
  path: /srv/photos
  files: ["*.jpg", "*.png"]
  time: 10s
videos:
  path: /srv/videos
  files: ["*.mp4"]
  probability: 0.1
announcements:
  file: /srv/announcements.yaml
  font: /usr/share/fonts/DejaVuSans.ttf
  time: 15s
  probability: 0.25
  spacing: 12
"#;

fn with(replace: &str, by: &str) -> String {
    assert!(BASE.contains(replace), "fixture does not contain {replace:?}");
    BASE.replacen(replace, by, 1)
}

#[test]
fn parse_kebab_case_config() {
    let cfg = Configuration::from_yaml_str(BASE).unwrap().validated().unwrap();
    assert_eq!(cfg.display.size(), (1920, 1080));
    assert!(cfg.display.fullscreen);
    assert_eq!(cfg.display.framebuffer, PathBuf::from("/dev/fb0"));
    assert_eq!(cfg.display.pixel_format, PixelFormat::Bgra8888);
    assert_eq!(cfg.photos.path, PathBuf::from("/srv/photos"));
    assert_eq!(cfg.photos.files, vec!["*.jpg", "*.png"]);
    assert_eq!(cfg.photos.time, Duration::from_secs(10));
    assert!((cfg.videos.probability - 0.1).abs() < f64::EPSILON);
    assert_eq!(cfg.videos.player, vec!["/usr/bin/omxplayer", "-o", "hdmi"]);
    assert_eq!(cfg.videos.cleanup, None);
    assert_eq!(cfg.announcements.time, Duration::from_secs(15));
    assert_eq!(cfg.announcements.spacing, 12);
    assert_eq!(cfg.idle_delay, Duration::from_secs(10));
}

#[test]
fn parse_optional_overrides() {
    let yaml = with(
        "  fullscreen: true\n",
        "  fullscreen: false\n  snapshot-path: /tmp/frame.png\n  pixel-format: rgb565\n",
    )
    .replacen(
        "  probability: 0.1\n",
        "  probability: 0.1\n  player: [mpv, --fs]\n  cleanup: [killall, mpv]\n",
        1,
    )
    + "idle-delay: 500ms\n";
    let cfg = Configuration::from_yaml_str(&yaml).unwrap().validated().unwrap();
    assert_eq!(cfg.display.snapshot_path, Some(PathBuf::from("/tmp/frame.png")));
    assert_eq!(cfg.display.pixel_format, PixelFormat::Rgb565);
    assert_eq!(cfg.videos.player, vec!["mpv", "--fs"]);
    assert_eq!(
        cfg.videos.cleanup,
        Some(vec!["killall".to_string(), "mpv".to_string()])
    );
    assert_eq!(cfg.idle_delay, Duration::from_millis(500));
}

#[test]
fn missing_section_is_config_error() {
    let yaml = BASE.replace("date-format: \"%Y-%m-%d\"\n", "");
    let err = Configuration::from_yaml_str(&yaml).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got {err:?}");
    assert!(err.to_string().contains("date-format"), "{err}");
}

#[test]
fn unknown_key_is_rejected() {
    let yaml = with("  spacing: 12\n", "  spacing: 12\n  colour: red\n");
    assert!(matches!(
        Configuration::from_yaml_str(&yaml),
        Err(Error::Config(_))
    ));
}

#[test]
fn probabilities_must_be_within_unit_interval() {
    let yaml = with("  probability: 0.25\n", "  probability: 1.5\n");
    let err = Configuration::from_yaml_str(&yaml)
        .unwrap()
        .validated()
        .unwrap_err();
    assert!(err.to_string().contains("announcements.probability"), "{err}");

    let yaml = with("  probability: 0.1\n", "  probability: -0.1\n");
    let err = Configuration::from_yaml_str(&yaml)
        .unwrap()
        .validated()
        .unwrap_err();
    assert!(err.to_string().contains("videos.probability"), "{err}");
}

#[test]
fn zero_sized_display_is_rejected() {
    let yaml = with("  width: 1920\n", "  width: 0\n");
    let err = Configuration::from_yaml_str(&yaml)
        .unwrap()
        .validated()
        .unwrap_err();
    assert!(err.to_string().contains("display.width"), "{err}");
}

#[test]
fn windowed_mode_requires_snapshot_path() {
    let yaml = with("  fullscreen: true\n", "  fullscreen: false\n");
    let err = Configuration::from_yaml_str(&yaml)
        .unwrap()
        .validated()
        .unwrap_err();
    assert!(err.to_string().contains("snapshot-path"), "{err}");
}

#[test]
fn empty_wildcard_list_is_rejected() {
    let yaml = with("  files: [\"*.mp4\"]\n", "  files: []\n");
    let err = Configuration::from_yaml_str(&yaml)
        .unwrap()
        .validated()
        .unwrap_err();
    assert!(err.to_string().contains("videos.files"), "{err}");
}

#[test]
fn date_format_must_identify_a_day() {
    for bad in ["%Y-%m", "%H:%M", "%Q"] {
        let yaml = with("\"%Y-%m-%d\"", &format!("\"{bad}\""));
        let result = Configuration::from_yaml_str(&yaml).unwrap().validated();
        assert!(result.is_err(), "format {bad} should be rejected");
    }

    let yaml = with("\"%Y-%m-%d\"", "\"%d/%m/%Y\"");
    let cfg = Configuration::from_yaml_str(&yaml).unwrap().validated().unwrap();
    assert_eq!(
        cfg.parse_date("15/01/2024").unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    );
    assert!(cfg.parse_date("2024-01-15").is_err());
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, BASE).unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.date_format, "%Y-%m-%d");

    let missing = Configuration::from_yaml_file(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(missing, Error::Config(_)));
}
