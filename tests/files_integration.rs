use std::fs;
use std::path::{Path, PathBuf};

use media_display::config::{PhotoConfig, VideoConfig};
use media_display::events::MediaKind;
use media_display::tasks::files;
use tempfile::tempdir;

fn names(dir: &Path, patterns: &[&str], kind: MediaKind) -> Vec<String> {
    let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
    files::scan(dir, &patterns, kind)
        .into_iter()
        .map(|item| {
            assert_eq!(item.kind, kind);
            item.path
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .to_string()
        })
        .collect()
}

#[test]
fn photos_are_sorted_and_case_limited() {
    let tmp = tempdir().unwrap();
    let lib = tmp.path();
    for name in ["b.jpg", "PHOTO.JPG", "Photo.Jpg", "a.png", "c.txt", "d.jpeg"] {
        fs::write(lib.join(name), b"x").unwrap();
    }
    fs::create_dir_all(lib.join("nested")).unwrap();
    fs::write(lib.join("nested").join("e.jpg"), b"x").unwrap();

    let found = names(lib, &["*.jpg", "*.png"], MediaKind::Photo);
    // uppercase sorts first; mixed-case extension and nested files are not picked up
    assert_eq!(found, vec!["PHOTO.JPG", "a.png", "b.jpg"]);
}

#[test]
fn mixed_case_extension_is_a_documented_miss() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("Photo.Jpg"), b"x").unwrap();
    fs::write(tmp.path().join("PHOTO.JPG"), b"x").unwrap();

    let lower = names(tmp.path(), &["*.jpg"], MediaKind::Photo);
    let upper = names(tmp.path(), &["*.JPG"], MediaKind::Photo);
    assert_eq!(lower, vec!["PHOTO.JPG"]);
    assert_eq!(upper, lower);
}

#[test]
fn overlapping_patterns_do_not_duplicate() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
    let found = names(tmp.path(), &["*.jpg", "*.JPG", "a.*"], MediaKind::Photo);
    assert_eq!(found, vec!["a.jpg"]);
}

#[test]
fn rescan_is_idempotent_and_sees_changes() {
    let tmp = tempdir().unwrap();
    for name in ["3.jpg", "1.jpg", "2.jpg"] {
        fs::write(tmp.path().join(name), b"x").unwrap();
    }
    let cfg = PhotoConfig {
        path: tmp.path().to_path_buf(),
        files: vec!["*.jpg".to_string()],
        time: std::time::Duration::from_secs(1),
    };

    let first: Vec<PathBuf> = files::scan_photos(&cfg).into_iter().map(|i| i.path).collect();
    let second: Vec<PathBuf> = files::scan_photos(&cfg).into_iter().map(|i| i.path).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);

    fs::remove_file(tmp.path().join("2.jpg")).unwrap();
    fs::write(tmp.path().join("0.jpg"), b"x").unwrap();
    let third: Vec<String> = files::scan_photos(&cfg)
        .into_iter()
        .map(|i| i.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(third, vec!["0.jpg", "1.jpg", "3.jpg"]);
}

#[test]
fn videos_use_their_own_directory() {
    let tmp = tempdir().unwrap();
    let videos = tmp.path().join("videos");
    fs::create_dir_all(&videos).unwrap();
    fs::write(videos.join("clip.MP4"), b"x").unwrap();
    fs::write(videos.join("clip.mov"), b"x").unwrap();
    fs::write(tmp.path().join("outside.mp4"), b"x").unwrap();

    let cfg = VideoConfig {
        path: videos.clone(),
        files: vec!["*.mp4".to_string()],
        probability: 0.5,
        player: vec!["true".to_string()],
        cleanup: None,
    };
    let found = files::scan_videos(&cfg);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, videos.join("clip.MP4"));
    assert_eq!(found[0].kind, MediaKind::Video);
}

#[test]
fn missing_directory_is_empty() {
    let tmp = tempdir().unwrap();
    let found = names(&tmp.path().join("absent"), &["*.jpg"], MediaKind::Photo);
    assert!(found.is_empty());
}

#[test]
fn catalog_splits_by_kind() {
    let tmp = tempdir().unwrap();
    let shared = tmp.path();
    for name in ["b.jpg", "a.jpg", "clip.mp4", "notes.txt"] {
        fs::write(shared.join(name), b"x").unwrap();
    }
    let photos = PhotoConfig {
        path: shared.to_path_buf(),
        files: vec!["*.jpg".to_string()],
        time: std::time::Duration::from_secs(1),
    };
    let videos = VideoConfig {
        path: shared.to_path_buf(),
        files: vec!["*.mp4".to_string()],
        probability: 0.5,
        player: vec!["true".to_string()],
        cleanup: None,
    };

    let catalog = files::scan_catalog(&photos, &videos);
    assert_eq!(catalog.photos, vec![shared.join("a.jpg"), shared.join("b.jpg")]);
    assert_eq!(catalog.videos, vec![shared.join("clip.mp4")]);
}
