use std::path::PathBuf;
use std::time::Duration;

use tempfile::tempdir;
use wallpaper_slideshow::Error;
use wallpaper_slideshow::appearance::Appearance;
use wallpaper_slideshow::config::Configuration;
use wallpaper_slideshow::playlist::{Playlist, SortingMode};
use wallpaper_slideshow::resolution::Dimension;

#[test]
fn parse_kebab_case_config_with_defaults() {
    let yaml = r#"
wallpaper-paths: ["/usr/share/wallpapers"]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        cfg.wallpaper_paths,
        vec![PathBuf::from("/usr/share/wallpapers")]
    );
    assert_eq!(cfg.target_resolution, Dimension::new(1920, 1080));
    assert_eq!(cfg.slide_interval, Duration::from_secs(600));
    assert_eq!(cfg.sorting_mode, SortingMode::Random);
    assert_eq!(cfg.shuffle_seed, None);
    assert_eq!(cfg.thumbnail_size, Dimension::new(320, 180));
    assert_eq!(cfg.appearance, Appearance::Light);
    assert_eq!(cfg.timezone, None);
    assert!(!cfg.folders_first);
    assert!(cfg.excluded_slides.is_empty());
}

#[test]
fn parse_full_config() {
    let yaml = r#"
wallpaper-paths: ["/a", "/b"]
target-resolution: 2560x1440
slide-interval: 1h 30m
sorting-mode: modified-reversed
shuffle-seed: 7
thumbnail-size: "400x250"
appearance: dark
timezone: Europe/Berlin
folders-first: true
excluded-slides: ["/a/skip.jpg"]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.wallpaper_paths.len(), 2);
    assert_eq!(cfg.target_resolution, Dimension::new(2560, 1440));
    assert_eq!(cfg.slide_interval, Duration::from_secs(5400));
    assert_eq!(cfg.sorting_mode, SortingMode::ModifiedReversed);
    assert_eq!(cfg.shuffle_seed, Some(7));
    assert_eq!(cfg.thumbnail_size, Dimension::new(400, 250));
    assert_eq!(cfg.appearance, Appearance::Dark);
    assert_eq!(cfg.timezone, Some(chrono_tz::Europe::Berlin));
    assert!(cfg.folders_first);
    assert_eq!(cfg.excluded_slides, vec![PathBuf::from("/a/skip.jpg")]);
}

#[test]
fn playlist_honours_ordering_and_exclusions() {
    let yaml = r#"
wallpaper-paths: ["/w"]
sorting-mode: alphabetical
folders-first: true
excluded-slides: ["/w/b.jpg"]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let scan = vec![
        PathBuf::from("/w/b.jpg"),
        PathBuf::from("/w/a.jpg"),
        PathBuf::from("/w/sub/c.jpg"),
    ];
    let playlist = Playlist::with_options(scan, &cfg.playlist_options()).unwrap();
    assert_eq!(
        playlist.slides(),
        [PathBuf::from("/w/sub/c.jpg"), PathBuf::from("/w/a.jpg")].as_slice()
    );
}

#[test]
fn unknown_keys_and_bad_values_are_rejected() {
    for yaml in [
        "photo-library-path: /photos\n",
        "wallpaper-paths: [/a]\ntarget-resolution: huge\n",
        "wallpaper-paths: [/a]\nsorting-mode: shuffled\n",
        "wallpaper-paths: [/a]\ntimezone: Mars/Olympus\n",
    ] {
        assert!(
            serde_yaml::from_str::<Configuration>(yaml).is_err(),
            "{yaml:?}"
        );
    }
}

#[test]
fn validation_checks_paths_and_interval() {
    let tmp = tempdir().unwrap();

    let cfg = Configuration {
        wallpaper_paths: vec![tmp.path().to_path_buf()],
        ..Configuration::default()
    };
    assert!(cfg.clone().validated().is_ok());

    let too_fast = Configuration {
        slide_interval: Duration::from_millis(500),
        ..cfg.clone()
    };
    assert!(too_fast.validated().is_err());

    assert!(Configuration::default().validated().is_err());

    let missing = Configuration {
        wallpaper_paths: vec![tmp.path().join("gone")],
        ..cfg
    };
    let err = missing.validated().unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::BadDir(_))));
}

#[test]
fn load_from_file() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("config.yaml");
    std::fs::write(
        &path,
        format!("wallpaper-paths: [{:?}]\nslide-interval: 5s\n", tmp.path()),
    )
    .unwrap();
    let cfg = Configuration::from_yaml_file(&path)
        .unwrap()
        .validated()
        .unwrap();
    assert_eq!(cfg.slide_interval, Duration::from_secs(5));

    let err = Configuration::from_yaml_file(tmp.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
