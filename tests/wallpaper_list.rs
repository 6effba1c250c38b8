use std::fs;
use std::path::Path;

use tempfile::tempdir;
use wallpaper_slideshow::appearance::Appearance;
use wallpaper_slideshow::resolution::Dimension;
use wallpaper_slideshow::wallpaper_list::parse_wallpaper_list;

const CYCLE: &str = r#"<background>
  <static><duration>100</duration><file>a.png</file></static>
  <transition><duration>10</duration><from>a.png</from><to>b.png</to></transition>
  <static><duration>100</duration><file>b.png</file></static>
</background>"#;

#[test]
fn list_entries_are_parsed_and_sorted() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("cycle.xml"), CYCLE).unwrap();

    let list = format!(
        r#"<?xml version="1.0"?>
<!DOCTYPE wallpapers SYSTEM "gnome-wp-list.dtd">
<wallpapers>
  <wallpaper deleted="false">
    <name>Wave 10</name>
    <filename>{root}/wave10.png</filename>
    <options>zoom</options>
  </wallpaper>
  <wallpaper>
    <name>wave 2</name>
    <filename>wave2-light.png</filename>
    <filename-dark>wave2-dark.png</filename-dark>
    <author>Someone</author>
  </wallpaper>
  <wallpaper>
    <filename>cycle.xml</filename>
  </wallpaper>
  <wallpaper>
    <name>No file</name>
  </wallpaper>
</wallpapers>
"#,
        root = dir.display()
    );
    let list_path = dir.join("list.xml");
    fs::write(&list_path, list).unwrap();

    let items = parse_wallpaper_list(&list_path, Dimension::default());
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["cycle", "wave 2", "Wave 10"]);

    let cycle = &items[0];
    assert!(cycle.is_slideshow());
    assert_eq!(cycle.slideshow.len(), 3);
    assert_eq!(cycle.slideshow.first_static(), Some(dir.join("a.png").as_path()));
    assert!(cycle.is_slideshow_source(Appearance::Light));
    assert_eq!(cycle.root, list_path);

    let wave2 = &items[1];
    assert_eq!(wave2.author.as_deref(), Some("Someone"));
    assert_eq!(wave2.source_for(Appearance::Light), dir.join("wave2-light.png"));
    // The dark variant only counts once its file exists.
    assert_eq!(wave2.source_for(Appearance::Dark), dir.join("wave2-light.png"));
    fs::write(dir.join("wave2-dark.png"), b"png").unwrap();
    assert_eq!(wave2.source_for(Appearance::Dark), dir.join("wave2-dark.png"));
    assert!(!wave2.is_slideshow());
    assert!(!wave2.is_slideshow_source(Appearance::Dark));

    let wave10 = &items[2];
    assert_eq!(wave10.filename, dir.join("wave10.png"));
    assert_eq!(wave10.filename_dark, None);
    assert_eq!(wave10.source_for(Appearance::Dark), dir.join("wave10.png"));
}

#[test]
fn malformed_or_missing_lists_are_empty() {
    let tmp = tempdir().unwrap();
    let broken = tmp.path().join("broken.xml");
    fs::write(&broken, "<wallpapers><wallpaper><filename>a.png</filename>").unwrap();
    assert!(parse_wallpaper_list(&broken, Dimension::default()).is_empty());
    let missing = Path::new("/nonexistent/list.xml");
    assert!(parse_wallpaper_list(missing, Dimension::default()).is_empty());
}

#[test]
fn slideshow_descriptor_is_not_a_list() {
    let tmp = tempdir().unwrap();
    let cycle = tmp.path().join("cycle.xml");
    fs::write(&cycle, CYCLE).unwrap();
    assert!(parse_wallpaper_list(&cycle, Dimension::default()).is_empty());
}
