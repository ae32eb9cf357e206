use cable_tags::*;

#[test]
fn test_default_geometry() {
    let options = TagOptions::default();
    assert_eq!(options.paper_size, PaperSize::A4);
    assert_eq!(options.triangle_base_mm, 60.0);
    assert_eq!(options.triangle_height_mm, 49.0);
    assert_eq!(options.columns, 5);
    assert_eq!(options.rows, 5);
    assert_eq!(options.print_offset_x_mm, 0.0);
    assert_eq!(options.print_offset_y_mm, 0.0);
    assert!(options.validate().is_ok());
}

#[test]
fn test_custom_paper_must_fit_grid() {
    let options = TagOptions {
        paper_size: PaperSize::Custom {
            width_mm: 150.0,
            height_mm: 297.0,
        },
        ..Default::default()
    };
    assert!(options.validate().is_err());

    let options = TagOptions {
        paper_size: PaperSize::A3,
        rows: 8,
        ..Default::default()
    };
    assert!(options.validate().is_ok());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let mut options = TagOptions::default();
    options.print_offset_x_mm = 1.2;
    options.print_offset_y_mm = -0.4;
    options.outline_thickness_mm = 0.3;
    options.font.font_path = Some("fonts/timesbd.ttf".into());
    options.text.track_separator = '/';

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    options.save(path).await.unwrap();
    let loaded = TagOptions::load(path).await.unwrap();

    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_rejects_malformed_json() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "{ not json").unwrap();

    let result = TagOptions::load(temp_file.path()).await;
    assert!(matches!(result, Err(TagError::Config(_))));
}
