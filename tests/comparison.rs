use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, RgbaImage};
use ssim_forensics::{
    ComparisonConfig, ImageComparator, ImageProperties, RasterImage, compare, detect, difference,
    error::ForensicsError, properties,
};

fn uniform(width: u32, height: u32, value: [u8; 3]) -> RasterImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(value))).into()
}

fn gradient(width: u32, height: u32) -> RasterImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255) / width) as u8,
            ((y * 255) / height) as u8,
            (((x + y) * 7) % 256) as u8,
        ])
    });
    DynamicImage::ImageRgb8(image).into()
}

#[test]
fn identical_images_are_not_manipulated() {
    let image = gradient(120, 80);

    let score = compare(&image, &image, 0.98).unwrap();
    let result = detect(&image, &image, 0.98).unwrap();

    assert!(score >= 0.99);
    assert!(!result.manipulated);
    assert!(result.message.starts_with("No manipulation detected"));
}

#[test]
fn black_and_white_are_manipulated() {
    let black = uniform(100, 100, [0, 0, 0]);
    let white = uniform(100, 100, [255, 255, 255]);

    let score = compare(&black, &white, 0.98).unwrap();
    let result = detect(&black, &white, 0.98).unwrap();

    assert!(score <= 0.3);
    assert!(result.manipulated);
    assert!(result.message.starts_with("Manipulation detected (confidence: "));
}

#[test]
fn small_uniform_offset_stays_similar() {
    let score = compare(&uniform(100, 100, [128; 3]), &uniform(100, 100, [130; 3]), 0.98).unwrap();

    assert!((0.8..=1.0).contains(&score));
}

#[test]
fn invalid_inputs_are_rejected() {
    let image = uniform(64, 64, [10; 3]);

    for threshold in [-0.1, 1.1, f64::NAN] {
        let err = compare(&image, &image, threshold).unwrap_err();
        assert!(matches!(err, ForensicsError::InvalidInput(_)));
    }

    let err = detect(&image, &image, 2.0).unwrap_err();
    assert!(err.is_invalid_input());

    let err = compare(&uniform(31, 64, [0; 3]), &image, 0.98).unwrap_err();
    assert!(err.is_invalid_input());

    let err = compare(&image, &uniform(64, 16, [0; 3]), 0.98).unwrap_err();
    assert!(err.is_invalid_input());

    let err = RasterImage::decode(b"<html>not an image</html>").unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn difference_of_offset_is_uniform_at_downscaled_size() {
    let first = uniform(100, 80, [20, 40, 60]);
    let second = uniform(90, 120, [70, 90, 110]);

    let diff = difference(&first, &second).unwrap();

    assert_eq!(diff.dimensions(), (90, 80));
    assert!(diff.image().pixels().all(|p| *p == Rgb([150, 150, 150])));
}

#[test]
fn difference_degrades_to_none() {
    assert!(difference(&uniform(8, 8, [0; 3]), &uniform(64, 64, [0; 3])).is_none());
}

#[test]
fn properties_of_other_modes_omit_statistics() {
    let rgba: RasterImage = DynamicImage::ImageRgba8(RgbaImage::new(64, 32)).into();

    let ImageProperties::Report(report) = properties(&rgba) else {
        panic!("expected a report");
    };

    assert_eq!(report.dimensions, (64, 32));
    assert_eq!(report.mode.to_string(), "RGBA");
    assert!(report.stats.is_none());
}

#[test]
fn properties_report_decoded_format() {
    let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(33, 34, Luma([200])));
    let mut encoded = Cursor::new(Vec::new());
    gray.write_to(&mut encoded, ImageFormat::Png).unwrap();

    let raster = RasterImage::decode(encoded.get_ref()).unwrap();
    let ImageProperties::Report(report) = properties(&raster) else {
        panic!("expected a report");
    };

    assert_eq!(report.format.as_deref(), Some("PNG"));
    assert_eq!(report.mode.to_string(), "L");
    assert_eq!(report.stats.unwrap().max_intensity, 200);
}

#[test]
fn comparison_is_idempotent() {
    let first = gradient(64, 64);
    let second = uniform(64, 64, [90, 100, 110]);

    let a = compare(&first, &second, 0.5).unwrap();
    let b = compare(&first, &second, 0.5).unwrap();

    assert_eq!(a, b);
}

#[test]
fn batch_detection_preserves_order() {
    let comparator = ImageComparator::new();
    let pairs = vec![
        (gradient(64, 64), gradient(64, 64)),
        (uniform(64, 64, [0; 3]), uniform(64, 64, [255; 3])),
        (uniform(10, 10, [0; 3]), uniform(64, 64, [0; 3])),
    ];

    let results = comparator.detect_batch(&pairs);

    assert_eq!(results.len(), 3);
    assert!(!results[0].as_ref().unwrap().manipulated);
    assert!(results[1].as_ref().unwrap().manipulated);
    assert!(results[2].as_ref().unwrap_err().is_invalid_input());
}

#[test]
fn config_loads_from_json_with_defaults() {
    let config = ComparisonConfig::from_json(r#"{ "threshold": 0.9, "window_size": 11 }"#).unwrap();

    assert_eq!(config.threshold, 0.9);
    assert_eq!(config.window_size, 11);
    assert_eq!(config.min_width, 32);

    let err = ComparisonConfig::from_json(r#"{ "window_size": 64 }"#).unwrap_err();
    assert!(err.is_invalid_input());

    let err = ComparisonConfig::from_json("not json").unwrap_err();
    assert!(matches!(err, ForensicsError::Json(_)));
}

#[test]
fn config_rejects_unusable_ssim_parameters() {
    for json in [r#"{ "window_size": 8 }"#, r#"{ "dynamic_range": 0.0 }"#, r#"{ "amplification": -1.0 }"#] {
        let err = ComparisonConfig::from_json(json).unwrap_err();
        assert!(err.is_invalid_input(), "{json} should be rejected");
    }
}

#[test]
fn open_and_save_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("original.png");
    RgbImage::from_pixel(48, 48, Rgb([1, 2, 3])).save(&path).unwrap();

    let original = RasterImage::open(&path).unwrap();
    let diff = difference(&original, &uniform(48, 48, [11, 12, 13])).unwrap();
    let diff_path = dir.path().join("diff.png");
    diff.save(&diff_path).unwrap();

    let reloaded = RasterImage::open(&diff_path).unwrap();
    assert_eq!(reloaded.dimensions(), (48, 48));
    assert_eq!(*reloaded.image().to_rgb8().get_pixel(0, 0), Rgb([30, 30, 30]));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = RasterImage::open(dir.path().join("absent.jpg")).unwrap_err();

    assert!(matches!(err, ForensicsError::Io(_)));
}

#[test]
fn similarity_map_and_overlay_cover_the_compared_area() {
    let comparator = ImageComparator::new();
    let original = gradient(80, 60);
    let suspect = uniform(100, 70, [0, 0, 0]);

    let map = comparator.similarity_map(&original, &suspect).unwrap();
    assert_eq!(map.dim(), (54, 74));

    let report = comparator.full_comparison(&original, &suspect).unwrap();
    assert_eq!(report.difference.dimensions(), (80, 60));
    assert_eq!(report.ssim_map.dim(), (54, 74));

    let base = suspect.image().to_rgb8();
    let overlay = ssim_forensics::report::visualization::Visualizer::new().visualize_comparison(&base, &report);
    assert_eq!(overlay.dimensions(), (80, 60));
}
