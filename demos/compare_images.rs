//! Compare Images Example
//!
//! Compares an original image with a suspect copy, prints the verdict and
//! writes the difference image, a dissimilarity overlay and a JSON report.
//!
//! Run with: cargo run --example compare_images -- <original> <suspect> [output_dir] [threshold]

use std::{env, fs, path::Path};

use ssim_forensics::{
    ComparisonConfig, DEFAULT_MANIPULATION_THRESHOLD, ImageComparator, ImageProperties, RasterImage,
    error::Result,
    report::{JsonReport, visualization::Visualizer},
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        println!("Image Forensics - Compare Images Example");
        println!("========================================");
        println!();
        println!("Usage: {} <original> <suspect> [output_dir] [threshold]", args[0]);
        println!();
        println!("Arguments:");
        println!("  original    - Path to the reference image");
        println!("  suspect     - Path to the image suspected of manipulation");
        println!("  output_dir  - Optional output directory (default: ./output)");
        println!("  threshold   - Optional similarity threshold (default: {})", DEFAULT_MANIPULATION_THRESHOLD);
        return Ok(());
    }

    let output_dir = args.get(3).map(|s| s.as_str()).unwrap_or("./output");
    let threshold = match args.get(4) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("Error: threshold '{}' is not a number", raw);
                std::process::exit(1);
            }
        },
        None => DEFAULT_MANIPULATION_THRESHOLD,
    };

    for path in [&args[1], &args[2]] {
        if !Path::new(path).exists() {
            eprintln!("Error: Image file '{}' not found", path);
            std::process::exit(1);
        }
    }

    fs::create_dir_all(output_dir)?;

    println!("📁 Original: {}", args[1]);
    println!("📁 Suspect:  {}", args[2]);
    println!("📂 Output:   {}", output_dir);
    println!();

    let original = RasterImage::open(&args[1])?;
    let suspect = RasterImage::open(&args[2])?;

    let comparator = ImageComparator::with_config(ComparisonConfig::default().with_threshold(threshold));

    for (label, image) in [("Original", &original), ("Suspect", &suspect)] {
        match comparator.properties(image) {
            ImageProperties::Report(report) => {
                println!(
                    "  {} : {}x{} {} {} exif={}",
                    label,
                    report.dimensions.0,
                    report.dimensions.1,
                    report.mode,
                    report.format.as_deref().unwrap_or("?"),
                    report.has_metadata
                );
                if let Some(stats) = report.stats {
                    println!(
                        "           mean {:.1}, std {:.1}, range {}..{}",
                        stats.mean_intensity, stats.std_intensity, stats.min_intensity, stats.max_intensity
                    );
                }
            }
            ImageProperties::Failed { error } => println!("  {} : properties unavailable ({})", label, error),
        }
    }
    println!();

    let report = comparator.full_comparison(&original, &suspect)?;

    println!("  Score:   {:.4}", report.similarity.score);
    println!("  Verdict: {}", report.similarity.message);
    println!("  Changed regions: {}", report.changed_regions.len());
    for region in &report.changed_regions {
        println!("    - {}x{} at ({}, {})", region.width, region.height, region.x, region.y);
    }
    println!();

    let diff_path = format!("{}/difference.png", output_dir);
    report.difference.save(&diff_path)?;
    println!("  ✓ Saved: {}", diff_path);

    let base = image::imageops::resize(
        &suspect.image().to_rgb8(),
        report.difference.image().width(),
        report.difference.image().height(),
        image::imageops::FilterType::Lanczos3,
    );
    let overlay = Visualizer::new().visualize_comparison(&base, &report);
    let overlay_path = format!("{}/dissimilarity.png", output_dir);
    overlay.save(&overlay_path)?;
    println!("  ✓ Saved: {}", overlay_path);

    let json_path = format!("{}/report.json", output_dir);
    fs::write(&json_path, JsonReport::from(&report).to_json()?)?;
    println!("  ✓ Saved: {}", json_path);

    Ok(())
}
