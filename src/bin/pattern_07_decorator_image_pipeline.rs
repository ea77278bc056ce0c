use colored::Colorize;
use thiserror::Error;

/* ============================================================
 * Decorator pattern: an image pipeline assembled at runtime
 *
 * Every stage wraps another `ImageStage`, delegates inward
 * first, then applies its own step and prefixes the path.
 * ============================================================
 */

#[derive(Error, Debug, Clone, PartialEq)]
enum ImageError {
    #[error("'{path}' has no usable extension (expected one of {expected})")]
    UnsupportedFormat { path: String, expected: &'static str },
}

const KNOWN_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

trait ImageStage {
    fn process(&self, path: &str) -> Result<String, ImageError>;
}

/* ============================================================
 * The base stage everything else wraps
 * ============================================================
 */

struct BasicProcessor;

impl BasicProcessor {
    fn validate(path: &str) -> Result<(), ImageError> {
        let known = path
            .rsplit_once('.')
            .map(|(_, ext)| KNOWN_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !known {
            return Err(ImageError::UnsupportedFormat {
                path: path.to_string(),
                expected: "jpg, jpeg, png, webp",
            });
        }
        Ok(())
    }
}

impl ImageStage for BasicProcessor {
    fn process(&self, path: &str) -> Result<String, ImageError> {
        println!("processing {path}");
        Self::validate(path)?;
        println!("  format and integrity checked");
        println!("  metadata inspected");
        let out = format!("processed_{path}");
        println!("  -> {out}");
        Ok(out)
    }
}

/* ============================================================
 * Decorators
 * ============================================================
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

struct Watermark {
    inner: Box<dyn ImageStage>,
    text: String,
    corner: Corner,
}

impl Watermark {
    fn new(inner: Box<dyn ImageStage>, text: impl Into<String>, corner: Corner) -> Self {
        Self {
            inner,
            text: text.into(),
            corner,
        }
    }
}

impl ImageStage for Watermark {
    fn process(&self, path: &str) -> Result<String, ImageError> {
        let inner = self.inner.process(path)?;
        println!("watermark \"{}\" at {:?}", self.text, self.corner);
        let out = format!("watermarked_{inner}");
        println!("  -> {out}");
        Ok(out)
    }
}

struct Resize {
    inner: Box<dyn ImageStage>,
    width: u32,
    height: u32,
    keep_aspect: bool,
}

impl Resize {
    fn new(inner: Box<dyn ImageStage>, width: u32, height: u32, keep_aspect: bool) -> Self {
        Self {
            inner,
            width,
            height,
            keep_aspect,
        }
    }
}

impl ImageStage for Resize {
    fn process(&self, path: &str) -> Result<String, ImageError> {
        let inner = self.inner.process(path)?;
        println!(
            "resize to {}x{} (keep aspect: {})",
            self.width, self.height, self.keep_aspect
        );
        let out = format!("resized_{inner}");
        println!("  -> {out}");
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterKind {
    Blur,
    Sharpen,
    Grayscale,
    Sepia,
}

struct Filter {
    inner: Box<dyn ImageStage>,
    kind: FilterKind,
    intensity: f64,
}

impl Filter {
    fn new(inner: Box<dyn ImageStage>, kind: FilterKind, intensity: f64) -> Self {
        Self {
            inner,
            kind,
            intensity: intensity.clamp(0.0, 1.0),
        }
    }
}

impl ImageStage for Filter {
    fn process(&self, path: &str) -> Result<String, ImageError> {
        let inner = self.inner.process(path)?;
        println!("filter {:?} at intensity {:.2}", self.kind, self.intensity);
        let out = format!("filtered_{inner}");
        println!("  -> {out}");
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Jpeg,
    Png,
    Webp,
}

struct Compression {
    inner: Box<dyn ImageStage>,
    quality: f64,
    format: OutputFormat,
}

impl Compression {
    fn new(inner: Box<dyn ImageStage>, quality: f64, format: OutputFormat) -> Self {
        Self {
            inner,
            quality: quality.clamp(0.0, 1.0),
            format,
        }
    }
}

impl ImageStage for Compression {
    fn process(&self, path: &str) -> Result<String, ImageError> {
        let inner = self.inner.process(path)?;
        println!(
            "compress to {:?} at quality {:.2}",
            self.format, self.quality
        );
        let out = format!("compressed_{inner}");
        println!("  -> {out}");
        Ok(out)
    }
}

/* ============================================================
 * Demo (cargo run)
 * ============================================================
 */

fn main() {
    println!("== Stacking stages one by one ==");
    let mut pipeline: Box<dyn ImageStage> = Box::new(BasicProcessor);
    println!("\n-- base only --");
    println!("result: {}\n", pipeline.process("photo.jpg").unwrap());

    pipeline = Box::new(Watermark::new(pipeline, "Acme Studio", Corner::BottomRight));
    println!("-- with watermark --");
    println!("result: {}\n", pipeline.process("photo.jpg").unwrap());

    pipeline = Box::new(Resize::new(pipeline, 800, 600, true));
    println!("-- with resize --");
    println!("result: {}\n", pipeline.process("photo.jpg").unwrap());

    pipeline = Box::new(Filter::new(pipeline, FilterKind::Sepia, 0.7));
    println!("-- with filter --");
    println!("result: {}\n", pipeline.process("photo.jpg").unwrap());

    pipeline = Box::new(Compression::new(pipeline, 0.9, OutputFormat::Jpeg));
    println!("-- with compression --");
    println!("result: {}\n", pipeline.process("photo.jpg").unwrap());

    println!("== Order matters ==");
    let alternate: Box<dyn ImageStage> = Box::new(Watermark::new(
        Box::new(Resize::new(
            Box::new(Filter::new(
                Box::new(Compression::new(Box::new(BasicProcessor), 0.8, OutputFormat::Webp)),
                FilterKind::Grayscale,
                1.0,
            )),
            400,
            300,
            true,
        )),
        "Copyright 2024",
        Corner::TopLeft,
    ));
    println!("result: {}\n", alternate.process("photo.jpg").unwrap());

    println!("== Validation failures bubble out of the whole stack ==");
    match pipeline.process("document.tiff") {
        Err(err) => println!("{} {err}", "error:".red()),
        Ok(_) => unreachable!(),
    }
    println!("{}", "pipeline demo complete".green());
}

/* ============================================================
 * Tests (cargo test)
 * ============================================================
 */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_processor_prefixes_path() {
        assert_eq!(BasicProcessor.process("a.png").unwrap(), "processed_a.png");
    }

    #[test]
    fn base_processor_rejects_unknown_format() {
        let err = BasicProcessor.process("a.tiff").unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { .. }));
        assert!(BasicProcessor.process("no-extension").is_err());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(BasicProcessor.process("photo.JPG").is_ok());
    }

    #[test]
    fn each_decorator_adds_its_prefix() {
        let stage = Watermark::new(Box::new(BasicProcessor), "w", Corner::TopLeft);
        assert_eq!(stage.process("a.jpg").unwrap(), "watermarked_processed_a.jpg");

        let stage = Resize::new(Box::new(BasicProcessor), 10, 10, false);
        assert_eq!(stage.process("a.jpg").unwrap(), "resized_processed_a.jpg");

        let stage = Filter::new(Box::new(BasicProcessor), FilterKind::Blur, 0.5);
        assert_eq!(stage.process("a.jpg").unwrap(), "filtered_processed_a.jpg");

        let stage = Compression::new(Box::new(BasicProcessor), 0.5, OutputFormat::Png);
        assert_eq!(stage.process("a.jpg").unwrap(), "compressed_processed_a.jpg");
    }

    #[test]
    fn full_stack_applies_outermost_last() {
        let stack = Compression::new(
            Box::new(Filter::new(
                Box::new(Resize::new(
                    Box::new(Watermark::new(Box::new(BasicProcessor), "w", Corner::TopRight)),
                    800,
                    600,
                    true,
                )),
                FilterKind::Sepia,
                0.7,
            )),
            0.9,
            OutputFormat::Jpeg,
        );
        assert_eq!(
            stack.process("photo.jpg").unwrap(),
            "compressed_filtered_resized_watermarked_processed_photo.jpg"
        );
    }

    #[test]
    fn stacking_order_changes_the_result() {
        let a = Filter::new(
            Box::new(Resize::new(Box::new(BasicProcessor), 1, 1, true)),
            FilterKind::Blur,
            1.0,
        );
        let b = Resize::new(
            Box::new(Filter::new(Box::new(BasicProcessor), FilterKind::Blur, 1.0)),
            1,
            1,
            true,
        );
        assert_ne!(a.process("x.jpg").unwrap(), b.process("x.jpg").unwrap());
    }

    #[test]
    fn intensity_and_quality_are_clamped() {
        let filter = Filter::new(Box::new(BasicProcessor), FilterKind::Sharpen, 7.0);
        assert_eq!(filter.intensity, 1.0);
        let compression = Compression::new(Box::new(BasicProcessor), -3.0, OutputFormat::Webp);
        assert_eq!(compression.quality, 0.0);
    }

    #[test]
    fn errors_pass_through_the_decorators() {
        let stack = Watermark::new(
            Box::new(Resize::new(Box::new(BasicProcessor), 10, 10, true)),
            "w",
            Corner::BottomLeft,
        );
        assert!(matches!(
            stack.process("bad.gif"),
            Err(ImageError::UnsupportedFormat { .. })
        ));
    }
}
