use anyhow::{Context, Result};
use image::{imageops, GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::path::{Path, PathBuf};

/// Configuración del QR
#[derive(Debug, Clone)]
pub struct QrConfig {
    /// Directory the PNG artifacts are written to
    pub output_dir: PathBuf,
    /// Pixels per QR module
    pub module_size: u32,
    /// White border around the code, in modules
    pub border_modules: u32,
    /// Error correction level
    pub ec_level: EcLevel,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("static/qr_codes"),
            module_size: 10,
            border_modules: 5,
            ec_level: EcLevel::M,
        }
    }
}

impl QrConfig {
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }
}

/// Writes fiscal QR artifacts as black-on-white PNG files.
///
/// The smallest QR version that holds the text is used, starting at 1.
#[derive(Debug, Clone)]
pub struct QrGenerator {
    pub config: QrConfig,
}

impl QrGenerator {
    pub fn new(config: QrConfig) -> Self {
        Self { config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// File name depends only on the invoice id, so a second fiscalization of
    /// the same invoice replaces the earlier image.
    pub fn artifact_filename(invoice_id: i64) -> String {
        format!("fiscalized_invoice_{}.png", invoice_id)
    }

    pub fn artifact_path(&self, invoice_id: i64) -> PathBuf {
        self.config.output_dir.join(Self::artifact_filename(invoice_id))
    }

    /// Renders `text` into a grayscale image with the configured border.
    pub fn render(&self, text: &str) -> Result<GrayImage> {
        let qr = QrCode::with_error_correction_level(text.as_bytes(), self.config.ec_level)
            .context("Error al crear QR code")?;

        let modules = qr
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .module_dimensions(self.config.module_size, self.config.module_size)
            .dark_color(Luma([0u8]))
            .light_color(Luma([255u8]))
            .build();

        let border = self.config.border_modules * self.config.module_size;
        let mut canvas = GrayImage::from_pixel(
            modules.width() + border * 2,
            modules.height() + border * 2,
            Luma([255u8]),
        );
        imageops::overlay(&mut canvas, &modules, border as i64, border as i64);

        Ok(canvas)
    }

    /// Encodes `text` and writes it to the invoice's artifact path, creating
    /// the output directory when needed. Returns the written path.
    pub fn encode_to_file(&self, invoice_id: i64, text: &str) -> Result<PathBuf> {
        let image = self.render(text)?;

        std::fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!("Error al crear directorio {}", self.config.output_dir.display())
        })?;

        let path = self.artifact_path(invoice_id);
        image
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Error al escribir imagen PNG {}", path.display()))?;

        tracing::debug!("QR artifact written to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The generator writes into a subdirectory the guard cleans up on drop.
    fn temp_generator() -> (tempfile::TempDir, QrGenerator) {
        let dir = tempfile::tempdir().unwrap();
        let generator = QrGenerator::new(QrConfig::with_output_dir(dir.path().join("qr_codes")));
        (dir, generator)
    }

    #[test]
    fn test_artifact_filename() {
        assert_eq!(QrGenerator::artifact_filename(42), "fiscalized_invoice_42.png");
    }

    #[test]
    fn test_render_dimensions_include_border() {
        let generator = QrGenerator::new(QrConfig::default());
        let image = generator.render("hi").unwrap();

        // Version 1 is 21 modules wide, plus 5 modules of border on each side.
        assert_eq!(image.width(), (21 + 10) * 10);
        assert_eq!(image.height(), image.width());
        assert_eq!(image.get_pixel(0, 0), &Luma([255u8]));
        // Top-left finder pattern starts right after the border.
        assert_eq!(image.get_pixel(50, 50), &Luma([0u8]));
    }

    #[test]
    fn test_encode_creates_directory_and_overwrites() {
        let (_dir, generator) = temp_generator();
        assert!(!generator.output_dir().exists());

        let first = generator.encode_to_file(7, "Invoice ID: 7, Items: []").unwrap();
        let second = generator.encode_to_file(7, "Invoice ID: 7, Items: [1]").unwrap();

        assert_eq!(first, second);
        assert!(first.ends_with("fiscalized_invoice_7.png"));
        assert_eq!(std::fs::read_dir(generator.output_dir()).unwrap().count(), 1);

        let decoded = image::open(&first).unwrap();
        assert!(decoded.width() > 0);
    }

    #[test]
    fn test_text_too_long_is_an_error() {
        let (_dir, generator) = temp_generator();
        let text = "x".repeat(4000);

        assert!(generator.encode_to_file(1, &text).is_err());
        assert!(!generator.artifact_path(1).exists());
    }
}
