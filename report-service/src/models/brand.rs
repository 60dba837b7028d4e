use crate::config::BrandSettings;
use crate::models::ProficiencyLevel;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// An sRGB color, written as `#RRGGBB` in palette files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(value: &str) -> Result<Self, String> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{}', expected #RRGGBB", value));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Linear mix: `alpha = 1.0` yields `self`, `0.0` yields `base`.
    pub fn over(self, base: Rgb, alpha: f32) -> Rgb {
        let alpha = alpha.clamp(0.0, 1.0);
        let mix = |top: u8, bottom: u8| {
            (top as f32 * alpha + bottom as f32 * (1.0 - alpha)).round() as u8
        };
        Rgb::new(mix(self.r, base.r), mix(self.g, base.g), mix(self.b, base.b))
    }

    /// Channels scaled to `0.0..=1.0`, as PDF color operators expect.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub grid: Rgb,
    pub background: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb::new(0x1F, 0x3A, 0x5F),
            secondary: Rgb::new(0x3C, 0x8D, 0xBC),
            accent: Rgb::new(0xF3, 0x9C, 0x12),
            text: Rgb::new(0x22, 0x22, 0x22),
            muted: Rgb::new(0x8A, 0x8F, 0x98),
            grid: Rgb::new(0xD5, 0xD8, 0xDC),
            background: Rgb::WHITE,
        }
    }
}

impl Palette {
    pub fn level_color(&self, level: ProficiencyLevel) -> Rgb {
        match level {
            ProficiencyLevel::Advanced => self.primary,
            ProficiencyLevel::Intermediate => self.secondary,
            ProficiencyLevel::Beginner => self.accent,
        }
    }
}

/// Decoded logo, flattened onto white so it can be embedded as DeviceRGB.
#[derive(Clone, PartialEq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl fmt::Debug for LogoImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogoImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl LogoImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let flattened = Rgb::new(r, g, b).over(Rgb::WHITE, a as f32 / 255.0);
            pixels.extend_from_slice(&[flattened.r, flattened.g, flattened.b]);
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Visual identity applied to every report. Built once at startup and shared
/// read-only between requests.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandConfig {
    pub name: String,
    pub footer: String,
    pub palette: Palette,
    pub logo: Option<Arc<LogoImage>>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        let settings = BrandSettings::default();
        Self {
            name: settings.name,
            footer: settings.footer,
            palette: Palette::default(),
            logo: None,
        }
    }
}

impl BrandConfig {
    /// Reads the configured brand assets. Any configured file that is missing
    /// or unreadable is a configuration error.
    pub fn load(settings: &BrandSettings) -> Result<Self, AppError> {
        let palette = match &settings.palette_path {
            Some(path) => load_palette(path)?,
            None => Palette::default(),
        };

        let logo = match &settings.logo_path {
            Some(path) => Some(Arc::new(load_logo(path)?)),
            None => None,
        };

        tracing::info!(
            brand = %settings.name,
            custom_palette = settings.palette_path.is_some(),
            logo = logo.is_some(),
            "Brand configuration loaded"
        );

        Ok(Self {
            name: settings.name.clone(),
            footer: settings.footer.clone(),
            palette,
            logo,
        })
    }
}

fn load_palette(path: &Path) -> Result<Palette, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "Failed to read brand palette {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "Invalid brand palette {}: {}",
            path.display(),
            e
        ))
    })
}

fn load_logo(path: &Path) -> Result<LogoImage, AppError> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "Failed to read brand logo {}: {}",
            path.display(),
            e
        ))
    })?;

    LogoImage::decode(&bytes).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "Failed to decode brand logo {}: {}",
            path.display(),
            e
        ))
    })
}
