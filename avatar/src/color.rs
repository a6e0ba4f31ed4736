use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ColorMode;

/// Opaque 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb::from_hex(0xFFFFFF);

    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_hex(self) -> u32 {
        (u32::from(self.0) << 16) | (u32::from(self.1) << 8) | u32::from(self.2)
    }

    /// WCAG relative luminance in `0.0..=1.0`
    pub fn relative_luminance(self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        0.2126 * channel(self.0) + 0.7152 * channel(self.1) + 0.0722 * channel(self.2)
    }

    /// WCAG contrast ratio between two colors, `1.0..=21.0`
    pub fn contrast_ratio(self, other: Rgb) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (light, dark) = if a > b { (a, b) } else { (b, a) };
        (light + 0.05) / (dark + 0.05)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Badge backgrounds. Every entry keeps white initials readable (contrast
/// ratio of at least 4.5).
pub const PALETTE: [Rgb; 10] = [
    Rgb::from_hex(0xC62828), // red
    Rgb::from_hex(0xAD1457), // pink
    Rgb::from_hex(0x6A1B9A), // purple
    Rgb::from_hex(0x4527A0), // deep purple
    Rgb::from_hex(0x283593), // indigo
    Rgb::from_hex(0x1565C0), // blue
    Rgb::from_hex(0x00695C), // teal
    Rgb::from_hex(0x2E7D32), // green
    Rgb::from_hex(0x4E342E), // brown
    Rgb::from_hex(0x37474F), // blue grey
];

/// Picks badge background colors from [`PALETTE`]
pub struct ColorPicker {
    mode: ColorMode,
    rng: Box<dyn RngCore + Send>,
}

impl ColorPicker {
    pub fn new(mode: ColorMode) -> Self {
        Self::with_rng(mode, StdRng::from_entropy())
    }

    /// Use a specific random source, e.g. a seeded one for reproducible tests
    pub fn with_rng(mode: ColorMode, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            mode,
            rng: Box::new(rng),
        }
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn pick(&mut self, seed: Option<&str>) -> Rgb {
        match self.mode {
            ColorMode::Deterministic => color_for_seed(seed.unwrap_or("")),
            ColorMode::Random => PALETTE
                .choose(&mut *self.rng)
                .copied()
                .unwrap_or(PALETTE[0]),
        }
    }
}

impl fmt::Debug for ColorPicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorPicker")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Stable palette color for `seed`
pub fn color_for_seed(seed: &str) -> Rgb {
    let digest = Sha256::digest(seed.as_bytes());
    let hash = digest
        .iter()
        .take(8)
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));

    PALETTE[(hash % PALETTE.len() as u64) as usize]
}
