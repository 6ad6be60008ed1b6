use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Componentwise linear interpolation, rounding each channel.
    /// `factor` is clamped to [0, 1].
    pub fn lerp(self, to: Rgb, factor: f64) -> Rgb {
        let factor = factor.clamp(0.0, 1.0);
        let channel = |from: u8, to: u8| -> u8 {
            let (from, to) = (from as f64, to as f64);
            (from + factor * (to - from)).round().clamp(0.0, 255.0) as u8
        };

        Rgb {
            r: channel(self.r, to.r),
            g: channel(self.g, to.g),
            b: channel(self.b, to.b),
        }
    }
}

/// Color pairs the square and marker fade between
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum ColorTheme {
    /// orange and blue
    #[default]
    #[strum(serialize = "Default")]
    Default,
    /// green and purple
    #[strum(serialize = "Green/Purple")]
    GreenPurple,
    /// yellow and red
    #[strum(serialize = "Red/Yellow")]
    RedYellow,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; 3] = [
        ColorTheme::Default,
        ColorTheme::GreenPurple,
        ColorTheme::RedYellow,
    ];

    /// (color1, color2): color1 is held after inhaling, color2 after exhaling
    pub fn endpoints(self) -> (Rgb, Rgb) {
        match self {
            ColorTheme::Default => (Rgb::new(0xFF, 0x98, 0x00), Rgb::new(0x21, 0x96, 0xF3)),
            ColorTheme::GreenPurple => {
                (Rgb::new(0x4C, 0xAF, 0x50), Rgb::new(0x9C, 0x27, 0xB0))
            }
            ColorTheme::RedYellow => (Rgb::new(0xFF, 0xEB, 0x3B), Rgb::new(0xF4, 0x43, 0x36)),
        }
    }

    pub fn next(self) -> ColorTheme {
        match self {
            ColorTheme::Default => ColorTheme::GreenPurple,
            ColorTheme::GreenPurple => ColorTheme::RedYellow,
            ColorTheme::RedYellow => ColorTheme::Default,
        }
    }
}
