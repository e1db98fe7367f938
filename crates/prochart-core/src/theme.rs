use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Business,
    Modern,
    Dark,
}

const DEFAULT_PALETTE: &[&str] = &[
    "#5470c6", "#91cc75", "#fac858", "#ee6666", "#73c0de", "#3ba272", "#fc8452", "#9a60b4",
];
const BUSINESS_PALETTE: &[&str] = &[
    "#1f3a5f", "#4d7ea8", "#9eb3c2", "#c9a227", "#6b8f71", "#a23b3b",
];
const MODERN_PALETTE: &[&str] = &[
    "#6366f1", "#ec4899", "#14b8a6", "#f59e0b", "#8b5cf6", "#06b6d4", "#84cc16",
];
const DARK_PALETTE: &[&str] = &[
    "#4992ff", "#7cffb2", "#fddd60", "#ff6e76", "#58d9f9", "#05c091", "#ff8a45", "#8d48e3",
];

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Default, Theme::Business, Theme::Modern, Theme::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Business => "business",
            Theme::Modern => "modern",
            Theme::Dark => "dark",
        }
    }

    /// Ordered series colors; consumers index it modulo its length.
    pub fn palette(self) -> &'static [&'static str] {
        match self {
            Theme::Default => DEFAULT_PALETTE,
            Theme::Business => BUSINESS_PALETTE,
            Theme::Modern => MODERN_PALETTE,
            Theme::Dark => DARK_PALETTE,
        }
    }

    pub fn color(self, index: usize) -> &'static str {
        let palette = self.palette();
        palette[index % palette.len()]
    }

    pub fn background(self) -> &'static str {
        match self {
            Theme::Default | Theme::Modern => "#ffffff",
            Theme::Business => "#f7f9fc",
            Theme::Dark => "#100c2a",
        }
    }

    pub fn foreground(self) -> &'static str {
        match self {
            Theme::Dark => "#eeeeee",
            Theme::Business => "#1f2933",
            Theme::Default | Theme::Modern => "#333333",
        }
    }

    /// Axis lines, grid lines and table borders.
    pub fn grid(self) -> &'static str {
        match self {
            Theme::Dark => "#484753",
            _ => "#e0e6f1",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "business" => Ok(Self::Business),
            "modern" => Ok(Self::Modern),
            "dark" => Ok(Self::Dark),
            _ => Err(Error::UnknownTheme {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_cyclic() {
        let t = Theme::Business;
        let n = t.palette().len();
        assert_eq!(t.color(0), t.color(n));
        assert_eq!(t.color(1), t.color(n + 1));
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("neon".parse::<Theme>().is_err());
    }
}
