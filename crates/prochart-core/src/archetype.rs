use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five fixed rendering modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartArchetype {
    Bar,
    Line,
    Pie,
    Radar,
    Table,
}

impl ChartArchetype {
    pub const ALL: [ChartArchetype; 5] = [
        ChartArchetype::Bar,
        ChartArchetype::Line,
        ChartArchetype::Pie,
        ChartArchetype::Radar,
        ChartArchetype::Table,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartArchetype::Bar => "bar",
            ChartArchetype::Line => "line",
            ChartArchetype::Pie => "pie",
            ChartArchetype::Radar => "radar",
            ChartArchetype::Table => "table",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartArchetype::Bar => "柱状图",
            ChartArchetype::Line => "折线图",
            ChartArchetype::Pie => "饼图",
            ChartArchetype::Radar => "雷达图",
            ChartArchetype::Table => "对比表格",
        }
    }

    /// Tables size to their content; every other archetype has an explicit pixel height.
    pub fn has_auto_height(self) -> bool {
        matches!(self, ChartArchetype::Table)
    }
}

impl fmt::Display for ChartArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartArchetype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "pie" => Ok(Self::Pie),
            "radar" => Ok(Self::Radar),
            "table" => Ok(Self::Table),
            _ => Err(Error::UnknownArchetype {
                name: s.to_string(),
            }),
        }
    }
}
