use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreakpointError {
    #[error("breakpoint table '{table}' has no tiers")]
    Empty { table: String },

    #[error("breakpoint table '{table}': tier '{label}' is not below the previous min_width {previous}")]
    NotDescending {
        table: String,
        label: String,
        previous: u32,
    },

    #[error("breakpoint table '{table}' must end with a tier at min_width 0")]
    NoFloor { table: String },

    #[error("breakpoint table '{table}' has a tier with an empty label")]
    EmptyLabel { table: String },

    #[error("unknown breakpoint preset '{0}' (expected grid, device or navigation)")]
    UnknownPreset(String),
}

/// One row of a breakpoint table: widths at or above `min_width` get `label`
/// unless an earlier row matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub min_width: u32,
    pub label: String,
}

impl Tier {
    pub fn new(min_width: u32, label: impl Into<String>) -> Self {
        Self {
            min_width,
            label: label.into(),
        }
    }
}

/// Named tables shipped with the crate.
///
/// The fragments disagree on what the tiers are, so each variant is kept as
/// its own configuration rather than picking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakpointPreset {
    /// xl / lg / md / sm / xs, used for the page-level class.
    #[default]
    Grid,
    /// desktop / desktop-small / tablet / mobile, used by the hero banner.
    Device,
    /// desktop / tablet / mobile, used by the navigation menu.
    Navigation,
}

impl BreakpointPreset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Device => "device",
            Self::Navigation => "navigation",
        }
    }
}

impl FromStr for BreakpointPreset {
    type Err = BreakpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(Self::Grid),
            "device" => Ok(Self::Device),
            "navigation" => Ok(Self::Navigation),
            other => Err(BreakpointError::UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for BreakpointPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered threshold table, scanned from the top; the first tier whose
/// `min_width` is at or below the width wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointTable {
    name: String,
    tiers: Vec<Tier>,
}

impl BreakpointTable {
    /// Build a table, rejecting anything that would leave a width unmatched
    /// or make a tier unreachable.
    pub fn new(name: impl Into<String>, tiers: Vec<Tier>) -> Result<Self, BreakpointError> {
        let name = name.into();
        let Some(last) = tiers.last() else {
            return Err(BreakpointError::Empty { table: name });
        };
        if last.min_width != 0 {
            return Err(BreakpointError::NoFloor { table: name });
        }
        if tiers.iter().any(|tier| tier.label.trim().is_empty()) {
            return Err(BreakpointError::EmptyLabel { table: name });
        }
        for pair in tiers.windows(2) {
            if pair[1].min_width >= pair[0].min_width {
                return Err(BreakpointError::NotDescending {
                    table: name,
                    label: pair[1].label.clone(),
                    previous: pair[0].min_width,
                });
            }
        }
        Ok(Self { name, tiers })
    }

    pub fn preset(preset: BreakpointPreset) -> Self {
        let tiers = match preset {
            BreakpointPreset::Grid => vec![
                Tier::new(1200, "xl"),
                Tier::new(992, "lg"),
                Tier::new(768, "md"),
                Tier::new(576, "sm"),
                Tier::new(0, "xs"),
            ],
            BreakpointPreset::Device => vec![
                Tier::new(1024, "desktop"),
                Tier::new(768, "desktop-small"),
                Tier::new(480, "tablet"),
                Tier::new(0, "mobile"),
            ],
            BreakpointPreset::Navigation => vec![
                Tier::new(1025, "desktop"),
                Tier::new(769, "tablet"),
                Tier::new(0, "mobile"),
            ],
        };
        Self {
            name: preset.as_str().to_string(),
            tiers,
        }
    }

    pub fn grid() -> Self {
        Self::preset(BreakpointPreset::Grid)
    }

    pub fn device() -> Self {
        Self::preset(BreakpointPreset::Device)
    }

    pub fn navigation() -> Self {
        Self::preset(BreakpointPreset::Navigation)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn resolve(&self, width: u32) -> &str {
        self.tiers
            .iter()
            .find(|tier| tier.min_width <= width)
            .or(self.tiers.last())
            .map(|tier| tier.label.as_str())
            .unwrap_or_default()
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::grid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_thresholds_are_inclusive_lower_bounds() {
        let table = BreakpointTable::grid();
        assert_eq!(table.resolve(0), "xs");
        assert_eq!(table.resolve(575), "xs");
        assert_eq!(table.resolve(576), "sm");
        assert_eq!(table.resolve(767), "sm");
        assert_eq!(table.resolve(768), "md");
        assert_eq!(table.resolve(991), "md");
        assert_eq!(table.resolve(992), "lg");
        assert_eq!(table.resolve(1199), "lg");
        assert_eq!(table.resolve(1200), "xl");
        assert_eq!(table.resolve(u32::MAX), "xl");
    }

    #[test]
    fn device_table_matches_strict_upper_bounds() {
        let table = BreakpointTable::device();
        assert_eq!(table.resolve(479), "mobile");
        assert_eq!(table.resolve(480), "tablet");
        assert_eq!(table.resolve(767), "tablet");
        assert_eq!(table.resolve(768), "desktop-small");
        assert_eq!(table.resolve(1023), "desktop-small");
        assert_eq!(table.resolve(1024), "desktop");
    }

    #[test]
    fn navigation_table_matches_inclusive_upper_bounds() {
        let table = BreakpointTable::navigation();
        assert_eq!(table.resolve(768), "mobile");
        assert_eq!(table.resolve(769), "tablet");
        assert_eq!(table.resolve(1024), "tablet");
        assert_eq!(table.resolve(1025), "desktop");
    }

    #[test]
    fn custom_table_must_end_at_zero() {
        let err = BreakpointTable::new("wide", vec![Tier::new(800, "wide")]).unwrap_err();
        assert_eq!(err, BreakpointError::NoFloor { table: "wide".into() });
    }

    #[test]
    fn custom_table_must_descend() {
        let err = BreakpointTable::new(
            "bad",
            vec![Tier::new(500, "a"), Tier::new(600, "b"), Tier::new(0, "c")],
        )
        .unwrap_err();
        assert!(matches!(err, BreakpointError::NotDescending { previous: 500, .. }));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            BreakpointTable::new("none", Vec::new()),
            Err(BreakpointError::Empty { .. })
        ));
    }

    #[test]
    fn preset_parses_from_name() {
        assert_eq!("device".parse::<BreakpointPreset>(), Ok(BreakpointPreset::Device));
        assert!("huge".parse::<BreakpointPreset>().is_err());
    }
}
