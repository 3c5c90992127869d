// src/types.rs

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Development status a script declares in its metadata.
///
/// The value is informational only; the loader never treats scripts
/// differently based on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    Prototype,
    Development,
    Production,
}

impl FromStr for ScriptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prototype" => Ok(ScriptStatus::Prototype),
            "development" => Ok(ScriptStatus::Development),
            "production" => Ok(ScriptStatus::Production),
            other => Err(format!(
                "invalid status: {other} (expected \"Prototype\", \"Development\" or \"Production\")"
            )),
        }
    }
}

impl fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScriptStatus::Prototype => "Prototype",
            ScriptStatus::Development => "Development",
            ScriptStatus::Production => "Production",
        };
        f.write_str(s)
    }
}

/// Parse a duration string like `"250ms"`, `"1s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs = |factor: u64| {
        value
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{s}' is too large"))
    };

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => secs(60),
        "h" => secs(60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
