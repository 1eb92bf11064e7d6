//! Runtime configuration from `BINGO_*` environment variables.

use std::path::PathBuf;

pub const APP_DIR: &str = "weekly-bingo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the key-value store file.
    pub data_dir: PathBuf,
    pub options_path: PathBuf,
    pub output_path: PathBuf,
    /// Explicit font file for the renderer, skipping the system font scan.
    pub font_path: Option<PathBuf>,
    /// Monday reminder time as (hour, minute).
    pub notify_at: (u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: dirs_next::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from(".")),
            options_path: PathBuf::from("options.json"),
            output_path: PathBuf::from("bingo_board.png"),
            font_path: None,
            notify_at: (9, 0),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for anything
    /// unset, empty or malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(dir) = var("BINGO_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = var("BINGO_OPTIONS_PATH") {
            config.options_path = PathBuf::from(path);
        }
        if let Some(path) = var("BINGO_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        config.font_path = var("BINGO_FONT_PATH").map(PathBuf::from);
        if let Some(raw) = var("BINGO_NOTIFY_AT") {
            match parse_clock(&raw) {
                Some(at) => config.notify_at = at,
                None => tracing::warn!(value = %raw, "ignoring malformed BINGO_NOTIFY_AT, expected HH:MM"),
            }
        }
        tracing::debug!(?config, "loaded configuration");
        config
    }
}

fn parse_clock(raw: &str) -> Option<(u32, u32)> {
    let (hour, minute) = raw.trim().split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = config(&[]);
        assert_eq!(c.options_path, PathBuf::from("options.json"));
        assert_eq!(c.output_path, PathBuf::from("bingo_board.png"));
        assert_eq!(c.font_path, None);
        assert_eq!(c.notify_at, (9, 0));
    }

    #[test]
    fn reads_overrides() {
        let c = config(&[
            ("BINGO_DATA_DIR", "/tmp/bingo"),
            ("BINGO_OPTIONS_PATH", "pool.json"),
            ("BINGO_OUTPUT", "out.png"),
            ("BINGO_FONT_PATH", "/fonts/x.ttf"),
            ("BINGO_NOTIFY_AT", "07:30"),
        ]);
        assert_eq!(c.data_dir, PathBuf::from("/tmp/bingo"));
        assert_eq!(c.options_path, PathBuf::from("pool.json"));
        assert_eq!(c.output_path, PathBuf::from("out.png"));
        assert_eq!(c.font_path, Some(PathBuf::from("/fonts/x.ttf")));
        assert_eq!(c.notify_at, (7, 30));
    }

    #[test]
    fn malformed_values_fall_back() {
        assert_eq!(config(&[("BINGO_NOTIFY_AT", "25:00")]).notify_at, (9, 0));
        assert_eq!(config(&[("BINGO_NOTIFY_AT", "nine")]).notify_at, (9, 0));
        assert_eq!(config(&[("BINGO_OUTPUT", "  ")]).output_path, PathBuf::from("bingo_board.png"));
    }
}
