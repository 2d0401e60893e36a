use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AttendConfig;
use crate::model::schedule::ScheduleProvider;

/// Written on first run when no config file exists.
pub const CONFIG_TEMPLATE: &str = r##"# attend configuration

# First day of the term (DD-MM-YYYY). `attend stats` counts from here.
# start_date = "01-08-2024"

# Show subjects that aren't scheduled for a day as cancelled, so every
# subject appears on every date.
unscheduled_as_cancelled = false

# Subjects per weekday, in the order they should be listed.
# Removing a subject later keeps its history; it just stops appearing.
[schedule]
# monday = ["Math", "Physics"]
# tuesday = ["Chemistry"]

# Optional color overrides for the terminal UI.
[colors]
# highlight = "#FB4196"
# green = "#44FF88"
"##;

/// Error type for config file I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Read and validate the config file, creating it from the template if it
/// doesn't exist yet.
pub fn read_config(path: &Path) -> Result<AttendConfig, ConfigError> {
    if !path.exists() {
        write_template(path)?;
    }

    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config = parse_config(&text)?;
    tracing::debug!(
        path = %path.display(),
        subjects = config.all_known_subjects().len(),
        "loaded config"
    );
    Ok(config)
}

/// Parse and validate config text.
pub fn parse_config(text: &str) -> Result<AttendConfig, ConfigError> {
    let config: AttendConfig = toml::from_str(text)?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

fn write_template(path: &Path) -> Result<(), ConfigError> {
    let to_err = |e: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(to_err)?;
    }
    fs::write(path, CONFIG_TEMPLATE).map_err(to_err)?;
    tracing::info!(path = %path.display(), "created config from template");
    Ok(())
}
