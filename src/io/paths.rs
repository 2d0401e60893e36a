use std::path::PathBuf;

const APP_DIR: &str = "attend";

/// Default config file: `<config dir>/attend/config.toml`
pub fn default_config_path() -> PathBuf {
    base_dir(dirs::config_dir()).join("config.toml")
}

/// Default record file: `<data dir>/attend/attendance.csv`
pub fn default_data_path() -> PathBuf {
    base_dir(dirs::data_dir()).join("attendance.csv")
}

/// Log file: `<state dir>/attend/attend.log`, falling back to the data dir
/// on platforms without a state dir.
pub fn default_log_path() -> PathBuf {
    base_dir(dirs::state_dir().or_else(dirs::data_dir)).join("attend.log")
}

fn base_dir(root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(std::env::temp_dir).join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_app_dir() {
        for path in [default_config_path(), default_data_path(), default_log_path()] {
            let parent = path.parent().unwrap();
            assert_eq!(parent.file_name().unwrap(), APP_DIR);
        }
        assert_eq!(default_data_path().file_name().unwrap(), "attendance.csv");
    }
}
