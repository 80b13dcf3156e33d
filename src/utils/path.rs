use std::path::PathBuf;

pub const CONFIG_DIR_ENV: &str = "SERVICEBAY_CONFIG_DIR";

pub fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// `~/.config/servicebay` on every OS, unless `SERVICEBAY_CONFIG_DIR` is set.
pub fn get_config_dir() -> PathBuf {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => get_home_dir().join(".config").join("servicebay"),
    }
}

pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Where the signed-in session is kept between runs.
pub fn get_session_path() -> PathBuf {
    get_config_dir().join("session.json")
}

/// Log directory; the terminal belongs to the UI so logs go to a file.
pub fn get_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| get_home_dir().join(".cache"))
        .join("servicebay")
}

/// Shorten a path under the home directory to `~/...` for display.
pub fn format_path_for_display(path: &std::path::Path) -> String {
    let home_dir = get_home_dir();
    match path.strip_prefix(&home_dir) {
        Ok(relative) if relative.as_os_str().is_empty() => "~".to_string(),
        Ok(relative) => format!("~/{}", relative.to_string_lossy()),
        Err(_) => path.to_string_lossy().to_string(),
    }
}
