use std::path::PathBuf;

const DATA_DIR_NAME: &str = "cmg-monitor";

/// Data directory from the config, else `$XDG_DATA_HOME/cmg-monitor`, else
/// `~/.local/share/cmg-monitor`.
pub fn resolve_data_dir(configured: Option<&PathBuf>) -> Result<PathBuf, String> {
    if let Some(dir) = configured {
        return Ok(dir.clone());
    }
    if let Some(base) = std::env::var_os("XDG_DATA_HOME").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(base).join(DATA_DIR_NAME));
    }
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join(DATA_DIR_NAME))
}
