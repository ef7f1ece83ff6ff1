use crate::settings::{Settings, SCHEMA_VERSION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn config_dir() -> PathBuf {
    home_dir().join(".webwizard")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn read_settings_file(path: &Path) -> Result<Settings, String> {
    let data = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let settings: Settings = serde_json::from_slice(&data)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;

    if settings.schema_version != SCHEMA_VERSION {
        return Err(format!(
            "unknown schema_version in {}: {}",
            path.display(),
            settings.schema_version
        ));
    }
    Ok(settings)
}

fn write_settings_file(dir: &Path, settings: &Settings) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let final_path = dir.join("settings.json");
    let tmp_path = dir.join("settings.json.tmp");
    let bytes = serde_json::to_vec_pretty(settings)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, &final_path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if final_path.exists() {
                fs::remove_file(&final_path)?;
                fs::rename(&tmp_path, &final_path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

/// Loads persisted settings; a missing file is a fresh install, anything
/// unreadable falls back to defaults with a warning for the diagnostics log.
pub fn load() -> (Settings, Option<String>) {
    let path = settings_path();
    if !path.exists() {
        return (Settings::default(), None);
    }

    match read_settings_file(&path) {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(err)),
    }
}

pub fn save(settings: &Settings) -> io::Result<()> {
    write_settings_file(&config_dir(), settings)
}
