use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::de::DeserializeOwned;

use crate::core::WortkartenError;

const APP_NAME: &str = "wortkarten";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

/// Default root for the durable media store.
pub fn default_media_dir() -> PathBuf {
    get_app_data_dir().join("media")
}

/// Read a data file in HJSON form (tier tables, explanation overrides).
pub fn load_hjson<T: DeserializeOwned>(path: &Path) -> Result<T, WortkartenError> {
    let text = fs::read_to_string(path)?;
    let data: T = serde_hjson::from_str(&text)?;
    Ok(data)
}
