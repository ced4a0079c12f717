use std::collections::HashMap;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use directories::ProjectDirs;

use crate::opt::*;

const APP_NAME: &str = "mt2-draft";
const APP_AUTHOR: &str = "mt2";
const APP_QUALIFIER: &str = "com";

const RUNTIME_DATA_FILE_NAME: &str = "runtime_data.json";

pub const CURRENT_RUN_ID_KEY: &str = "current_run_id";

const CARD_DATA_VAR: &str = "MT2_CARD_DATA";
const RULE_DATA_VAR: &str = "MT2_RULE_DATA";
const RUNTIME_DIR_VAR: &str = "MT2_RUNTIME_DIR";

fn log(s: String) {
    log_if(s.as_str(), DbgFlg::Cli);
}

/// Paths picked up from the environment (and `.env`) at start-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub card_data: Option<PathBuf>,
    pub rule_data: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };

        Settings {
            card_data: path(CARD_DATA_VAR),
            rule_data: path(RULE_DATA_VAR),
            runtime_dir: path(RUNTIME_DIR_VAR),
        }
    }

    pub fn runtime_dir(&self) -> Res<PathBuf> {
        if let Some(dir) = &self.runtime_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME)
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .ok_or_else(|| "Failed to get the project directory".to_string())
    }
}

/// Small key/value store persisted as JSON next to the user's local data.
pub struct AppContext {
    data: Arc<RwLock<HashMap<String, String>>>,
    data_file_path: PathBuf,
}

pub fn create_context(settings: &Settings) -> Res<AppContext> {
    let runtime_dir = settings.runtime_dir()?;
    log(format!("Runtime directory: {}", runtime_dir.display()));

    std::fs::create_dir_all(&runtime_dir).err_to_str()?;
    load_data_from_file(&runtime_dir.join(RUNTIME_DATA_FILE_NAME))
}

pub fn load_data_from_file(data_file_path: &Path) -> Res<AppContext> {
    let data = if data_file_path.exists() {
        let mut contents = String::new();
        File::open(data_file_path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .err_to_str()?;
        if contents.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(&contents).err_to_str()?
        }
    } else {
        HashMap::new()
    };

    Ok(AppContext {
        data: Arc::new(RwLock::new(data)),
        data_file_path: data_file_path.to_path_buf(),
    })
}

impl AppContext {
    pub fn read_data(&self, key: &str) -> Option<String> {
        let data_read = self.data.read().ok()?;
        data_read.get(key).cloned()
    }

    pub fn write_data(&self, key: &str, value: &str) -> Res<()> {
        let mut data_write = self.data.write().map_err(|err| err.to_string())?;
        data_write.insert(key.to_string(), value.to_string());
        save_data(&self.data_file_path, &data_write)
    }

    pub fn current_run_id(&self) -> Option<String> {
        self.read_data(CURRENT_RUN_ID_KEY)
    }

    pub fn set_current_run_id(&self, run_id: &str) -> Res<()> {
        self.write_data(CURRENT_RUN_ID_KEY, run_id)
    }
}

fn save_data(data_file_path: &Path, data: &HashMap<String, String>) -> Res<()> {
    let content = serde_json::to_string(data).err_to_str()?;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(data_file_path)
        .and_then(|mut file| file.write_all(content.as_bytes()))
        .err_to_str()
}
