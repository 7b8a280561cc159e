//! Environment-derived settings for the command-line driver.

use std::path::PathBuf;

use anyhow::{Result, bail};
use kcl_rag::IndexPaths;

/// API key for both the embedding and completion services.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Optional OpenAI-compatible base URL.
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
/// Directory holding the question tables.
pub const DATA_DIR_VAR: &str = "KCL_DATA_DIR";
/// Directory receiving index artifacts and prediction tables.
pub const OUT_DIR_VAR: &str = "KCL_OUT_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUT_DIR: &str = "outputs";

/// Preferred training table.
pub const TRAIN_FILE: &str = "Criminal-Law-train.csv";
/// Training table used when [`TRAIN_FILE`] is absent.
pub const TRAIN_FALLBACK_FILE: &str = "train.csv";
/// Evaluation table.
pub const TEST_FILE: &str = "Criminal-Law-test.csv";
/// Prediction table written by `kcl evaluate`.
pub const EVAL_OUTPUT_FILE: &str = "dev_eval.csv";

/// Where data lives and how to reach the OpenAI-compatible services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    api_key: Option<String>,
    /// OpenAI-compatible endpoint, `None` for the public API.
    pub base_url: Option<String>,
    /// Directory holding the question tables.
    pub data_dir: PathBuf,
    /// Directory receiving index artifacts and prediction tables.
    pub out_dir: PathBuf,
}

impl Settings {
    /// Read settings from the process environment after loading `.env`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            api_key: get(API_KEY_VAR),
            base_url: get(BASE_URL_VAR),
            data_dir: get(DATA_DIR_VAR).unwrap_or_else(|| DEFAULT_DATA_DIR.into()).into(),
            out_dir: get(OUT_DIR_VAR).unwrap_or_else(|| DEFAULT_OUT_DIR.into()).into(),
        }
    }

    /// The API key, required by every command that calls a service.
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) => Ok(key),
            None => bail!("{API_KEY_VAR} is not set; export it or add it to .env"),
        }
    }

    /// Training tables to try, in order.
    pub fn train_candidates(&self) -> Vec<PathBuf> {
        vec![self.data_dir.join(TRAIN_FILE), self.data_dir.join(TRAIN_FALLBACK_FILE)]
    }

    /// The evaluation table.
    pub fn test_path(&self) -> PathBuf {
        self.data_dir.join(TEST_FILE)
    }

    /// Index artifact locations under the output directory.
    pub fn index_paths(&self) -> IndexPaths {
        IndexPaths::in_dir(&self.out_dir)
    }
}
