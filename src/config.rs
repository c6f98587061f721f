//! Pipeline configuration.
//!
//! Every value can come from a CLI flag or an environment variable (a `.env`
//! file is loaded first by the binary). Defaults:
//!
//! | field          | default            | env var              |
//! |----------------|--------------------|----------------------|
//! | raw_dir        | `data/raw`         | `RAW_DIR`            |
//! | staged_dir     | `data/staged`      | `STAGED_DIR`         |
//! | processed_dir  | `data/processed`   | `PROCESSED_DIR`      |
//! | table          | `air_quality_data` | `SUPABASE_AIR_TABLE` |
//! | batch_size     | `500`              | `LOAD_BATCH_SIZE`    |
//! | supabase_url   | unset              | `SUPABASE_URL`       |
//! | supabase_key   | unset              | `SUPABASE_KEY`       |

use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_RAW_DIR: &str = "data/raw";
pub const DEFAULT_STAGED_DIR: &str = "data/staged";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";
pub const DEFAULT_TABLE: &str = "air_quality_data";
pub const DEFAULT_BATCH_SIZE: usize = 500;

pub const STAGED_FILE_NAME: &str = "air_quality_transformed.csv";

#[derive(Debug, Clone, Args)]
pub struct PipelineConfig {
    /// Directory holding `<city>_raw_<suffix>.json` payloads
    #[arg(long, env = "RAW_DIR", default_value = DEFAULT_RAW_DIR)]
    pub raw_dir: PathBuf,

    /// Directory for the staged CSV
    #[arg(long, env = "STAGED_DIR", default_value = DEFAULT_STAGED_DIR)]
    pub staged_dir: PathBuf,

    /// Directory for analysis reports
    #[arg(long, env = "PROCESSED_DIR", default_value = DEFAULT_PROCESSED_DIR)]
    pub processed_dir: PathBuf,

    /// Store table to upsert into and read from
    #[arg(long, env = "SUPABASE_AIR_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Rows per upsert request
    #[arg(long, env = "LOAD_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            staged_dir: PathBuf::from(DEFAULT_STAGED_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            table: DEFAULT_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            supabase_url: None,
            supabase_key: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        if self.table.trim().is_empty() {
            bail!("table name must not be empty");
        }
        Ok(())
    }

    /// Path of the staged dataset, `<staged_dir>/air_quality_transformed.csv`.
    pub fn staged_csv_path(&self) -> PathBuf {
        self.staged_dir.join(STAGED_FILE_NAME)
    }

    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.processed_dir.join(file_name)
    }

    /// Returns `(url, key)` or an error naming whichever is missing.
    pub fn supabase_credentials(&self) -> Result<(&str, &str)> {
        match (self.supabase_url.as_deref(), self.supabase_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Ok((url, key)),
            _ => bail!("SUPABASE_URL and SUPABASE_KEY must both be set to use the store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.staged_csv_path(),
            Path::new("data/staged/air_quality_transformed.csv")
        );
        assert_eq!(
            config.report_path("summary_metrics.csv"),
            Path::new("data/processed/summary_metrics.csv")
        );
        assert_eq!(config.table, "air_quality_data");
        assert_eq!(config.batch_size, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = PipelineConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_required_together() {
        let mut config = PipelineConfig {
            supabase_url: Some("https://x.supabase.co".to_string()),
            ..Default::default()
        };
        assert!(config.supabase_credentials().is_err());

        config.supabase_key = Some("secret".to_string());
        assert_eq!(
            config.supabase_credentials().unwrap(),
            ("https://x.supabase.co", "secret")
        );
    }
}
