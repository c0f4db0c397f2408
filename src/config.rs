//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con la policy di bitrate e i profili di ricodifica
//! - Fornisce validazione dei parametri prima di ogni pianificazione
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `bitrate`: Policy per `compress` (target 250 MB, audio 96k, video 150k-5000k, ratio 1.2)
//! - `segment_profile`: Profilo di ricodifica per lo split (libx264 veryfast, CRF 23, AAC 128k)
//! - `concat_profile`: Profilo di ricodifica per il concat (libx264 medium, CRF 23, AAC 128k)
//! - `out_dir`: Directory di output dei segmenti (default: `chunks`)
//! - `prefix`: Prefisso dei segmenti (default: `chunk`)
//! - `json_output`: Eventi JSON su stdout (default: false)
//!
//! I planner ricevono sempre la configurazione come valore esplicito: nessuna
//! costante globale di processo.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     prefix: "part".to_string(),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::bitrate::BitratePolicy;
use crate::error::VideoToolsError;
use crate::profile::EncodeProfile;

/// Configuration for planning and running media workflows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Size/bitrate policy for compression
    pub bitrate: BitratePolicy,
    /// Fallback profile when segmenting without stream copy
    pub segment_profile: EncodeProfile,
    /// Fallback profile when concatenating without stream copy
    pub concat_profile: EncodeProfile,
    /// Default output directory for segments
    pub out_dir: PathBuf,
    /// Default segment file prefix
    pub prefix: String,
    /// Output events as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bitrate: BitratePolicy::default(),
            segment_profile: EncodeProfile::segment_default(),
            concat_profile: EncodeProfile::concat_default(),
            out_dir: PathBuf::from("chunks"),
            prefix: "chunk".to_string(),
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), VideoToolsError> {
        self.bitrate.validate()?;

        for (name, profile) in [("segment", &self.segment_profile), ("concat", &self.concat_profile)] {
            if profile.crf > 51 {
                return Err(VideoToolsError::InvalidArguments(format!(
                    "{} profile CRF must be between 0 and 51",
                    name
                )));
            }
            if profile.video_codec.is_empty() || profile.audio_codec.is_empty() {
                return Err(VideoToolsError::InvalidArguments(format!(
                    "{} profile needs a video and an audio codec",
                    name
                )));
            }
        }

        if self.prefix.is_empty() {
            return Err(VideoToolsError::InvalidArguments("prefix must not be empty".to_string()));
        }

        Ok(())
    }

    /// Default config location: `<config dir>/video-tools/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("video-tools").join("config.json"))
    }

    /// Load configuration from file, falling back to defaults if it is missing
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
