//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `VideoToolsError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Mappa ogni errore su un exit code del processo
//!
//! ## Categorie di errori:
//! - `NotFound`: Path di input o directory inesistente
//! - `InvalidArguments`: Opzioni mutuamente esclusive o mancanti
//! - `InvalidTarget`: Target numerico non positivo
//! - `FormatError`: Durata testuale non interpretabile
//! - `ProbeError`: ffprobe non ha restituito una durata utilizzabile
//! - `ExternalToolError`: ffmpeg terminato con exit status diverso da zero
//! - `MissingInput`: Un input del concat non esiste
//! - `MissingDependency`: Tool esterno mancante (ffmpeg, ffprobe)
//! - `Io`: Errori di I/O
//!
//! Tutti gli errori sono terminali per l'invocazione corrente: nessun retry.
//!
//! ## Esempio:
//! ```rust,ignore
//! if !path.exists() {
//!     return Err(VideoToolsError::NotFound(path.to_path_buf()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for planning and running media workflows
#[derive(thiserror::Error, Debug)]
pub enum VideoToolsError {
    #[error("Input not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Invalid duration '{0}': expected seconds or HH:MM:SS[.fraction]")]
    FormatError(String),

    #[error("Could not determine duration of {}: {reason}", .path.display())]
    ProbeError { path: PathBuf, reason: String },

    #[error("{tool} exited with status {status}")]
    ExternalToolError { tool: String, status: i32 },

    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VideoToolsError {
    /// Process exit code for this error.
    ///
    /// External tool failures mirror the tool's own status; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalToolError { status, .. } => (*status).clamp(1, 255),
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, VideoToolsError>;
