//! # Video Tools Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i planner e gli executor tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tassonomia degli errori e exit code
//! - `probe`: Snapshot `MediaMetadata` e parsing delle risposte di ffprobe
//! - `toolkit`: Interfaccia `MediaToolkit` (probe + execute)
//! - `ffmpeg`: Implementazione reale con ffmpeg/ffprobe
//! - `tool_resolver`: Ricerca dei binari esterni
//! - `bitrate`: Giudizio innocent/wicked e ripartizione del bitrate
//! - `chunk`: Durata dei segmenti a partire dalla dimensione target
//! - `segment`: Split in segmenti numerati
//! - `concat`: Unione ordinata di più file
//! - `compress`: Compressione verso una dimensione target
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use video_tools::{chunk, segment, FfmpegToolkit, MediaToolkit, ToolPathResolver};
//!
//! let toolkit = FfmpegToolkit::new(&ToolPathResolver::new());
//! let metadata = toolkit.probe(&path).await?;
//! let plan = chunk::plan(&metadata, 25.0, Default::default())?;
//! ```

pub mod utils;

pub mod bitrate;
pub mod chunk;
pub mod compress;
pub mod concat;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod json_output;
pub mod probe;
pub mod profile;
pub mod segment;
pub mod tool_resolver;
pub mod toolkit;

pub use config::Config;
pub use error::{Result, VideoToolsError};
pub use ffmpeg::FfmpegToolkit;
pub use probe::MediaMetadata;
pub use profile::{EncodeProfile, StreamMode};
pub use tool_resolver::ToolPathResolver;
pub use toolkit::MediaToolkit;
