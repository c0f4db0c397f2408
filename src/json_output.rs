//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico.
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout quando `--json` è attivo
//! - Riusa le strutture dei planner (`MediaMetadata`, `BitratePlan`, `ChunkPlan`)
//!
//! ## Tipi di messaggi:
//! - `probe`: Metadata di un file
//! - `bitrate_plan`: Giudizio e bitrate scelti da `compress`
//! - `chunk_plan`: Durata dei segmenti calcolata da `chunk-size`
//! - `segments`: File prodotti da uno split
//! - `concat`: Input e output di un concat
//! - `error`: Errore terminale dell'invocazione

use serde::Serialize;
use std::path::PathBuf;

use crate::bitrate::BitratePlan;
use crate::chunk::ChunkPlan;
use crate::concat::ConcatReport;
use crate::error::VideoToolsError;
use crate::probe::MediaMetadata;
use crate::segment::SegmentSet;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Probe {
        path: PathBuf,
        metadata: MediaMetadata,
    },

    BitratePlan {
        input: PathBuf,
        output: PathBuf,
        plan: BitratePlan,
    },

    ChunkPlan {
        input: PathBuf,
        target_mb: f64,
        plan: ChunkPlan,
    },

    Segments {
        segment_seconds: f64,
        count: usize,
        files: Vec<PathBuf>,
    },

    Concat {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },

    Error {
        message: String,
        exit_code: i32,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn segments(segment_seconds: f64, set: &SegmentSet) -> Self {
        Self::Segments {
            segment_seconds,
            count: set.len(),
            files: set.files.clone(),
        }
    }

    pub fn concat(report: &ConcatReport) -> Self {
        Self::Concat {
            inputs: report.inputs.clone(),
            output: report.output.clone(),
        }
    }

    /// Crea un messaggio di errore
    pub fn error(err: &VideoToolsError) -> Self {
        Self::Error {
            message: err.to_string(),
            exit_code: err.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_segments_message_shape() {
        let set = SegmentSet {
            files: vec![PathBuf::from("chunks/chunk_000.mp4"), PathBuf::from("chunks/chunk_001.mp4")],
        };
        let value: Value = serde_json::to_value(JsonMessage::segments(30.0, &set)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "segments",
                "segment_seconds": 30.0,
                "count": 2,
                "files": ["chunks/chunk_000.mp4", "chunks/chunk_001.mp4"],
            })
        );
    }

    #[test]
    fn test_error_message_carries_exit_code() {
        let err = VideoToolsError::ExternalToolError { tool: "ffmpeg".to_string(), status: 3 };
        let value: Value = serde_json::to_value(JsonMessage::error(&err)).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["exit_code"], 3);
        assert_eq!(value["message"], "ffmpeg exited with status 3");
    }

    #[test]
    fn test_concat_message_keeps_input_order() {
        let report = ConcatReport {
            inputs: vec![PathBuf::from("b.mp4"), PathBuf::from("a.mp4")],
            output: PathBuf::from("out.mp4"),
        };
        let value: Value = serde_json::to_value(JsonMessage::concat(&report)).unwrap();
        assert_eq!(value["type"], "concat");
        assert_eq!(value["inputs"], json!(["b.mp4", "a.mp4"]));
        assert_eq!(value["output"], "out.mp4");
    }
}
