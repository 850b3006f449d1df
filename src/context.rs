//! Structured render context for the multi-line grammar.
//!
//! The flat grammar only ever sees name -> string pairs; multi-line
//! templates additionally get a nested `nf_media_input` object and the
//! lazily computed `nf_program_info()` / `nf_screen_shots()` helpers.

use crate::catalog::TokenCatalog;
use crate::constants::{PROGRAM_NAME, PROGRAM_URL};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Technical attributes of the media input, exposed to multi-line
/// templates as a read-only nested object.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MediaInput {
    pub path: String,
    pub file_name: String,
    pub stem: String,
    pub extension: String,
    pub size_bytes: Option<u64>,
    pub duration_ms: Option<u64>,
    pub video: Option<VideoStream>,
    pub audio: Vec<AudioStream>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoStream {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub frame_rate: String,
    pub dynamic_range: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AudioStream {
    pub codec: String,
    pub channels: String,
    pub language: String,
    pub sample_rate: String,
}

/// Per-batch context for the multi-line renderer: the catalog's flat
/// fields plus structured objects and screenshot data.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub media_input: Option<MediaInput>,
    pub screen_shots: Vec<String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media_input(mut self, media_input: MediaInput) -> Self {
        self.media_input = Some(media_input);
        self
    }

    pub fn with_screen_shots(mut self, urls: Vec<String>) -> Self {
        self.screen_shots = urls;
        self
    }

    /// Builds the minijinja context object: every catalog token becomes
    /// a top-level field, `nf_media_input` carries the nested object.
    pub fn to_value(&self, catalog: &TokenCatalog) -> Value {
        let mut fields = Map::new();
        for (name, value) in catalog.iter() {
            fields.insert(name.to_string(), Value::String(value.to_string()));
        }
        if let Some(media_input) = &self.media_input {
            fields.insert("nf_media_input".to_string(), json!(media_input));
        }
        Value::Object(fields)
    }

    /// The rendered screenshot block, one URL per line. Computed only
    /// when a template calls `nf_screen_shots()`.
    pub fn screen_shot_block(&self) -> String {
        self.screen_shots.join("\n")
    }
}

/// Program identification string for `nf_program_info()`.
pub fn program_info() -> String {
    format!("{PROGRAM_NAME} v{} | {PROGRAM_URL}", env!("CARGO_PKG_VERSION"))
}
