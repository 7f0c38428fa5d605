pub mod convert;
pub mod matcher;
pub mod pianoroll;
pub mod tempo;
pub mod timeline;

pub use convert::{canonical_name, PianorollConverter};
pub use matcher::{match_notes, NoteInterval};
pub use pianoroll::{Pianoroll, NUM_PITCHES, PITCH_HIGH, PITCH_LOW};
pub use tempo::{resolve_tempo, TempoInfo};
pub use timeline::{frame_count, total_ticks};

use std::path::PathBuf;

/// Errors from pianoroll conversion operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("MIDI parse error: {0}")]
    MidiParse(String),
    #[error("tempo information was not found in the MIDI file")]
    MissingTempo,
}

pub type Result<T> = std::result::Result<T, Error>;
