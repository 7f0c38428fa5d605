use midly::{MetaMessage, Smf, TrackEventKind};
use serde::{Deserialize, Serialize};

/// Tempo and timing resolution of a MIDI file.
///
/// Only the first `set_tempo` meta message of the first track is honored;
/// tempo changes later in the file are never applied. The conversion runs
/// under a single global tempo by contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoInfo {
    pub microseconds_per_beat: f64,
    pub ticks_per_beat: u16,
}

impl TempoInfo {
    pub fn beats_per_second(&self) -> f64 {
        1e6 / self.microseconds_per_beat
    }

    /// Effective quantization factor: seconds per beat. This tempo-derived
    /// value always replaces whatever quantization the caller supplied.
    pub fn quantization_factor(&self) -> f64 {
        1.0 / self.beats_per_second()
    }
}

/// Scan the first track for tempo metadata.
///
/// Fails with [`crate::Error::MissingTempo`] when the first track carries no
/// tempo message (or the file has no tracks at all). There is no fallback
/// tempo.
pub fn resolve_tempo(smf: &Smf) -> crate::Result<TempoInfo> {
    let ticks_per_beat = match smf.header.timing {
        midly::Timing::Metrical(ticks) => ticks.as_int(),
        midly::Timing::Timecode(_, _) => 480,
    };

    let first_track = smf.tracks.first().ok_or(crate::Error::MissingTempo)?;

    for event in first_track {
        if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
            return Ok(TempoInfo {
                microseconds_per_beat: tempo.as_int() as f64,
                ticks_per_beat,
            });
        }
    }

    Err(crate::Error::MissingTempo)
}
