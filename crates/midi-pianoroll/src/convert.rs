use crate::matcher::match_notes;
use crate::pianoroll::Pianoroll;
use crate::tempo::resolve_tempo;
use crate::timeline::{frame_count, total_ticks};
use midly::Smf;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Canonical output key for a track: its positional index in the file.
///
/// Decoded track names never participate in output identity; the synthesized
/// name is never empty, so no unnamed-track fallback exists.
pub fn canonical_name(index: usize) -> String {
    format!("Track_{index}")
}

/// Converts one MIDI file into a `track name → pianoroll` mapping.
///
/// Every entry point re-reads and re-parses the file; nothing is cached
/// between calls. The caller-supplied quantization is a placeholder only:
/// the first call that resolves tempo replaces it with the tempo-derived
/// factor `1 / beats_per_second`, and that value governs all tick-to-frame
/// mapping from then on.
#[derive(Debug)]
pub struct PianorollConverter {
    path: PathBuf,
    quantization: f64,
    num_ticks: Option<f64>,
    frame_count: Option<usize>,
}

impl PianorollConverter {
    pub fn new<P: AsRef<Path>>(path: P, quantization: f64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            quantization,
            num_ticks: None,
            frame_count: None,
        }
    }

    /// Placeholder quantization until the first tempo resolution, the
    /// tempo-derived factor afterwards.
    pub fn quantization(&self) -> f64 {
        self.quantization
    }

    /// Frame count `T` recorded by the last [`frame_count`](Self::frame_count)
    /// or [`read_file`](Self::read_file) call.
    pub fn last_frame_count(&self) -> Option<usize> {
        self.frame_count
    }

    /// Tick total recorded by the last call that computed one.
    pub fn last_total_ticks(&self) -> Option<f64> {
        self.num_ticks
    }

    fn read_bytes(&self) -> crate::Result<Vec<u8>> {
        fs::read(&self.path).map_err(|source| crate::Error::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Total file length in ticks, recomputed from the event deltas.
    pub fn total_num_ticks(&mut self) -> crate::Result<f64> {
        let bytes = self.read_bytes()?;
        let smf = Smf::parse(&bytes).map_err(|e| crate::Error::MidiParse(e.to_string()))?;

        let num_ticks = total_ticks(&smf);
        self.num_ticks = Some(num_ticks);
        Ok(num_ticks)
    }

    /// Lowest and highest pitch across every note-on/note-off message in the
    /// file, unfiltered by the 88-key window. `None` when the file contains
    /// no note events at all.
    pub fn pitch_range(&self) -> crate::Result<Option<(u8, u8)>> {
        let bytes = self.read_bytes()?;
        let smf = Smf::parse(&bytes).map_err(|e| crate::Error::MidiParse(e.to_string()))?;

        let mut range: Option<(u8, u8)> = None;
        for track in &smf.tracks {
            for event in track {
                if let midly::TrackEventKind::Midi { message, .. } = event.kind {
                    let pitch = match message {
                        midly::MidiMessage::NoteOn { key, .. }
                        | midly::MidiMessage::NoteOff { key, .. } => key.as_int(),
                        _ => continue,
                    };
                    range = Some(match range {
                        Some((lo, hi)) => (lo.min(pitch), hi.max(pitch)),
                        None => (pitch, pitch),
                    });
                }
            }
        }
        Ok(range)
    }

    /// Resolve tempo, derive the effective quantization, and compute the
    /// pianoroll frame count `T` for this file.
    pub fn frame_count(&mut self) -> crate::Result<usize> {
        let bytes = self.read_bytes()?;
        let smf = Smf::parse(&bytes).map_err(|e| crate::Error::MidiParse(e.to_string()))?;

        let tempo = resolve_tempo(&smf)?;
        let quantization = tempo.quantization_factor();
        let num_ticks = total_ticks(&smf);
        let frames = frame_count(num_ticks, tempo.ticks_per_beat, quantization);

        self.quantization = quantization;
        self.num_ticks = Some(num_ticks);
        self.frame_count = Some(frames);
        Ok(frames)
    }

    /// Full conversion: one pianoroll per non-silent track, keyed by
    /// synthesized track name.
    pub fn read_file(&mut self) -> crate::Result<BTreeMap<String, Pianoroll>> {
        let frames = self.frame_count()?;
        let quantization = self.quantization;

        let bytes = self.read_bytes()?;
        let smf = Smf::parse(&bytes).map_err(|e| crate::Error::MidiParse(e.to_string()))?;
        let tempo = resolve_tempo(&smf)?;

        let mut pianorolls: BTreeMap<String, Pianoroll> = BTreeMap::new();
        for (index, track) in smf.tracks.iter().enumerate() {
            let mut pr = Pianoroll::new(frames);
            for interval in match_notes(track, tempo.ticks_per_beat, quantization) {
                pr.write_interval(&interval);
            }
            if pr.is_silent() {
                continue;
            }
            merge_track(&mut pianorolls, canonical_name(index), pr);
        }
        Ok(pianorolls)
    }
}

/// Insert one track's matrix under its canonical name, folding a key
/// collision into the element-wise maximum of the two matrices. Index-based
/// names cannot collide today, but the merge stays in place should track
/// indices ever be reused upstream.
fn merge_track(pianorolls: &mut BTreeMap<String, Pianoroll>, name: String, pr: Pianoroll) {
    match pianorolls.entry(name) {
        std::collections::btree_map::Entry::Occupied(mut existing) => {
            existing.get_mut().merge_max(&pr);
        }
        std::collections::btree_map::Entry::Vacant(slot) => {
            slot.insert(pr);
        }
    }
}
