use crate::pianoroll::{PITCH_HIGH, PITCH_LOW};
use midly::{MidiMessage, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// A closed note: pitch, onset velocity, and its half-open frame range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInterval {
    pub pitch: u8,
    pub velocity: u8,
    pub start_frame: usize,
    pub end_frame: usize,
}

impl NoteInterval {
    pub fn duration_frames(&self) -> usize {
        self.end_frame.saturating_sub(self.start_frame)
    }
}

/// A note-on awaiting its closing note-off.
#[derive(Debug, Clone, Copy)]
struct PendingNote {
    velocity: u8,
    start_frame: usize,
}

/// Pair note-on and note-off events of one track into closed intervals.
///
/// Each event advances the tick counter by its delta time, note or not, and
/// the counter maps to a frame via `round(ticks / ticks_per_beat *
/// quantization)`. A note-on with velocity 0 counts as a note-off.
///
/// Same-pitch overlaps resolve FIFO: the oldest sounding note closes first.
/// This is a deliberate policy (a LIFO tie-break would change output for
/// overlapping retriggers) and must stay fixed for reproducibility, even
/// though it can mispair deeply overlapping same-pitch sustains.
///
/// Pitches outside 21..=108 are ignored entirely on both edges. An orphan
/// note-off is logged and dropped. Notes still sounding at end of track are
/// discarded without producing an interval.
pub fn match_notes(
    track: &[TrackEvent],
    ticks_per_beat: u16,
    quantization: f64,
) -> Vec<NoteInterval> {
    let mut intervals = Vec::new();
    let mut tick_counter: f64 = 0.0;
    let mut pending: HashMap<u8, VecDeque<PendingNote>> = HashMap::new();

    for event in track {
        tick_counter += event.delta.as_int() as f64;
        let frame = (tick_counter / ticks_per_beat as f64 * quantization).round() as usize;

        let TrackEventKind::Midi { message, .. } = event.kind else {
            continue;
        };

        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                let pitch = key.as_int();
                if (PITCH_LOW..=PITCH_HIGH).contains(&pitch) {
                    pending.entry(pitch).or_default().push_back(PendingNote {
                        velocity: vel.as_int(),
                        start_frame: frame,
                    });
                }
            }
            MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                // vel=0 NoteOn is NoteOff
                let pitch = key.as_int();
                if !(PITCH_LOW..=PITCH_HIGH).contains(&pitch) {
                    continue;
                }
                match pending.get_mut(&pitch).and_then(VecDeque::pop_front) {
                    Some(note) => intervals.push(NoteInterval {
                        pitch,
                        velocity: note.velocity,
                        start_frame: note.start_frame,
                        end_frame: frame,
                    }),
                    None => {
                        warn!(pitch, frame, "note off for a note that was never turned on");
                    }
                }
            }
            _ => {}
        }
    }

    intervals
}
