use crate::matcher::NoteInterval;
use serde::{Deserialize, Serialize};

/// Lowest representable MIDI pitch (A0, leftmost piano key).
pub const PITCH_LOW: u8 = 21;
/// Highest representable MIDI pitch (C8, rightmost piano key).
pub const PITCH_HIGH: u8 = 108;
/// Width of the pitch axis: the 88 keys of a piano.
pub const NUM_PITCHES: usize = 88;

/// Dense time-by-pitch velocity matrix of shape `[frames, 88]`.
///
/// Column `c` holds MIDI pitch `c + 21`; cells are velocities 0–127 widened
/// to `i16` for arithmetic headroom. Stored row-major, one 88-wide row per
/// frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pianoroll {
    frames: usize,
    data: Vec<i16>,
}

impl Pianoroll {
    /// All-zero matrix with `frames` rows.
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            data: vec![0; frames * NUM_PITCHES],
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn get(&self, frame: usize, column: usize) -> i16 {
        self.data[frame * NUM_PITCHES + column]
    }

    /// Rasterize one interval: write its velocity into column `pitch - 21`
    /// over the half-open frame range `[start_frame, end_frame)`, clipped at
    /// the matrix height. Overlapping writes to the same cell overwrite; the
    /// last interval in processing order wins. Intervals for pitches outside
    /// the 88-key window have no column and are ignored.
    pub fn write_interval(&mut self, interval: &NoteInterval) {
        if !(PITCH_LOW..=PITCH_HIGH).contains(&interval.pitch) {
            return;
        }
        let column = (interval.pitch - PITCH_LOW) as usize;
        let end = interval.end_frame.min(self.frames);
        for frame in interval.start_frame..end {
            self.data[frame * NUM_PITCHES + column] = interval.velocity as i16;
        }
    }

    /// Element-wise maximum with another matrix of the same shape.
    pub fn merge_max(&mut self, other: &Pianoroll) {
        debug_assert_eq!(self.frames, other.frames);
        for (cell, &theirs) in self.data.iter_mut().zip(&other.data) {
            *cell = (*cell).max(theirs);
        }
    }

    /// A track whose matrix carries zero total energy is dropped from the
    /// conversion output.
    pub fn is_silent(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.data
    }

    /// One pitch column in frame order, for decoding contiguous nonzero
    /// runs back into note tuples.
    pub fn column(&self, column: usize) -> impl Iterator<Item = i16> + '_ {
        (0..self.frames).map(move |frame| self.get(frame, column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn interval(pitch: u8, velocity: u8, start: usize, end: usize) -> NoteInterval {
        NoteInterval {
            pitch,
            velocity,
            start_frame: start,
            end_frame: end,
        }
    }

    #[test]
    fn writes_half_open_range() {
        let mut pr = Pianoroll::new(8);
        pr.write_interval(&interval(60, 80, 2, 5));

        let col = (60 - PITCH_LOW) as usize;
        assert_eq!(pr.get(1, col), 0);
        assert_eq!(pr.get(2, col), 80);
        assert_eq!(pr.get(4, col), 80);
        assert_eq!(pr.get(5, col), 0);
    }

    #[test]
    fn clips_past_matrix_height() {
        let mut pr = Pianoroll::new(4);
        pr.write_interval(&interval(21, 100, 2, 10));
        pr.write_interval(&interval(108, 100, 6, 9)); // fully past the end

        assert_eq!(pr.get(3, 0), 100);
        assert!(pr.column(NUM_PITCHES - 1).all(|v| v == 0));
    }

    #[test]
    fn overlapping_writes_overwrite() {
        let mut pr = Pianoroll::new(8);
        pr.write_interval(&interval(60, 80, 0, 6));
        pr.write_interval(&interval(60, 40, 4, 8));

        let col = (60 - PITCH_LOW) as usize;
        assert_eq!(pr.get(3, col), 80);
        assert_eq!(pr.get(4, col), 40);
        assert_eq!(pr.get(5, col), 40);
    }

    #[test]
    fn out_of_window_interval_is_ignored() {
        let mut pr = Pianoroll::new(4);
        pr.write_interval(&interval(20, 100, 0, 4));
        pr.write_interval(&interval(109, 100, 0, 4));
        assert!(pr.is_silent());
    }

    #[test]
    fn merge_takes_element_wise_max() {
        let mut a = Pianoroll::new(4);
        a.write_interval(&interval(60, 80, 0, 4));
        let mut b = Pianoroll::new(4);
        b.write_interval(&interval(60, 100, 2, 4));
        b.write_interval(&interval(62, 50, 0, 2));

        a.merge_max(&b);

        let c60 = (60 - PITCH_LOW) as usize;
        let c62 = (62 - PITCH_LOW) as usize;
        assert_eq!(a.get(0, c60), 80);
        assert_eq!(a.get(2, c60), 100);
        assert_eq!(a.get(1, c62), 50);
    }

    #[test]
    fn silence_detection() {
        let mut pr = Pianoroll::new(4);
        assert!(pr.is_silent());
        pr.write_interval(&interval(60, 1, 0, 1));
        assert!(!pr.is_silent());
    }
}
