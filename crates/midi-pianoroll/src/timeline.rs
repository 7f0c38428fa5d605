use midly::Smf;

/// Total length of the file in ticks: the per-track sum of every event's
/// delta time (regardless of message type), maximized across tracks.
///
/// The track length meta message is unreliable in the wild, so the length is
/// always recomputed from the deltas themselves.
pub fn total_ticks(smf: &Smf) -> f64 {
    let mut num_ticks: f64 = 0.0;

    for track in &smf.tracks {
        let mut tick_counter: f64 = 0.0;
        for event in track {
            tick_counter += event.delta.as_int() as f64;
        }
        num_ticks = num_ticks.max(tick_counter);
    }

    num_ticks
}

/// Convert a tick total into the allocated frame count `T` for every
/// per-track matrix: `floor((num_ticks / ticks_per_beat) * quantization)`.
///
/// Events whose frame index lands at or beyond `T` are clipped at
/// rasterization time, never an error.
pub fn frame_count(num_ticks: f64, ticks_per_beat: u16, quantization: f64) -> usize {
    ((num_ticks / ticks_per_beat as f64) * quantization).floor() as usize
}
