use std::collections::HashMap;

use super::song::{Song, SongEvent};

/// Captures played notes against a wall clock and renders them in the
/// song text format.
///
/// The recorder is fed the same note-on/note-off stream the voice engine
/// sees. All timestamps are caller-provided milliseconds on a monotonic
/// clock; the recorder itself never looks at the time.
pub struct SongRecorder {
    recording: bool,
    start_ms: f64,
    preset: String,
    /// Absolute start time of each note currently held down.
    open_notes: HashMap<u8, f64>,
    notes: Vec<SongEvent>,
}

impl SongRecorder {
    pub fn new() -> Self {
        Self {
            recording: false,
            start_ms: 0.0,
            preset: "init".to_string(),
            open_notes: HashMap::new(),
            notes: Vec::new(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Name the preset written into the export header.
    pub fn set_preset(&mut self, name: &str) {
        self.preset = name.to_string();
    }

    /// Begin a new take, discarding any previous one.
    pub fn start(&mut self, now_ms: f64) {
        self.recording = true;
        self.start_ms = now_ms;
        self.open_notes.clear();
        self.notes.clear();
    }

    /// Stop recording. Notes still held are closed at the stop instant.
    pub fn stop(&mut self, now_ms: f64) {
        self.recording = false;
        for (note, started) in self.open_notes.drain() {
            self.notes.push(SongEvent {
                note,
                time_ms: (started - self.start_ms).max(0.0) as u32,
                duration_ms: (now_ms - started).max(0.0) as u32,
            });
        }
    }

    pub fn note_on(&mut self, note: u8, now_ms: f64) {
        if self.recording {
            self.open_notes.insert(note, now_ms);
        }
    }

    pub fn note_off(&mut self, note: u8, now_ms: f64) {
        if !self.recording {
            return;
        }
        if let Some(started) = self.open_notes.remove(&note) {
            self.notes.push(SongEvent {
                note,
                time_ms: (started - self.start_ms).max(0.0) as u32,
                duration_ms: (now_ms - started).max(0.0) as u32,
            });
        }
    }

    pub fn to_song(&self) -> Song {
        Song {
            preset: self.preset.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Render the take as song text. `date` in `YYYY-MM-DD` form.
    pub fn export(&self, date: &str) -> String {
        self.to_song().to_text(date)
    }
}

impl Default for SongRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::song::Song;

    #[test]
    fn captures_relative_times_and_durations() {
        let mut rec = SongRecorder::new();
        rec.start(1000.0);
        rec.note_on(60, 1000.0);
        rec.note_off(60, 1100.0);
        rec.note_on(64, 1100.0);
        rec.note_off(64, 1300.0);
        rec.stop(1300.0);

        let song = rec.to_song();
        assert_eq!(
            song.notes,
            vec![
                SongEvent {
                    note: 60,
                    time_ms: 0,
                    duration_ms: 100
                },
                SongEvent {
                    note: 64,
                    time_ms: 100,
                    duration_ms: 200
                },
            ]
        );
    }

    #[test]
    fn stop_closes_held_notes() {
        let mut rec = SongRecorder::new();
        rec.start(0.0);
        rec.note_on(72, 50.0);
        rec.stop(250.0);

        let song = rec.to_song();
        assert_eq!(song.notes.len(), 1);
        assert_eq!(song.notes[0].time_ms, 50);
        assert_eq!(song.notes[0].duration_ms, 200);
    }

    #[test]
    fn events_outside_a_take_are_ignored() {
        let mut rec = SongRecorder::new();
        rec.note_on(60, 0.0);
        rec.note_off(60, 100.0);
        assert!(rec.to_song().notes.is_empty());
    }

    #[test]
    fn export_round_trips_through_the_song_format() {
        let mut rec = SongRecorder::new();
        rec.set_preset("bass");
        rec.start(0.0);
        rec.note_on(40, 0.0);
        rec.note_off(40, 150.0);
        rec.note_on(52, 250.0);
        rec.note_off(52, 400.0);
        rec.stop(400.0);

        let parsed = Song::parse(&rec.export("2024-06-01"));
        assert_eq!(parsed.preset, "bass");
        assert_eq!(parsed.notes, rec.to_song().notes);
    }
}
