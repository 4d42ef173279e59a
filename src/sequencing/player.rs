use crate::audio::AudioBackend;
use crate::patch;
use crate::sequencing::demos::Demo;
use crate::sequencing::song::{Song, SongEvent};
use crate::synth::Synth;

/// Pad after the final event before a non-looping run auto-stops, in ms.
const STOP_PAD_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    NoteOff(u8),
    NoteOn(u8),
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    at_ms: u32,
    action: Action,
}

/*
Playback
========

Replays note events against a wall clock, calling into the voice engine
exactly as a performer would: one note-on when an event starts, one
note-off when its duration elapses.

The host owns the clock and calls `tick` from its event loop (a timer
callback, a UI frame, a stream callback). Due events dispatch in time
order; at equal timestamps note-offs go first so a repeated note can
retrigger. Stopping is an explicit cleanup pass: every pending event is
dropped and every active voice force-released, because scheduled events
and voice graphs are resources that outlast the logical scope that made
them.
*/
pub struct Player {
    schedule: Vec<Scheduled>,
    cursor: usize,
    origin_ms: f64,
    loop_length_ms: Option<u32>,
    end_ms: u32,
    playing: bool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            schedule: Vec::new(),
            cursor: 0,
            origin_ms: 0.0,
            loop_length_ms: None,
            end_ms: 0,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Schedule `notes` starting at `now_ms`. With a loop length the
    /// pattern repeats every `loop_length_ms`; otherwise playback
    /// auto-stops shortly after the last note ends.
    pub fn play(&mut self, notes: &[SongEvent], loop_length_ms: Option<u32>, now_ms: f64) {
        self.schedule.clear();
        for event in notes {
            self.schedule.push(Scheduled {
                at_ms: event.time_ms,
                action: Action::NoteOn(event.note),
            });
            self.schedule.push(Scheduled {
                at_ms: event.time_ms + event.duration_ms,
                action: Action::NoteOff(event.note),
            });
        }
        // Offs sort ahead of ons at the same timestamp.
        self.schedule
            .sort_by_key(|s| (s.at_ms, matches!(s.action, Action::NoteOn(_))));

        self.cursor = 0;
        self.origin_ms = now_ms;
        self.loop_length_ms = loop_length_ms;
        self.end_ms = notes
            .iter()
            .map(|n| n.time_ms + n.duration_ms)
            .max()
            .unwrap_or(0)
            + STOP_PAD_MS;
        self.playing = !self.schedule.is_empty();
    }

    /// Load the song's preset and play it through once.
    pub fn play_song<B: AudioBackend>(&mut self, synth: &mut Synth<B>, song: &Song, now_ms: f64) {
        self.stop(synth);
        if song.notes.is_empty() {
            log::warn!("song has no notes; not starting playback");
            return;
        }
        match patch::builtin(&song.preset) {
            Some(preset) => synth.load_patch(&preset),
            None => log::debug!("song names unknown preset {:?}", song.preset),
        }
        self.play(&song.notes, None, now_ms);
    }

    /// Load the demo's preset and start its pattern, looping if the demo
    /// loops.
    pub fn play_demo<B: AudioBackend>(&mut self, synth: &mut Synth<B>, demo: &Demo, now_ms: f64) {
        self.stop(synth);
        if let Some(preset) = patch::builtin(demo.preset) {
            synth.load_patch(&preset);
        }
        self.play(demo.pattern, demo.loop_length_ms, now_ms);
    }

    /// Dispatch every event due at `now_ms`. Call this from the host's
    /// event loop; it returns immediately.
    pub fn tick<B: AudioBackend>(&mut self, synth: &mut Synth<B>, now_ms: f64) {
        if !self.playing {
            return;
        }
        let elapsed = now_ms - self.origin_ms;
        if elapsed < 0.0 {
            return;
        }

        while self.cursor < self.schedule.len()
            && f64::from(self.schedule[self.cursor].at_ms) <= elapsed
        {
            match self.schedule[self.cursor].action {
                Action::NoteOn(note) => synth.note_on(note, 1.0),
                Action::NoteOff(note) => synth.note_off(note),
            }
            self.cursor += 1;
        }

        if self.cursor == self.schedule.len() {
            match self.loop_length_ms {
                Some(length) if length > 0 => {
                    if elapsed >= f64::from(length) {
                        // Rebase the origin so the pattern stays on grid.
                        self.origin_ms += f64::from(length);
                        self.cursor = 0;
                    }
                }
                _ => {
                    if elapsed >= f64::from(self.end_ms) {
                        self.stop(synth);
                    }
                }
            }
        }
    }

    /// Cancel all pending events and force-release every active voice.
    pub fn stop<B: AudioBackend>(&mut self, synth: &mut Synth<B>) {
        self.schedule.clear();
        self.cursor = 0;
        self.playing = false;
        self.loop_length_ms = None;
        synth.release_all();
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineGraph;
    use crate::synth::SynthParams;

    fn synth() -> Synth<OfflineGraph> {
        Synth::new(OfflineGraph::new(), SynthParams::default())
    }

    fn two_notes() -> Vec<SongEvent> {
        vec![
            SongEvent {
                note: 60,
                time_ms: 0,
                duration_ms: 100,
            },
            SongEvent {
                note: 64,
                time_ms: 100,
                duration_ms: 100,
            },
        ]
    }

    #[test]
    fn dispatches_events_in_time_order() {
        let mut synth = synth();
        let mut player = Player::new();
        player.play(&two_notes(), None, 0.0);

        player.tick(&mut synth, 0.0);
        assert_eq!(synth.active_notes(), vec![60]);

        // At 100 ms the C4 off dispatches before the E4 on.
        player.tick(&mut synth, 100.0);
        assert_eq!(synth.active_notes(), vec![64]);

        player.tick(&mut synth, 200.0);
        assert!(synth.active_notes().is_empty());
    }

    #[test]
    fn same_note_retriggers_back_to_back() {
        let notes = vec![
            SongEvent {
                note: 60,
                time_ms: 0,
                duration_ms: 100,
            },
            SongEvent {
                note: 60,
                time_ms: 100,
                duration_ms: 100,
            },
        ];
        let mut synth = synth();
        let mut player = Player::new();
        player.play(&notes, None, 0.0);

        player.tick(&mut synth, 0.0);
        let first_voices = synth.backend().node_count();
        player.tick(&mut synth, 100.0);
        // The off dispatched first, so the second on built a fresh voice.
        assert_eq!(synth.active_notes(), vec![60]);
        assert!(synth.backend().node_count() > first_voices);
    }

    #[test]
    fn auto_stops_after_the_tail_pad() {
        let mut synth = synth();
        let mut player = Player::new();
        player.play(&two_notes(), None, 0.0);

        player.tick(&mut synth, 150.0);
        assert!(player.is_playing());
        player.tick(&mut synth, 701.0);
        assert!(!player.is_playing());
    }

    #[test]
    fn looping_rebases_the_origin() {
        let notes = vec![SongEvent {
            note: 60,
            time_ms: 0,
            duration_ms: 100,
        }];
        let mut synth = synth();
        let mut player = Player::new();
        player.play(&notes, Some(400), 0.0);

        player.tick(&mut synth, 150.0);
        assert!(synth.active_notes().is_empty());

        // Second pass through the loop retriggers the note.
        player.tick(&mut synth, 400.0);
        player.tick(&mut synth, 401.0);
        assert_eq!(synth.active_notes(), vec![60]);
        assert!(player.is_playing());
    }

    #[test]
    fn stop_cancels_pending_and_releases_voices() {
        let mut synth = synth();
        let mut player = Player::new();
        player.play(&two_notes(), Some(1000), 0.0);
        player.tick(&mut synth, 0.0);
        assert_eq!(synth.voice_count(), 1);

        player.stop(&mut synth);
        assert!(!player.is_playing());
        assert_eq!(synth.voice_count(), 0);

        // Nothing left to dispatch.
        player.tick(&mut synth, 2000.0);
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn empty_song_does_not_start() {
        let mut synth = synth();
        let mut player = Player::new();
        let song = Song {
            preset: "bass".to_string(),
            notes: Vec::new(),
        };
        player.play_song(&mut synth, &song, 0.0);
        assert!(!player.is_playing());
    }

    #[test]
    fn play_song_loads_the_named_preset() {
        let mut synth = synth();
        let mut player = Player::new();
        let song = Song::parse("# preset: bass\n0:E2:100\n");
        player.play_song(&mut synth, &song, 0.0);

        assert!(player.is_playing());
        // The bass preset drops the cutoff to 400 Hz.
        assert_eq!(synth.params().filter.cutoff, 400.0);
    }
}
