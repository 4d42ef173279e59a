#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::audio::AudioBackend;
use crate::synth::engine::Synth;
use crate::synth::params::Param;

/// Control events a UI or sequencer thread feeds into the engine.
#[derive(Debug, Copy, Clone)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    Param(Param),
    AllNotesOff,
}

/// Source of control events. The engine is single-threaded; this seam is
/// how another thread hands events across without sharing the engine.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

impl<B: AudioBackend> Synth<B> {
    /// Drain and dispatch every pending control event.
    pub fn drain_messages(&mut self, rx: &mut impl MessageReceiver) {
        while let Some(msg) = rx.pop() {
            match msg {
                SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
                SynthMessage::NoteOff { note } => self.note_off(note),
                SynthMessage::Param(param) => self.apply(param),
                SynthMessage::AllNotesOff => self.release_all(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineGraph;
    use crate::synth::params::SynthParams;

    struct VecReceiver(Vec<SynthMessage>);

    impl MessageReceiver for VecReceiver {
        fn pop(&mut self) -> Option<SynthMessage> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }
    }

    #[test]
    fn messages_drive_the_engine() {
        let mut synth = Synth::new(OfflineGraph::new(), SynthParams::default());
        let mut rx = VecReceiver(vec![
            SynthMessage::NoteOn {
                note: 60,
                velocity: 1.0,
            },
            SynthMessage::NoteOn {
                note: 64,
                velocity: 0.8,
            },
            SynthMessage::Param(Param::Cutoff(800.0)),
            SynthMessage::NoteOff { note: 60 },
        ]);
        synth.drain_messages(&mut rx);

        assert_eq!(synth.active_notes(), vec![64]);
        assert_eq!(synth.params().filter.cutoff, 800.0);

        let mut rx = VecReceiver(vec![SynthMessage::AllNotesOff]);
        synth.drain_messages(&mut rx);
        assert_eq!(synth.voice_count(), 0);
    }
}
