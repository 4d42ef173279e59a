// Voice construction, parameter propagation, and LFO routing.
// This layer sits above the audio backend and manages all sounding voices.

pub mod engine;
pub mod message;
pub mod params;
mod propagate;
pub mod voice;

pub use engine::Synth;
pub use message::{MessageReceiver, SynthMessage};
pub use params::{
    EffectsSpec, EnvelopeSpec, FilterSpec, LfoDestination, LfoSpec, MasterSpec, MixerLevels,
    OscillatorSpec, Param, SynthParams,
};
pub use voice::{Voice, VoiceTable};
