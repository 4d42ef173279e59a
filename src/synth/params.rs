use serde::{Deserialize, Serialize};

use crate::audio::Waveform;

/// Where an LFO's output is routed on every voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LfoDestination {
    Pitch,
    Filter,
    Amp,
}

/// One VCO slot's settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorSpec {
    pub wave: Waveform,
    /// Octave shift, -4..=4.
    pub octave: i32,
    /// Fine tune in cents, -100..=100.
    pub detune: f32,
    /// Pulse width, 0..=100. Stored but not yet used by rendering.
    pub pulse_width: f32,
}

/// Per-source mix levels, 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixerLevels {
    pub vco: [f32; 3],
    pub noise: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// Base cutoff in Hz, 20..=20000.
    pub cutoff: f32,
    /// Resonance knob, 0..=100. Divided by 5 for the filter's Q.
    pub resonance: f32,
    /// Envelope amount in percent of the tracked cutoff, -100..=100.
    pub env_amount: f32,
    /// Keyboard tracking in percent: 0 = none, 100 = octave per octave.
    pub kbd_track: f32,
}

/// AD+S+R envelope shape. Times in milliseconds, sustain in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSpec {
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub sustain_pct: f32,
    pub release_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoSpec {
    pub wave: Waveform,
    pub rate_hz: f32,
    /// Modulation depth knob, 0..=100. Scaling per destination happens at
    /// voice-creation time.
    pub amount: f32,
    pub dest: LfoDestination,
}

/// Effects sends. Times in ms, mixes and feedback in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectsSpec {
    pub delay_time_ms: f32,
    pub delay_feedback_pct: f32,
    pub delay_mix_pct: f32,
    pub reverb_mix_pct: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterSpec {
    /// Output volume, 0.0..=1.0.
    pub volume: f32,
    /// Portamento time in milliseconds. 0 disables glide.
    pub glide_ms: f32,
}

/// The full set of synthesis parameters.
///
/// One instance applies globally to all voices. Voices read it at creation
/// time; live edits reach already-sounding voices through the propagation
/// pass, never by rebuilding voices.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthParams {
    pub vco: [OscillatorSpec; 3],
    pub mixer: MixerLevels,
    pub filter: FilterSpec,
    pub filter_env: EnvelopeSpec,
    pub amp_env: EnvelopeSpec,
    pub lfo: [LfoSpec; 2],
    pub effects: EffectsSpec,
    pub master: MasterSpec,
    /// UI keyboard transposition in octaves, -2..=2. Independent of the
    /// per-oscillator octave shift.
    pub keyboard_octave: i32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            vco: [
                OscillatorSpec {
                    wave: Waveform::Sawtooth,
                    octave: 0,
                    detune: 0.0,
                    pulse_width: 50.0,
                },
                OscillatorSpec {
                    wave: Waveform::Sawtooth,
                    octave: 0,
                    detune: 5.0,
                    pulse_width: 50.0,
                },
                OscillatorSpec {
                    wave: Waveform::Square,
                    octave: -1,
                    detune: 0.0,
                    pulse_width: 50.0,
                },
            ],
            mixer: MixerLevels {
                vco: [0.8, 0.6, 0.4],
                noise: 0.0,
            },
            filter: FilterSpec {
                cutoff: 2000.0,
                resonance: 30.0,
                env_amount: 50.0,
                kbd_track: 50.0,
            },
            filter_env: EnvelopeSpec {
                attack_ms: 10.0,
                decay_ms: 300.0,
                sustain_pct: 30.0,
                release_ms: 500.0,
            },
            amp_env: EnvelopeSpec {
                attack_ms: 10.0,
                decay_ms: 200.0,
                sustain_pct: 70.0,
                release_ms: 300.0,
            },
            lfo: [
                LfoSpec {
                    wave: Waveform::Triangle,
                    rate_hz: 5.0,
                    amount: 0.0,
                    dest: LfoDestination::Pitch,
                },
                LfoSpec {
                    wave: Waveform::Sine,
                    rate_hz: 1.0,
                    amount: 0.0,
                    dest: LfoDestination::Filter,
                },
            ],
            effects: EffectsSpec {
                delay_time_ms: 300.0,
                delay_feedback_pct: 30.0,
                delay_mix_pct: 0.0,
                reverb_mix_pct: 15.0,
            },
            master: MasterSpec {
                volume: 0.7,
                glide_ms: 0.0,
            },
            keyboard_octave: 0,
        }
    }
}

/// A typed parameter-change event.
///
/// This is the closed set of knob edits the synth accepts. Values arrive in
/// knob units (percent knobs 0-100, times in ms) and are rescaled where they
/// are applied. Construct directly or parse from a knob name with
/// [`Param::from_knob`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param {
    /// VCO octave shift; the index selects the VCO slot (0-2).
    VcoOctave(usize, i32),
    VcoDetune(usize, f32),
    VcoPulseWidth(usize, f32),
    /// Mixer level knob, 0-100.
    MixLevel(usize, f32),
    NoiseLevel(f32),
    Cutoff(f32),
    Resonance(f32),
    FilterEnvAmount(f32),
    FilterKbdTrack(f32),
    FilterAttack(f32),
    FilterDecay(f32),
    FilterSustain(f32),
    FilterRelease(f32),
    AmpAttack(f32),
    AmpDecay(f32),
    AmpSustain(f32),
    AmpRelease(f32),
    /// LFO rate in Hz; the index selects the LFO slot (0-1).
    LfoRate(usize, f32),
    LfoAmount(usize, f32),
    DelayTime(f32),
    DelayFeedback(f32),
    DelayMix(f32),
    ReverbMix(f32),
    Glide(f32),
    MasterVolume(f32),
}

impl Param {
    /// Map an external knob-change event to a typed parameter.
    ///
    /// Unknown names return `None`; callers treat that as a no-op.
    pub fn from_knob(name: &str, value: f32) -> Option<Param> {
        let param = match name {
            "vco1-octave" => Param::VcoOctave(0, value as i32),
            "vco2-octave" => Param::VcoOctave(1, value as i32),
            "vco3-octave" => Param::VcoOctave(2, value as i32),
            "vco1-detune" => Param::VcoDetune(0, value),
            "vco2-detune" => Param::VcoDetune(1, value),
            "vco3-detune" => Param::VcoDetune(2, value),
            "vco1-pw" => Param::VcoPulseWidth(0, value),
            "vco2-pw" => Param::VcoPulseWidth(1, value),
            "vco3-pw" => Param::VcoPulseWidth(2, value),
            "mix1" => Param::MixLevel(0, value),
            "mix2" => Param::MixLevel(1, value),
            "mix3" => Param::MixLevel(2, value),
            "noise" => Param::NoiseLevel(value),
            "cutoff" => Param::Cutoff(value),
            "resonance" => Param::Resonance(value),
            "filter-env" => Param::FilterEnvAmount(value),
            "filter-kbd" => Param::FilterKbdTrack(value),
            "f-attack" => Param::FilterAttack(value),
            "f-decay" => Param::FilterDecay(value),
            "f-sustain" => Param::FilterSustain(value),
            "f-release" => Param::FilterRelease(value),
            "a-attack" => Param::AmpAttack(value),
            "a-decay" => Param::AmpDecay(value),
            "a-sustain" => Param::AmpSustain(value),
            "a-release" => Param::AmpRelease(value),
            "lfo1-rate" => Param::LfoRate(0, value),
            "lfo2-rate" => Param::LfoRate(1, value),
            "lfo1-amount" => Param::LfoAmount(0, value),
            "lfo2-amount" => Param::LfoAmount(1, value),
            "delay-time" => Param::DelayTime(value),
            "delay-feedback" => Param::DelayFeedback(value),
            "delay-mix" => Param::DelayMix(value),
            "reverb-mix" => Param::ReverbMix(value),
            "glide" => Param::Glide(value),
            "master-vol" => Param::MasterVolume(value),
            _ => return None,
        };
        Some(param)
    }
}
