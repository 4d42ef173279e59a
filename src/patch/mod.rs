use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::{AudioBackend, Waveform};
use crate::synth::{LfoDestination, Param, Synth};

/*
Patches
=======

A patch is a named bundle of panel settings: oscillators, mixer, filter,
envelopes, LFOs, effects and glide. Every section is optional so a patch
can describe a partial tweak; loading one applies exactly the fields it
carries and leaves the rest of the panel alone.

The JSON shape mirrors the panel sections. Knob-domain values are stored
as the knobs show them (mix levels 0-100, envelope times in ms, sustain
in percent) and rescaled where they are applied.
*/

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("malformed patch: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscPatch {
    pub wave: Waveform,
    pub octave: i32,
    pub detune: f32,
}

/// Mixer levels in knob units, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixerPatch {
    pub vco1: f32,
    pub vco2: f32,
    pub vco3: f32,
    pub noise: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    pub cutoff: f32,
    pub resonance: f32,
    pub env_amount: f32,
    pub kbd_track: f32,
}

/// Envelope times in ms, sustain in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePatch {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LfoPatch {
    pub wave: Waveform,
    pub rate: f32,
    pub amount: f32,
    pub dest: LfoDestination,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectsPatch {
    pub delay_time: f32,
    pub delay_feedback: f32,
    pub delay_mix: f32,
    pub reverb_mix: f32,
}

/// A complete or partial panel snapshot. Absent sections are left
/// untouched when the patch is loaded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Patch {
    pub vco1: Option<OscPatch>,
    pub vco2: Option<OscPatch>,
    pub vco3: Option<OscPatch>,
    pub mixer: Option<MixerPatch>,
    pub filter: Option<FilterPatch>,
    pub filter_env: Option<EnvelopePatch>,
    pub amp_env: Option<EnvelopePatch>,
    pub lfo1: Option<LfoPatch>,
    pub lfo2: Option<LfoPatch>,
    pub effects: Option<EffectsPatch>,
    /// Portamento time in ms.
    pub glide: Option<f32>,
}

impl Patch {
    pub fn from_json(json: &str) -> Result<Patch, PatchError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PatchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<B: AudioBackend> Synth<B> {
    /// Apply every field a patch carries. Absent sections keep their
    /// current settings; edits reach active voices through the normal
    /// propagation passes.
    pub fn load_patch(&mut self, patch: &Patch) {
        let vcos = [patch.vco1, patch.vco2, patch.vco3];
        for (slot, vco) in vcos.iter().enumerate() {
            let Some(vco) = vco else { continue };
            self.set_vco_waveform(slot, vco.wave);
            self.apply(Param::VcoOctave(slot, vco.octave));
            self.apply(Param::VcoDetune(slot, vco.detune));
        }
        if let Some(mixer) = patch.mixer {
            self.apply(Param::MixLevel(0, mixer.vco1));
            self.apply(Param::MixLevel(1, mixer.vco2));
            self.apply(Param::MixLevel(2, mixer.vco3));
            self.apply(Param::NoiseLevel(mixer.noise));
        }
        if let Some(filter) = patch.filter {
            self.apply(Param::Cutoff(filter.cutoff));
            self.apply(Param::Resonance(filter.resonance));
            self.apply(Param::FilterEnvAmount(filter.env_amount));
            self.apply(Param::FilterKbdTrack(filter.kbd_track));
        }
        if let Some(env) = patch.filter_env {
            self.apply(Param::FilterAttack(env.attack));
            self.apply(Param::FilterDecay(env.decay));
            self.apply(Param::FilterSustain(env.sustain));
            self.apply(Param::FilterRelease(env.release));
        }
        if let Some(env) = patch.amp_env {
            self.apply(Param::AmpAttack(env.attack));
            self.apply(Param::AmpDecay(env.decay));
            self.apply(Param::AmpSustain(env.sustain));
            self.apply(Param::AmpRelease(env.release));
        }
        let lfos = [patch.lfo1, patch.lfo2];
        for (slot, lfo) in lfos.iter().enumerate() {
            let Some(lfo) = lfo else { continue };
            self.set_lfo_waveform(slot, lfo.wave);
            self.apply(Param::LfoRate(slot, lfo.rate));
            self.apply(Param::LfoAmount(slot, lfo.amount));
            self.set_lfo_destination(slot, lfo.dest);
        }
        if let Some(fx) = patch.effects {
            self.apply(Param::DelayTime(fx.delay_time));
            self.apply(Param::DelayFeedback(fx.delay_feedback));
            self.apply(Param::DelayMix(fx.delay_mix));
            self.apply(Param::ReverbMix(fx.reverb_mix));
        }
        if let Some(glide) = patch.glide {
            self.apply(Param::Glide(glide));
        }
    }
}

const fn osc(wave: Waveform, octave: i32, detune: f32) -> Option<OscPatch> {
    Some(OscPatch {
        wave,
        octave,
        detune,
    })
}

const fn mixer(vco1: f32, vco2: f32, vco3: f32, noise: f32) -> Option<MixerPatch> {
    Some(MixerPatch {
        vco1,
        vco2,
        vco3,
        noise,
    })
}

const fn filter(cutoff: f32, resonance: f32, env_amount: f32, kbd_track: f32) -> Option<FilterPatch> {
    Some(FilterPatch {
        cutoff,
        resonance,
        env_amount,
        kbd_track,
    })
}

const fn env(attack: f32, decay: f32, sustain: f32, release: f32) -> Option<EnvelopePatch> {
    Some(EnvelopePatch {
        attack,
        decay,
        sustain,
        release,
    })
}

const fn fx(delay_time: f32, delay_feedback: f32, delay_mix: f32, reverb_mix: f32) -> Option<EffectsPatch> {
    Some(EffectsPatch {
        delay_time,
        delay_feedback,
        delay_mix,
        reverb_mix,
    })
}

/// Look up a factory preset by name. Factory presets set every panel
/// section except the LFOs, which keep their current settings.
pub fn builtin(name: &str) -> Option<Patch> {
    use Waveform::{Sawtooth, Sine, Square, Triangle};

    let patch = match name {
        "init" => Patch {
            vco1: osc(Sawtooth, 0, 0.0),
            vco2: osc(Sawtooth, 0, 5.0),
            vco3: osc(Square, -1, 0.0),
            mixer: mixer(80.0, 60.0, 40.0, 0.0),
            filter: filter(2000.0, 30.0, 50.0, 50.0),
            filter_env: env(10.0, 300.0, 30.0, 500.0),
            amp_env: env(10.0, 200.0, 70.0, 300.0),
            effects: fx(300.0, 30.0, 0.0, 15.0),
            glide: Some(0.0),
            ..Patch::default()
        },
        "bass" => Patch {
            vco1: osc(Sawtooth, -1, 0.0),
            vco2: osc(Square, -1, 7.0),
            vco3: osc(Sine, -2, 0.0),
            mixer: mixer(100.0, 70.0, 60.0, 0.0),
            filter: filter(400.0, 40.0, 70.0, 30.0),
            filter_env: env(5.0, 200.0, 20.0, 200.0),
            amp_env: env(5.0, 100.0, 80.0, 150.0),
            effects: fx(300.0, 20.0, 0.0, 5.0),
            glide: Some(50.0),
            ..Patch::default()
        },
        "lead" => Patch {
            vco1: osc(Sawtooth, 0, 0.0),
            vco2: osc(Sawtooth, 0, 10.0),
            vco3: osc(Square, 1, 0.0),
            mixer: mixer(100.0, 80.0, 30.0, 0.0),
            filter: filter(3000.0, 50.0, 60.0, 70.0),
            filter_env: env(10.0, 400.0, 40.0, 400.0),
            amp_env: env(10.0, 200.0, 80.0, 300.0),
            effects: fx(350.0, 40.0, 25.0, 20.0),
            glide: Some(30.0),
            ..Patch::default()
        },
        "pad" => Patch {
            vco1: osc(Sawtooth, 0, -5.0),
            vco2: osc(Sawtooth, 0, 5.0),
            vco3: osc(Triangle, -1, 0.0),
            mixer: mixer(70.0, 70.0, 50.0, 5.0),
            filter: filter(1500.0, 20.0, 30.0, 40.0),
            filter_env: env(500.0, 1000.0, 60.0, 2000.0),
            amp_env: env(800.0, 500.0, 70.0, 1500.0),
            effects: fx(400.0, 50.0, 30.0, 50.0),
            glide: Some(100.0),
            ..Patch::default()
        },
        "brass" => Patch {
            vco1: osc(Sawtooth, 0, 0.0),
            vco2: osc(Sawtooth, 0, 3.0),
            vco3: osc(Square, 0, -3.0),
            mixer: mixer(80.0, 80.0, 60.0, 0.0),
            filter: filter(800.0, 30.0, 80.0, 60.0),
            filter_env: env(50.0, 300.0, 50.0, 300.0),
            amp_env: env(30.0, 100.0, 85.0, 200.0),
            effects: fx(300.0, 20.0, 10.0, 25.0),
            glide: Some(0.0),
            ..Patch::default()
        },
        "strings" => Patch {
            vco1: osc(Sawtooth, 0, -8.0),
            vco2: osc(Sawtooth, 0, 8.0),
            vco3: osc(Sawtooth, -1, 0.0),
            mixer: mixer(60.0, 60.0, 40.0, 3.0),
            filter: filter(2500.0, 15.0, 20.0, 50.0),
            filter_env: env(300.0, 500.0, 70.0, 1000.0),
            amp_env: env(400.0, 300.0, 75.0, 800.0),
            effects: fx(300.0, 30.0, 15.0, 40.0),
            glide: Some(50.0),
            ..Patch::default()
        },
        "weird" => Patch {
            vco1: osc(Square, 0, -50.0),
            vco2: osc(Sawtooth, 1, 50.0),
            vco3: osc(Triangle, -2, 25.0),
            mixer: mixer(80.0, 60.0, 100.0, 20.0),
            filter: filter(5000.0, 80.0, 90.0, 100.0),
            filter_env: env(100.0, 800.0, 10.0, 2000.0),
            amp_env: env(50.0, 400.0, 50.0, 1000.0),
            effects: fx(666.0, 70.0, 50.0, 60.0),
            glide: Some(200.0),
            ..Patch::default()
        },
        _ => return None,
    };
    Some(patch)
}

/// Names of all factory presets, in panel order.
pub const BUILTIN_NAMES: [&str; 7] = [
    "init", "bass", "lead", "pad", "brass", "strings", "weird",
];
