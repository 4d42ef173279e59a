use crate::audio::{AudioBackend, PortId, Waveform};
use crate::synth::engine::Synth;
use crate::synth::params::{LfoDestination, Param};
use crate::{notes, FILTER_CEIL_HZ, FILTER_FLOOR_HZ, MIX_HEADROOM};

// Smoothing time constants for retuning live voices. Short exponential
// approaches instead of jumps, so dragging a knob never clicks.
const RETUNE_TC: f64 = 0.01;
const FILTER_TC: f64 = 0.02;
const SUSTAIN_TC: f64 = 0.03;

/*
Real-Time Parameter Propagation
===============================

A parameter edit mutates the shared store, then reaches every sounding
voice in one pass. No voice opts out and no note retriggers:

  update_active_voices      pitch, mixer and filter knob edits
  update_active_envelopes   sustain/decay edits while keys are held
  update_active_waveforms   waveform switches (discrete, no smoothing)

`apply` is the single source of truth for which edits need which pass.
Knobs with a live non-voice target (master volume, LFO rate and depth,
effects sends) adjust their shared node directly instead.
*/

impl<B: AudioBackend> Synth<B> {
    /// Retune every active voice to the current oscillator, mixer and
    /// filter settings, smoothly and without retriggering.
    pub fn update_active_voices(&mut self) {
        let params = self.params.clone();
        for (note, voice) in self.voices.iter() {
            let base_freq = notes::note_to_frequency(note);
            for i in 0..3 {
                let vco = params.vco[i];
                let osc_freq =
                    base_freq * 2.0_f32.powi(vco.octave) * 2.0_f32.powf(vco.detune / 1200.0);
                self.backend
                    .smooth_to(voice.oscs[i], PortId::Frequency, osc_freq, RETUNE_TC);
                self.backend.smooth_to(
                    voice.mix_gains[i],
                    PortId::Gain,
                    params.mixer.vco[i] * MIX_HEADROOM,
                    RETUNE_TC,
                );
            }

            // Live cutoff edits track the knob directly; keyboard tracking
            // only shapes the value computed at note-on.
            self.backend
                .smooth_to(voice.filter, PortId::Cutoff, params.filter.cutoff, FILTER_TC);
            self.backend.smooth_to(
                voice.filter,
                PortId::Resonance,
                params.filter.resonance / 5.0,
                FILTER_TC,
            );
        }
    }

    /// Re-aim the sustain phase of both envelopes on every active voice.
    ///
    /// Used when sustain or decay is edited while notes are held: pending
    /// ramps are cancelled and the voice eases toward the new sustain level
    /// without restarting attack or decay.
    pub fn update_active_envelopes(&mut self) {
        let params = self.params.clone();
        let now = self.backend.now();

        let amp_sustain = params.amp_env.sustain_pct / 100.0;
        let env_amount = (params.filter.env_amount / 100.0) * params.filter.cutoff;
        let env_start = (params.filter.cutoff - env_amount).max(FILTER_FLOOR_HZ);
        let env_peak = (params.filter.cutoff + env_amount * 0.5).min(FILTER_CEIL_HZ);
        let filter_sustain =
            env_start + (env_peak - env_start) * (params.filter_env.sustain_pct / 100.0);

        for (_, voice) in self.voices.iter() {
            self.backend.cancel_scheduled(voice.vca, PortId::Gain, now);
            self.backend
                .smooth_to(voice.vca, PortId::Gain, amp_sustain, SUSTAIN_TC);

            self.backend
                .cancel_scheduled(voice.filter, PortId::Cutoff, now);
            self.backend.smooth_to(
                voice.filter,
                PortId::Cutoff,
                filter_sustain.max(FILTER_FLOOR_HZ),
                SUSTAIN_TC,
            );
        }
    }

    /// Switch oscillator waveforms on every active voice. Discrete timbral
    /// change; applies instantly.
    pub fn update_active_waveforms(&mut self) {
        let waves = [
            self.params.vco[0].wave,
            self.params.vco[1].wave,
            self.params.vco[2].wave,
        ];
        for (_, voice) in self.voices.iter() {
            for i in 0..3 {
                self.backend.set_waveform(voice.oscs[i], waves[i]);
            }
        }
    }

    /// Apply one typed parameter edit: mutate the store, propagate to
    /// active voices where needed, and adjust shared nodes directly for
    /// knobs with a live non-voice target.
    pub fn apply(&mut self, param: Param) {
        match param {
            Param::VcoOctave(slot, octave) => {
                let Some(vco) = self.params.vco.get_mut(slot) else {
                    return;
                };
                vco.octave = octave;
                self.update_active_voices();
            }
            Param::VcoDetune(slot, cents) => {
                let Some(vco) = self.params.vco.get_mut(slot) else {
                    return;
                };
                vco.detune = cents;
                self.update_active_voices();
            }
            Param::VcoPulseWidth(slot, pw) => {
                // Stored only; rendering does not consume pulse width yet,
                // so no propagation pass is needed.
                if let Some(vco) = self.params.vco.get_mut(slot) {
                    vco.pulse_width = pw;
                }
            }
            Param::MixLevel(slot, level) => {
                let Some(mix) = self.params.mixer.vco.get_mut(slot) else {
                    return;
                };
                *mix = level / 100.0;
                self.update_active_voices();
            }
            Param::NoiseLevel(level) => {
                self.params.mixer.noise = level / 100.0;
                self.backend.set(
                    self.noise_gain,
                    PortId::Gain,
                    self.params.mixer.noise * MIX_HEADROOM,
                );
            }
            Param::Cutoff(hz) => {
                self.params.filter.cutoff = hz;
                self.update_active_voices();
            }
            Param::Resonance(amount) => {
                self.params.filter.resonance = amount;
                self.update_active_voices();
            }
            Param::FilterEnvAmount(pct) => self.params.filter.env_amount = pct,
            Param::FilterKbdTrack(pct) => self.params.filter.kbd_track = pct,
            Param::FilterAttack(ms) => self.params.filter_env.attack_ms = ms,
            Param::FilterDecay(ms) => {
                self.params.filter_env.decay_ms = ms;
                self.update_active_envelopes();
            }
            Param::FilterSustain(pct) => {
                self.params.filter_env.sustain_pct = pct;
                self.update_active_envelopes();
            }
            Param::FilterRelease(ms) => self.params.filter_env.release_ms = ms,
            Param::AmpAttack(ms) => self.params.amp_env.attack_ms = ms,
            Param::AmpDecay(ms) => {
                self.params.amp_env.decay_ms = ms;
                self.update_active_envelopes();
            }
            Param::AmpSustain(pct) => {
                self.params.amp_env.sustain_pct = pct;
                self.update_active_envelopes();
            }
            Param::AmpRelease(ms) => self.params.amp_env.release_ms = ms,
            Param::LfoRate(slot, hz) => {
                let Some(lfo) = self.params.lfo.get_mut(slot) else {
                    return;
                };
                lfo.rate_hz = hz;
                self.backend
                    .set(self.lfos[slot].osc, PortId::Frequency, hz);
            }
            Param::LfoAmount(slot, amount) => {
                let Some(lfo) = self.params.lfo.get_mut(slot) else {
                    return;
                };
                lfo.amount = amount;
                self.backend.set(self.lfos[slot].gain, PortId::Gain, amount);
            }
            Param::DelayTime(ms) => {
                self.params.effects.delay_time_ms = ms;
                self.backend.set(self.delay, PortId::DelayTime, ms / 1000.0);
            }
            Param::DelayFeedback(pct) => {
                self.params.effects.delay_feedback_pct = pct;
                self.backend
                    .set(self.delay_feedback, PortId::Gain, pct / 100.0);
            }
            Param::DelayMix(pct) => {
                self.params.effects.delay_mix_pct = pct;
                self.backend.set(self.delay_mix, PortId::Gain, pct / 100.0);
            }
            Param::ReverbMix(pct) => {
                self.params.effects.reverb_mix_pct = pct;
                self.backend.set(self.reverb_mix, PortId::Gain, pct / 100.0);
            }
            Param::Glide(ms) => self.params.master.glide_ms = ms,
            Param::MasterVolume(pct) => {
                self.params.master.volume = pct / 100.0;
                self.backend
                    .set(self.master_gain, PortId::Gain, pct / 100.0);
            }
        }
    }

    /// String-named knob surface: parse and apply, ignoring unknown names.
    pub fn apply_knob(&mut self, name: &str, value: f32) {
        match Param::from_knob(name, value) {
            Some(param) => self.apply(param),
            None => log::debug!("ignoring unknown knob {name:?}"),
        }
    }

    /// Switch a VCO's waveform and push it to all active voices.
    pub fn set_vco_waveform(&mut self, slot: usize, wave: Waveform) {
        let Some(vco) = self.params.vco.get_mut(slot) else {
            return;
        };
        vco.wave = wave;
        self.update_active_waveforms();
    }

    /// Switch an LFO's waveform on the shared LFO oscillator.
    pub fn set_lfo_waveform(&mut self, slot: usize, wave: Waveform) {
        let Some(lfo) = self.params.lfo.get_mut(slot) else {
            return;
        };
        lfo.wave = wave;
        self.backend.set_waveform(self.lfos[slot].osc, wave);
    }

    /// Change an LFO's routing for voices created from now on. Voices
    /// already sounding keep the taps they were built with.
    pub fn set_lfo_destination(&mut self, slot: usize, dest: LfoDestination) {
        if let Some(lfo) = self.params.lfo.get_mut(slot) {
            lfo.dest = dest;
        }
    }

    /// Set the UI keyboard transposition, clamped to +/-2 octaves.
    pub fn set_keyboard_octave(&mut self, octaves: i32) {
        self.params.keyboard_octave = octaves.clamp(-2, 2);
    }
}
