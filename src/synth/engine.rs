use crate::audio::{AudioBackend, NodeId, PortId};
use crate::synth::params::{LfoDestination, SynthParams};
use crate::synth::voice::{Voice, VoiceTable};
use crate::{notes, FILTER_CEIL_HZ, FILTER_FLOOR_HZ, KBD_TRACK_REF_HZ, MIX_HEADROOM};

/*
Voice Engine
============

One `Synth` owns the whole instrument: the shared processing chain built
once at construction, the parameter store, and the table of sounding
voices.

Shared chain (built once):

  voice VCAs ──> master ──┬──────────────> dry ──┬────────> output
                          └─> delay <─feedback   ├─> reverb ─> wet ─> output
                                └─> delay wet ───┘

  noise ─> noise gain ─> (every voice's filter)
  lfo osc ─> lfo depth gain ─> (per-voice taps, wired at note-on)

Per-note voice (built on note-on):

  3 x oscillator ─> mix gain ─> lowpass filter ─> VCA ─> master

Timing model: nothing here blocks. Envelopes, glide and release tails are
scheduled value changes on the backend's clock; note-on and note-off issue
their schedules and return. The release tail keeps sounding after the
voice leaves the table, and the oscillators are stopped on the backend
clock once the slower release ramp has finished plus a jitter pad.

Envelope shape at note-on, both anchored at the creation instant:

  filter cutoff: hold `start`, ramp to `peak` over attack, ramp to
  `sustain` over decay, where the breakpoints derive from the
  keyboard-tracked cutoff and the envelope amount (see `create_voice`).
  The peak only gets half the amount; the floor gets all of it, which
  gives the filter envelope punch without pushing the peak into
  self-oscillation territory.

  VCA gain: 0, ramp to velocity over attack, ramp to velocity-scaled
  sustain over decay.
*/

/// Pad added after the slower release ramp before oscillators stop, in
/// seconds. Absorbs scheduling jitter so the tail always finishes rendering.
const STOP_PAD: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub(crate) struct LfoNodes {
    pub osc: NodeId,
    pub gain: NodeId,
}

/// The synthesizer core: shared graph, parameter store, active voices.
pub struct Synth<B: AudioBackend> {
    pub(crate) backend: B,
    pub(crate) params: SynthParams,
    pub(crate) voices: VoiceTable,
    /// Base frequency of the most recently triggered note, used as the
    /// glide start point for the next one.
    pub(crate) last_frequency: Option<f32>,
    pub(crate) master_gain: NodeId,
    pub(crate) noise_gain: NodeId,
    pub(crate) delay: NodeId,
    pub(crate) delay_feedback: NodeId,
    pub(crate) delay_mix: NodeId,
    pub(crate) reverb_mix: NodeId,
    pub(crate) lfos: [LfoNodes; 2],
}

impl<B: AudioBackend> Synth<B> {
    /// Build the shared processing chain and the two free-running LFOs.
    pub fn new(mut backend: B, params: SynthParams) -> Self {
        let master_gain = backend.create_gain(params.master.volume);

        let delay = backend.create_delay(2.0);
        backend.set(
            delay,
            PortId::DelayTime,
            params.effects.delay_time_ms / 1000.0,
        );
        let delay_feedback = backend.create_gain(params.effects.delay_feedback_pct / 100.0);
        let delay_mix = backend.create_gain(params.effects.delay_mix_pct / 100.0);
        let delay_dry = backend.create_gain(1.0);

        let reverb = backend.create_reverb();
        let reverb_mix = backend.create_gain(params.effects.reverb_mix_pct / 100.0);
        let reverb_dry = backend.create_gain(1.0);

        let noise = backend.create_noise();
        let noise_gain = backend.create_gain(params.mixer.noise * MIX_HEADROOM);
        backend.connect(noise, noise_gain);

        backend.connect(master_gain, delay_dry);
        backend.connect(master_gain, delay);
        backend.connect(delay, delay_feedback);
        backend.connect(delay_feedback, delay);
        backend.connect(delay, delay_mix);

        backend.connect(delay_dry, reverb_dry);
        backend.connect(delay_mix, reverb_dry);
        backend.connect(delay_dry, reverb);
        backend.connect(delay_mix, reverb);
        backend.connect(reverb, reverb_mix);

        backend.connect_to_output(reverb_dry);
        backend.connect_to_output(reverb_mix);

        let lfos = std::array::from_fn(|i| {
            let spec = params.lfo[i];
            let osc = backend.create_oscillator(spec.wave);
            backend.set(osc, PortId::Frequency, spec.rate_hz);
            let gain = backend.create_gain(spec.amount);
            backend.connect(osc, gain);
            backend.start(osc);
            LfoNodes { osc, gain }
        });

        Self {
            backend,
            params,
            voices: VoiceTable::new(),
            last_frequency: None,
            master_gain,
            noise_gain,
            delay,
            delay_feedback,
            delay_mix,
            reverb_mix,
            lfos,
        }
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend access, e.g. for the host to drive the clock.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// True while `note` is held or still releasing under a held key.
    pub fn is_active(&self, note: u8) -> bool {
        self.voices.contains(note)
    }

    pub fn active_notes(&self) -> Vec<u8> {
        self.voices.notes()
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Transpose a key by the UI keyboard octave shift, clamped to the
    /// note range.
    pub fn keyboard_note(&self, note: u8) -> u8 {
        (note as i32 + 12 * self.params.keyboard_octave).clamp(0, 127) as u8
    }

    /// Trigger a note. A note that is already sounding is left alone, so a
    /// held key can never stack a second graph on itself.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if note > 127 || self.voices.contains(note) {
            return;
        }
        let frequency = notes::note_to_frequency(note);
        let voice = self.create_voice(frequency, velocity.clamp(0.0, 1.0));
        self.voices.insert(note, voice);
    }

    /// Release a note. The voice leaves the table immediately; its release
    /// tail and oscillator stop play out on the backend clock. A note with
    /// no active voice is a no-op.
    pub fn note_off(&mut self, note: u8) {
        if let Some(voice) = self.voices.remove(note) {
            self.release_voice(&voice);
        }
    }

    /// Release every active voice, e.g. when sequenced playback stops.
    pub fn release_all(&mut self) {
        for (_, voice) in self.voices.drain() {
            self.release_voice(&voice);
        }
    }

    /// Build one note's signal graph from the current parameter snapshot.
    ///
    /// Later parameter edits reach this voice through the propagation pass,
    /// never by replaying this constructor.
    fn create_voice(&mut self, frequency: f32, velocity: f32) -> Voice {
        let now = self.backend.now();
        let glide_s = f64::from(self.params.master.glide_ms) / 1000.0;

        let mut oscs = [NodeId(0); 3];
        let mut mix_gains = [NodeId(0); 3];
        for i in 0..3 {
            let vco = self.params.vco[i];
            let osc = self.backend.create_oscillator(vco.wave);
            let gain = self
                .backend
                .create_gain(self.params.mixer.vco[i] * MIX_HEADROOM);

            let osc_freq =
                frequency * 2.0_f32.powi(vco.octave) * 2.0_f32.powf(vco.detune / 1200.0);
            match self.last_frequency {
                // Glide starts from the previous note's pitch in this
                // oscillator's octave; detune is not applied to the start.
                Some(last) if self.params.master.glide_ms > 0.0 => {
                    self.backend
                        .set_at(osc, PortId::Frequency, last * 2.0_f32.powi(vco.octave), now);
                    self.backend
                        .ramp_to(osc, PortId::Frequency, osc_freq, now + glide_s);
                }
                _ => self.backend.set(osc, PortId::Frequency, osc_freq),
            }

            self.backend.connect(osc, gain);
            oscs[i] = osc;
            mix_gains[i] = gain;
        }

        // Keyboard tracking scales the cutoff by the note's distance from
        // middle C: kbd_track 0 is no tracking, 100 is octave per octave.
        let track = self.params.filter.kbd_track / 100.0;
        let ratio = frequency / KBD_TRACK_REF_HZ;
        let filter_env_target = (self.params.filter.cutoff * ratio.powf(track)).min(FILTER_CEIL_HZ);

        let filter = self
            .backend
            .create_filter(filter_env_target, self.params.filter.resonance / 5.0);
        let vca = self.backend.create_gain(0.0);

        for gain in mix_gains {
            self.backend.connect(gain, filter);
        }
        self.backend.connect(self.noise_gain, filter);
        self.backend.connect(filter, vca);
        self.backend.connect(vca, self.master_gain);

        // Filter envelope. Full amount below the tracked cutoff, half
        // above it, clamped to the audible band.
        let fenv = self.params.filter_env;
        let env_amount = (self.params.filter.env_amount / 100.0) * filter_env_target;
        let env_start = (filter_env_target - env_amount).max(FILTER_FLOOR_HZ);
        let env_peak = (filter_env_target + env_amount * 0.5).min(FILTER_CEIL_HZ);
        let env_sustain = env_start + (env_peak - env_start) * (fenv.sustain_pct / 100.0);

        self.backend.set_at(filter, PortId::Cutoff, env_start, now);
        self.backend.ramp_to(
            filter,
            PortId::Cutoff,
            env_peak,
            now + f64::from(fenv.attack_ms) / 1000.0,
        );
        self.backend.ramp_to(
            filter,
            PortId::Cutoff,
            env_sustain,
            now + f64::from(fenv.attack_ms + fenv.decay_ms) / 1000.0,
        );

        // Amplitude envelope.
        let aenv = self.params.amp_env;
        let peak_vol = velocity;
        let sustain_vol = peak_vol * (aenv.sustain_pct / 100.0);

        self.backend.set_at(vca, PortId::Gain, 0.0, now);
        self.backend.ramp_to(
            vca,
            PortId::Gain,
            peak_vol,
            now + f64::from(aenv.attack_ms) / 1000.0,
        );
        self.backend.ramp_to(
            vca,
            PortId::Gain,
            sustain_vol,
            now + f64::from(aenv.attack_ms + aenv.decay_ms) / 1000.0,
        );

        // Oscillators start only once wiring and envelope schedules are
        // committed; a partially connected graph would click.
        for osc in oscs {
            self.backend.start(osc);
        }

        let lfo_taps = self.wire_lfo_taps(&oscs, filter, vca);

        self.last_frequency = Some(frequency);

        Voice {
            oscs,
            mix_gains,
            filter,
            vca,
            lfo_taps,
            filter_env_target,
        }
    }

    /// Attach per-voice modulation taps for each LFO with nonzero depth,
    /// routed by the destination configured at this instant. The taps stay
    /// fixed for the voice's lifetime.
    fn wire_lfo_taps(&mut self, oscs: &[NodeId; 3], filter: NodeId, vca: NodeId) -> Vec<NodeId> {
        let mut taps = Vec::new();
        let specs = self.params.lfo;
        for (spec, nodes) in specs.iter().zip(self.lfos) {
            if spec.amount <= 0.0 {
                continue;
            }
            match spec.dest {
                LfoDestination::Pitch => {
                    // Cents of detune per oscillator.
                    for &osc in oscs {
                        let tap = self.backend.create_gain(spec.amount * 2.0);
                        self.backend.connect(nodes.gain, tap);
                        self.backend.connect_to_port(tap, osc, PortId::Detune);
                        taps.push(tap);
                    }
                }
                LfoDestination::Filter => {
                    let tap = self.backend.create_gain(spec.amount * 20.0);
                    self.backend.connect(nodes.gain, tap);
                    self.backend.connect_to_port(tap, filter, PortId::Detune);
                    taps.push(tap);
                }
                LfoDestination::Amp => {
                    let tap = self.backend.create_gain(spec.amount / 200.0);
                    self.backend.connect(nodes.gain, tap);
                    self.backend.connect_to_port(tap, vca, PortId::Gain);
                    taps.push(tap);
                }
            }
        }
        taps
    }

    /// Ramp a voice down from wherever it currently is. Pending schedules
    /// are cancelled first so the release never fights an in-flight attack
    /// or decay ramp.
    pub(crate) fn release_voice(&mut self, voice: &Voice) {
        let now = self.backend.now();
        let release_s = f64::from(self.params.amp_env.release_ms) / 1000.0;
        let filter_release_s = f64::from(self.params.filter_env.release_ms) / 1000.0;

        let vca_level = self.backend.value(voice.vca, PortId::Gain);
        self.backend.cancel_scheduled(voice.vca, PortId::Gain, now);
        self.backend.set_at(voice.vca, PortId::Gain, vca_level, now);
        self.backend
            .ramp_to(voice.vca, PortId::Gain, 0.0, now + release_s);

        let cutoff = self.backend.value(voice.filter, PortId::Cutoff);
        self.backend
            .cancel_scheduled(voice.filter, PortId::Cutoff, now);
        self.backend.set_at(voice.filter, PortId::Cutoff, cutoff, now);
        self.backend.ramp_to(
            voice.filter,
            PortId::Cutoff,
            FILTER_FLOOR_HZ,
            now + filter_release_s,
        );

        let stop_time = now + release_s.max(filter_release_s) + STOP_PAD;
        for osc in voice.oscs {
            self.backend.stop_at(osc, stop_time);
        }
    }
}
