pub mod audio; // Rendering-engine capability boundary
pub mod notes;
pub mod patch; // Preset snapshots and the built-in bank
pub mod sequencing; // Song format, recorder, playback
pub mod synth; // Voice construction and parameter propagation

/// Tuning reference: MIDI note 69 (A4) sounds at 440 Hz.
pub const A4_HZ: f32 = 440.0;

/// Keyboard-tracking reference pitch (middle C).
pub(crate) const KBD_TRACK_REF_HZ: f32 = 261.63;
/// Lowest cutoff the filter is driven to; doubles as the release floor.
pub(crate) const FILTER_FLOOR_HZ: f32 = 20.0;
pub(crate) const FILTER_CEIL_HZ: f32 = 20_000.0;
/// Headroom on every mixer gain so three full-level oscillators plus noise
/// stay below clipping when summed.
pub(crate) const MIX_HEADROOM: f32 = 0.3;
