pub mod offline;

pub use offline::{AutomationEvent, NodeKind, OfflineGraph};

use serde::{Deserialize, Serialize};

/*
Audio Backend Boundary
======================

The voice engine never renders samples itself. It builds and automates a
signal graph through this narrow capability interface, and the concrete
renderer (a realtime graph, a plugin host, or the offline test graph in
`offline.rs`) does the actual oscillation, filtering and mixing.

The contract mirrors how scheduled-automation audio engines behave:

  - Every node is identified by an opaque `NodeId`.
  - Every automatable control input is addressed by a `PortId`.
  - Value changes are either immediate (`set`), anchored at a clock time
    (`set_at`), linear ramps finishing at a clock time (`ramp_to`),
    exponential approaches with a time constant (`smooth_to`), or
    cancellations of everything still pending (`cancel_scheduled`).
  - The backend owns the clock. `now()` is in seconds and only ever moves
    forward. The engine issues schedules against that clock and returns
    immediately; nothing in the core blocks or sleeps.

Teardown rules the engine relies on:

  - `stop_at` is idempotent. Scheduling a stop for a node that already has
    one (or that already stopped) is a no-op, never an error.
  - Cancelling a port with nothing scheduled is a no-op.
*/

/// Oscillator waveshape. Also used for LFOs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Opaque handle to a backend node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Automatable control input on a node.
///
/// Which ports exist depends on the node kind: oscillators expose
/// `Frequency` (Hz) and `Detune` (cents), filters expose `Cutoff` (Hz),
/// `Resonance` (Q) and `Detune` (cents modulation), gains expose `Gain`,
/// delays expose `DelayTime` (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortId {
    Frequency,
    Detune,
    Gain,
    Cutoff,
    Resonance,
    DelayTime,
}

/// Capability interface the voice engine builds signal graphs against.
pub trait AudioBackend {
    /// Current time on the backend's own clock, in seconds.
    fn now(&self) -> f64;

    fn create_oscillator(&mut self, waveform: Waveform) -> NodeId;
    /// Free-running white noise source.
    fn create_noise(&mut self) -> NodeId;
    fn create_gain(&mut self, gain: f32) -> NodeId;
    fn create_filter(&mut self, cutoff: f32, resonance: f32) -> NodeId;
    fn create_delay(&mut self, max_seconds: f32) -> NodeId;
    /// Fixed reverb processor; wet/dry balance is built from gain nodes.
    fn create_reverb(&mut self) -> NodeId;

    /// Connect a node's signal output to another node's signal input.
    fn connect(&mut self, source: NodeId, dest: NodeId);
    /// Connect a node's signal output to a control port, summing into
    /// whatever value is scheduled there (modulation taps).
    fn connect_to_port(&mut self, source: NodeId, dest: NodeId, port: PortId);
    /// Connect a node to the final output bus.
    fn connect_to_output(&mut self, source: NodeId);

    fn set_waveform(&mut self, node: NodeId, waveform: Waveform);

    /// Set a port immediately.
    fn set(&mut self, node: NodeId, port: PortId, value: f32);
    /// Anchor a port at `value` from time `at` onward.
    fn set_at(&mut self, node: NodeId, port: PortId, value: f32, at: f64);
    /// Ramp linearly from the previously scheduled point to `target`,
    /// arriving at time `end`.
    fn ramp_to(&mut self, node: NodeId, port: PortId, target: f32, end: f64);
    /// Approach `target` exponentially starting now, with the given time
    /// constant in seconds.
    fn smooth_to(&mut self, node: NodeId, port: PortId, target: f32, time_constant: f64);
    /// Drop every scheduled change at or after `from`.
    fn cancel_scheduled(&mut self, node: NodeId, port: PortId, from: f64);
    /// Instantaneous value of a port at `now()`.
    fn value(&self, node: NodeId, port: PortId) -> f32;

    /// Begin producing signal.
    fn start(&mut self, node: NodeId);
    /// Schedule the node to stop producing signal at time `at`. Idempotent;
    /// only the first scheduled stop takes effect.
    fn stop_at(&mut self, node: NodeId, at: f64);
}
