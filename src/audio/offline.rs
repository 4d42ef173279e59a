use std::collections::HashMap;

use super::{AudioBackend, NodeId, PortId, Waveform};

/*
Offline Graph
=============

A deterministic `AudioBackend` that renders nothing. It records every node,
connection and automation event against a manually advanced clock, and can
evaluate any port's value at any time using the standard scheduled-automation
rules:

  SetValue    hold `value` from `at` onward
  LinearRamp  straight line from the previous anchor to (`end`, `target`)
  SetTarget   exponential approach, value(t) = target + (v0 - target) * e^(-(t-at)/tc)

The test suite drives the whole voice engine against this graph and asserts
on the recorded schedules; a headless host can use it the same way.
*/

/// One recorded automation event on a port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    SetValue { at: f64, value: f32 },
    LinearRamp { end: f64, target: f32 },
    SetTarget { at: f64, target: f32, time_constant: f64 },
}

impl AutomationEvent {
    /// Time used for ordering and cancellation. For ramps this is the end
    /// time: cancelling at `t` drops any ramp still finishing after `t`.
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { at, .. } => at,
            AutomationEvent::LinearRamp { end, .. } => end,
            AutomationEvent::SetTarget { at, .. } => at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Oscillator,
    Noise,
    Gain,
    Filter,
    Delay,
    Reverb,
}

#[derive(Debug, Clone)]
struct Lane {
    initial: f32,
    events: Vec<AutomationEvent>,
}

impl Lane {
    fn new(initial: f32) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    fn push(&mut self, event: AutomationEvent) {
        // Keep events ordered; ties keep insertion order.
        let idx = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(idx, event);
    }

    fn cancel_from(&mut self, from: f64) {
        self.events.retain(|e| e.time() < from);
    }

    fn value_at(&self, t: f64) -> f32 {
        let mut value = self.initial;
        let mut anchor = 0.0_f64;
        for (i, event) in self.events.iter().enumerate() {
            match *event {
                AutomationEvent::SetValue { at, value: v } => {
                    if at > t {
                        break;
                    }
                    value = v;
                    anchor = at;
                }
                AutomationEvent::LinearRamp { end, target } => {
                    if end <= t {
                        value = target;
                        anchor = end;
                    } else {
                        let span = end - anchor;
                        if span > 0.0 && t > anchor {
                            value += (target - value) * ((t - anchor) / span) as f32;
                        }
                        return value;
                    }
                }
                AutomationEvent::SetTarget {
                    at,
                    target,
                    time_constant,
                } => {
                    if at > t {
                        break;
                    }
                    // The approach runs until the next event overrides it.
                    let until = self
                        .events
                        .get(i + 1)
                        .map(|e| e.time())
                        .unwrap_or(f64::INFINITY)
                        .min(t);
                    let elapsed = (until - at).max(0.0);
                    if time_constant > 0.0 {
                        let k = (-elapsed / time_constant).exp() as f32;
                        value = target + (value - target) * k;
                    } else {
                        value = target;
                    }
                    anchor = until;
                }
            }
        }
        value
    }
}

#[derive(Debug)]
struct OfflineNode {
    kind: NodeKind,
    waveform: Option<Waveform>,
    started: bool,
    stop_time: Option<f64>,
    outputs: Vec<(NodeId, Option<PortId>)>,
    to_output: bool,
    lanes: HashMap<PortId, Lane>,
}

impl OfflineNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            waveform: None,
            started: false,
            stop_time: None,
            outputs: Vec::new(),
            to_output: false,
            lanes: HashMap::new(),
        }
    }

    fn with_lane(mut self, port: PortId, initial: f32) -> Self {
        self.lanes.insert(port, Lane::new(initial));
        self
    }
}

/// Recording, non-rendering `AudioBackend` with a manually advanced clock.
#[derive(Debug, Default)]
pub struct OfflineGraph {
    nodes: Vec<OfflineNode>,
    now: f64,
}

impl OfflineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&mut self, seconds: f64) {
        assert!(seconds >= 0.0, "the clock only moves forward");
        self.now += seconds;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.0 as usize].kind
    }

    pub fn waveform(&self, node: NodeId) -> Option<Waveform> {
        self.nodes[node.0 as usize].waveform
    }

    pub fn is_started(&self, node: NodeId) -> bool {
        self.nodes[node.0 as usize].started
    }

    pub fn stop_time(&self, node: NodeId) -> Option<f64> {
        self.nodes[node.0 as usize].stop_time
    }

    pub fn sends_to_output(&self, node: NodeId) -> bool {
        self.nodes[node.0 as usize].to_output
    }

    /// All recorded automation events on a port, in time order.
    pub fn events(&self, node: NodeId, port: PortId) -> &[AutomationEvent] {
        self.nodes[node.0 as usize]
            .lanes
            .get(&port)
            .map(|l| l.events.as_slice())
            .unwrap_or(&[])
    }

    /// Evaluate a port at an arbitrary time.
    pub fn value_at(&self, node: NodeId, port: PortId, t: f64) -> f32 {
        self.nodes[node.0 as usize]
            .lanes
            .get(&port)
            .map(|l| l.value_at(t))
            .unwrap_or(0.0)
    }

    /// True if `source`'s signal output is wired to `dest`'s signal input.
    pub fn feeds(&self, source: NodeId, dest: NodeId) -> bool {
        self.nodes[source.0 as usize]
            .outputs
            .iter()
            .any(|&(d, p)| d == dest && p.is_none())
    }

    /// Sources whose output is wired into a control port of `dest`.
    pub fn port_feeds(&self, dest: NodeId, port: PortId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.outputs.iter().any(|&(d, p)| d == dest && p == Some(port)))
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind == kind)
            .map(|(i, _)| NodeId(i as u32))
            .collect()
    }

    fn add(&mut self, node: OfflineNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn lane_mut(&mut self, node: NodeId, port: PortId) -> &mut Lane {
        self.nodes[node.0 as usize]
            .lanes
            .entry(port)
            .or_insert_with(|| Lane::new(0.0))
    }
}

impl AudioBackend for OfflineGraph {
    fn now(&self) -> f64 {
        self.now
    }

    fn create_oscillator(&mut self, waveform: Waveform) -> NodeId {
        let mut node = OfflineNode::new(NodeKind::Oscillator)
            .with_lane(PortId::Frequency, 440.0)
            .with_lane(PortId::Detune, 0.0);
        node.waveform = Some(waveform);
        self.add(node)
    }

    fn create_noise(&mut self) -> NodeId {
        let mut node = OfflineNode::new(NodeKind::Noise);
        // Noise sources free-run from creation.
        node.started = true;
        self.add(node)
    }

    fn create_gain(&mut self, gain: f32) -> NodeId {
        self.add(OfflineNode::new(NodeKind::Gain).with_lane(PortId::Gain, gain))
    }

    fn create_filter(&mut self, cutoff: f32, resonance: f32) -> NodeId {
        self.add(
            OfflineNode::new(NodeKind::Filter)
                .with_lane(PortId::Cutoff, cutoff)
                .with_lane(PortId::Resonance, resonance)
                .with_lane(PortId::Detune, 0.0),
        )
    }

    fn create_delay(&mut self, _max_seconds: f32) -> NodeId {
        self.add(OfflineNode::new(NodeKind::Delay).with_lane(PortId::DelayTime, 0.0))
    }

    fn create_reverb(&mut self) -> NodeId {
        self.add(OfflineNode::new(NodeKind::Reverb))
    }

    fn connect(&mut self, source: NodeId, dest: NodeId) {
        self.nodes[source.0 as usize].outputs.push((dest, None));
    }

    fn connect_to_port(&mut self, source: NodeId, dest: NodeId, port: PortId) {
        self.nodes[source.0 as usize].outputs.push((dest, Some(port)));
    }

    fn connect_to_output(&mut self, source: NodeId) {
        self.nodes[source.0 as usize].to_output = true;
    }

    fn set_waveform(&mut self, node: NodeId, waveform: Waveform) {
        self.nodes[node.0 as usize].waveform = Some(waveform);
    }

    fn set(&mut self, node: NodeId, port: PortId, value: f32) {
        let at = self.now;
        self.lane_mut(node, port)
            .push(AutomationEvent::SetValue { at, value });
    }

    fn set_at(&mut self, node: NodeId, port: PortId, value: f32, at: f64) {
        self.lane_mut(node, port)
            .push(AutomationEvent::SetValue { at, value });
    }

    fn ramp_to(&mut self, node: NodeId, port: PortId, target: f32, end: f64) {
        self.lane_mut(node, port)
            .push(AutomationEvent::LinearRamp { end, target });
    }

    fn smooth_to(&mut self, node: NodeId, port: PortId, target: f32, time_constant: f64) {
        let at = self.now;
        self.lane_mut(node, port).push(AutomationEvent::SetTarget {
            at,
            target,
            time_constant,
        });
    }

    fn cancel_scheduled(&mut self, node: NodeId, port: PortId, from: f64) {
        if let Some(lane) = self.nodes[node.0 as usize].lanes.get_mut(&port) {
            lane.cancel_from(from);
        }
    }

    fn value(&self, node: NodeId, port: PortId) -> f32 {
        self.value_at(node, port, self.now)
    }

    fn start(&mut self, node: NodeId) {
        self.nodes[node.0 as usize].started = true;
    }

    fn stop_at(&mut self, node: NodeId, at: f64) {
        let node = &mut self.nodes[node.0 as usize];
        if node.stop_time.is_none() {
            node.stop_time = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn set_then_ramp_interpolates() {
        let mut g = OfflineGraph::new();
        let gain = g.create_gain(1.0);
        g.set_at(gain, PortId::Gain, 0.0, 0.0);
        g.ramp_to(gain, PortId::Gain, 1.0, 0.1);
        g.ramp_to(gain, PortId::Gain, 0.5, 0.3);

        assert!(close(g.value_at(gain, PortId::Gain, 0.0), 0.0));
        assert!(close(g.value_at(gain, PortId::Gain, 0.05), 0.5));
        assert!(close(g.value_at(gain, PortId::Gain, 0.1), 1.0));
        assert!(close(g.value_at(gain, PortId::Gain, 0.2), 0.75));
        assert!(close(g.value_at(gain, PortId::Gain, 1.0), 0.5));
    }

    #[test]
    fn smooth_to_approaches_target() {
        let mut g = OfflineGraph::new();
        let gain = g.create_gain(1.0);
        g.smooth_to(gain, PortId::Gain, 0.0, 0.01);

        let one_tc = g.value_at(gain, PortId::Gain, 0.01);
        assert!(close(one_tc, (-1.0_f64).exp() as f32));
        assert!(g.value_at(gain, PortId::Gain, 1.0) < 1e-3);
    }

    #[test]
    fn cancel_drops_pending_ramps_only() {
        let mut g = OfflineGraph::new();
        let gain = g.create_gain(1.0);
        g.set_at(gain, PortId::Gain, 0.2, 0.0);
        g.ramp_to(gain, PortId::Gain, 1.0, 0.5);
        g.advance(0.1);
        g.cancel_scheduled(gain, PortId::Gain, 0.1);

        assert_eq!(g.events(gain, PortId::Gain).len(), 1);
        assert!(close(g.value_at(gain, PortId::Gain, 1.0), 0.2));
    }

    #[test]
    fn stop_keeps_first_schedule() {
        let mut g = OfflineGraph::new();
        let osc = g.create_oscillator(Waveform::Sine);
        g.start(osc);
        g.stop_at(osc, 1.0);
        g.stop_at(osc, 5.0);
        assert_eq!(g.stop_time(osc), Some(1.0));
    }

    #[test]
    fn ramp_without_anchor_starts_from_initial() {
        let mut g = OfflineGraph::new();
        let osc = g.create_oscillator(Waveform::Sawtooth);
        g.ramp_to(osc, PortId::Frequency, 880.0, 2.0);
        assert!(close(g.value_at(osc, PortId::Frequency, 1.0), 660.0));
    }
}
