use crate::audio::NodeId;

/// One sounding note's signal graph.
///
/// A voice owns backend handles only; the nodes themselves live in the
/// backend. Three oscillator/mix-gain pairs feed a lowpass filter, the
/// filter feeds the VCA, and the VCA feeds the shared master bus. LFO taps
/// are the per-voice scaling gains wired at creation time.
#[derive(Debug)]
pub struct Voice {
    pub oscs: [NodeId; 3],
    pub mix_gains: [NodeId; 3],
    pub filter: NodeId,
    pub vca: NodeId,
    pub lfo_taps: Vec<NodeId>,
    /// Keyboard-tracked cutoff computed at creation time. The filter
    /// envelope breakpoints are derived from this.
    pub filter_env_target: f32,
}

/// Fixed-capacity table of active voices keyed by MIDI note.
///
/// At most one voice per note; indexing by note number makes note-on
/// deduplication a slot check instead of a map lookup.
pub struct VoiceTable {
    slots: [Option<Voice>; 128],
    len: usize,
}

impl VoiceTable {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, note: u8) -> bool {
        self.get(note).is_some()
    }

    pub fn get(&self, note: u8) -> Option<&Voice> {
        self.slots.get(note as usize).and_then(|s| s.as_ref())
    }

    /// Insert a voice for `note`, returning the previous occupant if the
    /// slot was taken. Notes above 127 are ignored.
    pub fn insert(&mut self, note: u8, voice: Voice) -> Option<Voice> {
        let slot = self.slots.get_mut(note as usize)?;
        let prev = slot.replace(voice);
        if prev.is_none() {
            self.len += 1;
        }
        prev
    }

    pub fn remove(&mut self, note: u8) -> Option<Voice> {
        let taken = self.slots.get_mut(note as usize)?.take();
        if taken.is_some() {
            self.len -= 1;
        }
        taken
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Voice)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(note, slot)| slot.as_ref().map(|v| (note as u8, v)))
    }

    /// Notes currently held or still releasing, ascending.
    pub fn notes(&self) -> Vec<u8> {
        self.iter().map(|(note, _)| note).collect()
    }

    /// Empty the table, yielding every voice for teardown.
    pub fn drain(&mut self) -> Vec<(u8, Voice)> {
        self.len = 0;
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(note, slot)| slot.take().map(|v| (note as u8, v)))
            .collect()
    }
}

impl Default for VoiceTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NodeId;

    fn dummy_voice() -> Voice {
        Voice {
            oscs: [NodeId(0), NodeId(1), NodeId(2)],
            mix_gains: [NodeId(3), NodeId(4), NodeId(5)],
            filter: NodeId(6),
            vca: NodeId(7),
            lfo_taps: Vec::new(),
            filter_env_target: 2000.0,
        }
    }

    #[test]
    fn insert_remove_tracks_len() {
        let mut table = VoiceTable::new();
        assert!(table.is_empty());
        assert!(table.insert(60, dummy_voice()).is_none());
        assert!(table.insert(64, dummy_voice()).is_none());
        assert_eq!(table.len(), 2);
        assert!(table.contains(60));
        assert_eq!(table.notes(), vec![60, 64]);

        assert!(table.remove(60).is_some());
        assert!(table.remove(60).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn replacing_a_slot_keeps_len_stable() {
        let mut table = VoiceTable::new();
        table.insert(60, dummy_voice());
        assert!(table.insert(60, dummy_voice()).is_some());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn drain_empties_the_table() {
        let mut table = VoiceTable::new();
        table.insert(60, dummy_voice());
        table.insert(72, dummy_voice());
        let drained = table.drain();
        assert_eq!(drained.len(), 2);
        assert!(table.is_empty());
    }
}
