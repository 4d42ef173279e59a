use crate::A4_HZ;

/*
Note and Frequency Conversion
=============================

Stateless helpers shared by the voice engine, the song format, and the
recorder. Notes are identified by MIDI number (0-127) in twelve-tone equal
temperament referenced to A4 = 440 Hz:

    frequency = 440 * 2^((note - 69) / 12)

Note names use the sharp spelling only ("C#4", never "Db4"), with the
octave numbered so that middle C (MIDI 60) is "C4". Negative octaves are
legal down to "C-1" (MIDI 0).
*/

/// Pitch-class names indexed by `note % 12`.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert a MIDI note number to its frequency in Hz.
#[inline]
pub fn note_to_frequency(note: u8) -> f32 {
    A4_HZ * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Convert a frequency back to the nearest MIDI note number.
///
/// Returns `None` for non-positive frequencies or pitches outside the
/// 0-127 note range.
pub fn frequency_to_note(frequency: f32) -> Option<u8> {
    if frequency <= 0.0 {
        return None;
    }
    let note = (69.0 + 12.0 * (frequency / A4_HZ).log2()).round();
    if (0.0..=127.0).contains(&note) {
        Some(note as u8)
    } else {
        None
    }
}

/// Format a MIDI note number as a note name, e.g. `60` -> `"C4"`.
pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}

/// Parse a note name of the form `[A-G]#?-?<octave>` (e.g. `"C#4"`, `"A-1"`)
/// into a MIDI note number. Returns `None` for anything else.
pub fn parse_note_name(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let letter = chars.next()?;
    let semitone = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let (semitone, octave_str) = match rest.strip_prefix('#') {
        Some(tail) => (semitone + 1, tail),
        None => (semitone, rest),
    };
    let octave: i32 = octave_str.parse().ok()?;
    let note = (octave + 1) * 12 + semitone;
    if (0..=127).contains(&note) {
        Some(note as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(note_to_frequency(69), 440.0);
    }

    #[test]
    fn conversion_round_trips_every_note() {
        for note in 0..=127u8 {
            let freq = note_to_frequency(note);
            assert_eq!(frequency_to_note(freq), Some(note), "note {note}");
        }
    }

    #[test]
    fn frequency_out_of_range_is_rejected() {
        assert_eq!(frequency_to_note(0.0), None);
        assert_eq!(frequency_to_note(-10.0), None);
        assert_eq!(frequency_to_note(100_000.0), None);
    }

    #[test]
    fn names_round_trip() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(0), "C-1");
        for note in 0..=127u8 {
            assert_eq!(parse_note_name(&note_name(note)), Some(note));
        }
    }

    #[test]
    fn bad_names_are_rejected() {
        assert_eq!(parse_note_name(""), None);
        assert_eq!(parse_note_name("Z9"), None);
        assert_eq!(parse_note_name("C"), None);
        assert_eq!(parse_note_name("H4"), None);
        assert_eq!(parse_note_name("C#x"), None);
        // One octave below C-1 would be MIDI -12.
        assert_eq!(parse_note_name("C-2"), None);
    }
}
