use crate::notes;

/*
Song Text Format
================

One note event per line:

    time_ms:noteName:duration_ms

Note names are sharp-spelled with octave, e.g. `C#4` or `A-1`. Lines
starting with `#` are comments; a comment of the form `# preset: <name>`
names the preset to load before playback. Blank lines are ignored, and so
is any malformed line: wrong field count, unparseable integers, or an
unrecognized note name. Parsing never fails.

Export mirrors the format with a comment header, events sorted by
ascending start time.
*/

/// One note event: when it starts, what it plays, how long it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongEvent {
    pub note: u8,
    pub time_ms: u32,
    pub duration_ms: u32,
}

/// A parsed song: the preset to play it with and its note events.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub preset: String,
    pub notes: Vec<SongEvent>,
}

impl Song {
    /// Parse song text. Malformed lines are skipped, never fatal.
    pub fn parse(text: &str) -> Song {
        let mut song = Song {
            preset: "init".to_string(),
            notes: Vec::new(),
        };

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                if let Some(name) = parse_preset_comment(comment) {
                    song.preset = name.to_string();
                }
                continue;
            }

            let mut fields = line.splitn(3, ':');
            let (Some(time), Some(name), Some(duration)) =
                (fields.next(), fields.next(), fields.next())
            else {
                log::debug!("skipping malformed song line {line:?}");
                continue;
            };
            let (Ok(time_ms), Some(note), Ok(duration_ms)) = (
                time.trim().parse::<u32>(),
                notes::parse_note_name(name.trim()),
                duration.trim().parse::<u32>(),
            ) else {
                log::debug!("skipping malformed song line {line:?}");
                continue;
            };

            song.notes.push(SongEvent {
                note,
                time_ms,
                duration_ms,
            });
        }

        song
    }

    /// Render the song as text, events sorted by ascending start time.
    /// `date` is the export date in `YYYY-MM-DD` form.
    pub fn to_text(&self, date: &str) -> String {
        let mut sorted = self.notes.clone();
        sorted.sort_by_key(|n| n.time_ms);

        let mut out = String::new();
        out.push_str("# Moog Modular Song\n");
        out.push_str(&format!("# preset: {}\n", self.preset));
        out.push_str(&format!("# date: {date}\n"));
        out.push_str(&format!("# notes: {}\n\n", sorted.len()));
        for event in &sorted {
            out.push_str(&format!(
                "{}:{}:{}\n",
                event.time_ms,
                notes::note_name(event.note),
                event.duration_ms
            ));
        }
        out
    }

    /// Time at which the last note ends, in ms. Zero for an empty song.
    pub fn span_ms(&self) -> u32 {
        self.notes
            .iter()
            .map(|n| n.time_ms + n.duration_ms)
            .max()
            .unwrap_or(0)
    }
}

/// Match `preset: <name>` inside a comment, case-insensitively.
fn parse_preset_comment(comment: &str) -> Option<&str> {
    let trimmed = comment.trim_start();
    let rest = trimmed
        .get(..7)
        .filter(|head| head.eq_ignore_ascii_case("preset:"))
        .map(|_| &trimmed[7..])?;
    let name = rest.trim();
    let end = name
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(name.len());
    if end == 0 {
        None
    } else {
        Some(&name[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_events_and_preset() {
        let song = Song::parse("0:C4:100\n100:E4:200\n# preset: bass\n");
        assert_eq!(song.preset, "bass");
        assert_eq!(
            song.notes,
            vec![
                SongEvent {
                    note: 60,
                    time_ms: 0,
                    duration_ms: 100
                },
                SongEvent {
                    note: 64,
                    time_ms: 100,
                    duration_ms: 200
                },
            ]
        );
    }

    #[test]
    fn malformed_lines_do_not_abort_parsing() {
        let song = Song::parse("abc:Z9:xyz\n0:C4:100\nnot a line\n50:H4:10\n100:E4:200");
        assert_eq!(song.notes.len(), 2);
        assert_eq!(song.notes[0].note, 60);
        assert_eq!(song.notes[1].note, 64);
    }

    #[test]
    fn blank_lines_and_comments_are_ignored() {
        let song = Song::parse("\n\n# just a comment\n   \n0:A4:50\n");
        assert_eq!(song.preset, "init");
        assert_eq!(song.notes.len(), 1);
        assert_eq!(song.notes[0].note, 69);
    }

    #[test]
    fn preset_comment_is_case_insensitive() {
        assert_eq!(Song::parse("# PRESET: lead").preset, "lead");
        assert_eq!(Song::parse("#preset:pad").preset, "pad");
    }

    #[test]
    fn export_sorts_and_round_trips() {
        let song = Song {
            preset: "lead".to_string(),
            notes: vec![
                SongEvent {
                    note: 64,
                    time_ms: 100,
                    duration_ms: 200,
                },
                SongEvent {
                    note: 60,
                    time_ms: 0,
                    duration_ms: 100,
                },
            ],
        };
        let text = song.to_text("2024-06-01");
        assert!(text.starts_with("# Moog Modular Song\n"));
        assert!(text.contains("# preset: lead\n"));
        assert!(text.contains("# date: 2024-06-01\n"));
        assert!(text.contains("# notes: 2\n"));
        // Sorted: C4 line precedes E4 line.
        assert!(text.find("0:C4:100").unwrap() < text.find("100:E4:200").unwrap());

        let parsed = Song::parse(&text);
        assert_eq!(parsed.preset, "lead");
        assert_eq!(parsed.notes.len(), 2);
        assert_eq!(parsed.notes[0].note, 60);
    }

    #[test]
    fn span_covers_the_longest_tail() {
        let song = Song::parse("0:C4:100\n50:E4:500\n200:G4:100");
        assert_eq!(song.span_ms(), 550);
        assert_eq!(Song::parse("").span_ms(), 0);
    }
}
