use super::song::SongEvent;

/// A built-in demo pattern: a preset plus a note loop.
#[derive(Debug, Clone, Copy)]
pub struct Demo {
    pub name: &'static str,
    pub preset: &'static str,
    pub bpm: u16,
    /// `Some(ms)` for looping patterns, `None` for one-shots.
    pub loop_length_ms: Option<u32>,
    pub pattern: &'static [SongEvent],
}

const fn ev(note: u8, time_ms: u32, duration_ms: u32) -> SongEvent {
    SongEvent {
        note,
        time_ms,
        duration_ms,
    }
}

// E minor arpeggio, classic Chase style.
const CHASE: [SongEvent; 16] = [
    ev(64, 0, 100),
    ev(67, 115, 100),
    ev(71, 230, 100),
    ev(76, 345, 100),
    ev(71, 460, 100),
    ev(67, 575, 100),
    ev(64, 690, 100),
    ev(67, 805, 100),
    ev(71, 920, 100),
    ev(76, 1035, 100),
    ev(71, 1150, 100),
    ev(67, 1265, 100),
    ev(64, 1380, 100),
    ev(67, 1495, 100),
    ev(71, 1610, 100),
    ev(76, 1725, 100),
];

// Slow pad chords: Dm, Am, C, G.
const SPACE: [SongEvent; 12] = [
    ev(62, 0, 2500),
    ev(65, 50, 2450),
    ev(69, 100, 2400),
    ev(57, 3000, 2500),
    ev(60, 3050, 2450),
    ev(64, 3100, 2400),
    ev(60, 6000, 2500),
    ev(64, 6050, 2450),
    ev(67, 6100, 2400),
    ev(55, 9000, 2500),
    ev(59, 9050, 2450),
    ev(62, 9100, 2400),
];

// Bass octave pulse in E, then a melodic answer.
const ITALO: [SongEvent; 16] = [
    ev(40, 0, 150),
    ev(52, 250, 150),
    ev(40, 500, 150),
    ev(52, 750, 150),
    ev(40, 1000, 150),
    ev(52, 1250, 150),
    ev(40, 1500, 150),
    ev(52, 1750, 150),
    ev(64, 2000, 200),
    ev(67, 2250, 200),
    ev(69, 2500, 200),
    ev(71, 2750, 200),
    ev(69, 3000, 200),
    ev(67, 3250, 200),
    ev(64, 3500, 200),
    ev(62, 3750, 200),
];

// String chords: Cm7, Fm7, Abmaj7, Gm.
const BLADE: [SongEvent; 16] = [
    ev(48, 0, 3800),
    ev(55, 100, 3700),
    ev(58, 200, 3600),
    ev(63, 300, 3500),
    ev(53, 4000, 3800),
    ev(60, 4100, 3700),
    ev(63, 4200, 3600),
    ev(68, 4300, 3500),
    ev(56, 8000, 3800),
    ev(60, 8100, 3700),
    ev(63, 8200, 3600),
    ev(67, 8300, 3500),
    ev(55, 12000, 3800),
    ev(58, 12100, 3700),
    ev(62, 12200, 3600),
    ev(67, 12300, 3500),
];

// Sixteenth-note bass line in F.
const BLUE_MONDAY: [SongEvent; 16] = [
    ev(41, 0, 100),
    ev(41, 230, 100),
    ev(41, 460, 100),
    ev(48, 690, 100),
    ev(46, 920, 100),
    ev(41, 1150, 100),
    ev(41, 1380, 100),
    ev(41, 1610, 100),
    ev(41, 1840, 100),
    ev(41, 2070, 100),
    ev(48, 2300, 100),
    ev(46, 2530, 100),
    ev(43, 2760, 100),
    ev(41, 2990, 100),
    ev(43, 3220, 100),
    ev(44, 3450, 100),
];

// Dark synth arpeggio over Cm and Am.
const STRANGER: [SongEvent; 16] = [
    ev(48, 0, 200),
    ev(55, 375, 200),
    ev(60, 750, 200),
    ev(63, 1125, 200),
    ev(60, 1500, 200),
    ev(55, 1875, 200),
    ev(48, 2250, 200),
    ev(55, 2625, 200),
    ev(45, 3000, 200),
    ev(52, 3375, 200),
    ev(57, 3750, 200),
    ev(60, 4125, 200),
    ev(57, 4500, 200),
    ev(52, 4875, 200),
    ev(45, 5250, 200),
    ev(52, 5625, 200),
];

pub const DEMOS: &[Demo] = &[
    Demo {
        name: "chase",
        preset: "lead",
        bpm: 130,
        loop_length_ms: Some(1840),
        pattern: &CHASE,
    },
    Demo {
        name: "space",
        preset: "pad",
        bpm: 70,
        loop_length_ms: Some(12000),
        pattern: &SPACE,
    },
    Demo {
        name: "italo",
        preset: "bass",
        bpm: 120,
        loop_length_ms: Some(4000),
        pattern: &ITALO,
    },
    Demo {
        name: "blade",
        preset: "strings",
        bpm: 60,
        loop_length_ms: Some(16000),
        pattern: &BLADE,
    },
    Demo {
        name: "bluemonday",
        preset: "bass",
        bpm: 130,
        loop_length_ms: Some(3680),
        pattern: &BLUE_MONDAY,
    },
    Demo {
        name: "stranger",
        preset: "pad",
        bpm: 80,
        loop_length_ms: Some(6000),
        pattern: &STRANGER,
    },
];

/// Look up a demo by name.
pub fn demo(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(demo("chase").unwrap().preset, "lead");
        assert!(demo("nope").is_none());
    }

    #[test]
    fn demos_stay_inside_their_loops() {
        for d in DEMOS {
            let Some(length) = d.loop_length_ms else {
                continue;
            };
            for event in d.pattern {
                assert!(
                    event.time_ms + event.duration_ms <= length,
                    "{} overruns its loop",
                    d.name
                );
            }
        }
    }

    #[test]
    fn every_demo_names_a_builtin_preset() {
        for d in DEMOS {
            assert!(crate::patch::builtin(d.preset).is_some(), "{}", d.name);
        }
    }
}
