// Note playback and capture: the song text format, a wall-clock player,
// a recorder, and the built-in demo patterns.

pub mod demos;
pub mod player;
pub mod recorder;
pub mod song;

pub use demos::{demo, Demo, DEMOS};
pub use player::Player;
pub use recorder::SongRecorder;
pub use song::{Song, SongEvent};
