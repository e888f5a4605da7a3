//! # Calma Selection Engine
//!
//! Maps a `(Feeling, Severity)` check-in to a relaxation `Experience`: a
//! content bundle (video/music/ambient), three reflection prompts, optional
//! guided breathing, and a recommended duration.
//!
//! The engine is a pure, deterministic function over the built-in content
//! catalog. Same check-in in, same experience out. All thresholds are fixed:
//!
//! - severity ≥ 7 leads with a nature video, otherwise music
//! - severity ≥ 5 adds the feeling's ambient sound track
//! - severity ≥ 8 adds a secondary music track under a video
//! - severity ≥ 6 includes guided breathing
//! - duration steps 3 → 5 → 7 → 10 minutes at severities 3, 5 and 8

mod library;
mod selector;

pub use library::{catalog, items_for, prompts_for, PROMPTS_PER_BAND, PROMPT_BANDS};
pub use selector::{prompt_band, select_experience};
