//! Static content catalog.
//!
//! A read-only lookup table of media references tagged by feeling. The
//! selector never mutates it; the catalog is built once on first access.

use calma_core::{ContentItem, ContentKind, Feeling};
use std::sync::OnceLock;

/// Prompts per feeling are split into this many severity bands.
pub const PROMPT_BANDS: usize = 3;
/// Each band contributes this many prompts to an experience.
pub const PROMPTS_PER_BAND: usize = 3;

static CATALOG: OnceLock<Vec<ContentItem>> = OnceLock::new();

/// The full built-in catalog.
pub fn catalog() -> &'static [ContentItem] {
    CATALOG.get_or_init(build_catalog).as_slice()
}

/// All catalog entries of one kind for one feeling, in catalog order.
pub fn items_for(feeling: Feeling, kind: ContentKind) -> Vec<&'static ContentItem> {
    catalog()
        .iter()
        .filter(|item| item.feeling == feeling && item.kind == kind)
        .collect()
}

/// The 9 reflection prompts for a feeling, ordered low→high severity band.
pub fn prompts_for(feeling: Feeling) -> &'static [&'static str; PROMPT_BANDS * PROMPTS_PER_BAND] {
    match feeling {
        Feeling::Stress => &STRESS_PROMPTS,
        Feeling::Anxiety => &ANXIETY_PROMPTS,
        Feeling::Depression => &DEPRESSION_PROMPTS,
        Feeling::Frustration => &FRUSTRATION_PROMPTS,
    }
}

fn item(
    id: &str,
    kind: ContentKind,
    feeling: Feeling,
    title: &str,
    url: &str,
    duration_secs: u32,
) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        kind,
        feeling,
        title: title.to_string(),
        url: Some(url.to_string()),
        duration_secs: Some(duration_secs),
    }
}

fn build_catalog() -> Vec<ContentItem> {
    use ContentKind::*;
    use Feeling::*;

    vec![
        // --- Stress ---
        item(
            "forest-stream",
            NatureVideo,
            Stress,
            "Forest Stream at Dawn",
            "https://cdn.calma.app/video/forest-stream.mp4",
            600,
        ),
        item(
            "calm-piano",
            Music,
            Stress,
            "Calm Piano",
            "https://cdn.calma.app/audio/calm-piano.mp3",
            420,
        ),
        item(
            "soft-strings",
            Music,
            Stress,
            "Soft Strings",
            "https://cdn.calma.app/audio/soft-strings.mp3",
            380,
        ),
        item(
            "light-rain",
            AmbientSound,
            Stress,
            "Light Rain",
            "https://cdn.calma.app/audio/light-rain.mp3",
            900,
        ),
        item(
            "misty-valley",
            Image,
            Stress,
            "Misty Valley",
            "https://cdn.calma.app/img/misty-valley.jpg",
            0,
        ),
        // --- Anxiety ---
        item(
            "slow-waves",
            NatureVideo,
            Anxiety,
            "Slow Ocean Waves",
            "https://cdn.calma.app/video/slow-waves.mp4",
            600,
        ),
        item(
            "weightless",
            Music,
            Anxiety,
            "Weightless Ambient",
            "https://cdn.calma.app/audio/weightless.mp3",
            480,
        ),
        item(
            "warm-pad",
            Music,
            Anxiety,
            "Warm Synth Pad",
            "https://cdn.calma.app/audio/warm-pad.mp3",
            400,
        ),
        item(
            "distant-surf",
            AmbientSound,
            Anxiety,
            "Distant Surf",
            "https://cdn.calma.app/audio/distant-surf.mp3",
            900,
        ),
        item(
            "still-lake",
            Image,
            Anxiety,
            "Still Lake",
            "https://cdn.calma.app/img/still-lake.jpg",
            0,
        ),
        // --- Depression ---
        item(
            "sunrise-meadow",
            NatureVideo,
            Depression,
            "Sunrise over a Meadow",
            "https://cdn.calma.app/video/sunrise-meadow.mp4",
            600,
        ),
        item(
            "morning-light",
            Music,
            Depression,
            "Morning Light",
            "https://cdn.calma.app/audio/morning-light.mp3",
            440,
        ),
        item(
            "gentle-guitar",
            Music,
            Depression,
            "Gentle Guitar",
            "https://cdn.calma.app/audio/gentle-guitar.mp3",
            390,
        ),
        item(
            "birdsong",
            AmbientSound,
            Depression,
            "Morning Birdsong",
            "https://cdn.calma.app/audio/birdsong.mp3",
            900,
        ),
        item(
            "golden-field",
            Image,
            Depression,
            "Golden Field",
            "https://cdn.calma.app/img/golden-field.jpg",
            0,
        ),
        // --- Frustration ---
        item(
            "waterfall",
            NatureVideo,
            Frustration,
            "Mountain Waterfall",
            "https://cdn.calma.app/video/waterfall.mp4",
            600,
        ),
        item(
            "deep-breath",
            Music,
            Frustration,
            "Deep Breath",
            "https://cdn.calma.app/audio/deep-breath.mp3",
            410,
        ),
        item(
            "slow-cello",
            Music,
            Frustration,
            "Slow Cello",
            "https://cdn.calma.app/audio/slow-cello.mp3",
            430,
        ),
        item(
            "wind-in-pines",
            AmbientSound,
            Frustration,
            "Wind in the Pines",
            "https://cdn.calma.app/audio/wind-in-pines.mp3",
            900,
        ),
        item(
            "open-sky",
            Image,
            Frustration,
            "Open Sky",
            "https://cdn.calma.app/img/open-sky.jpg",
            0,
        ),
    ]
}

// ============================================================================
// Prompt tables: 3 per band, ordered low (1-3), mid (4-6), high (7-10)
// ============================================================================

static STRESS_PROMPTS: [&str; 9] = [
    "Name one small thing that went well today.",
    "Which task can wait until tomorrow without consequence?",
    "Drop your shoulders and unclench your jaw.",
    "What is the single most important thing right now? Only that one.",
    "Picture finishing one task, not all of them.",
    "Your to-do list is a tool, not a judgment.",
    "You do not have to solve everything tonight.",
    "What would you tell a friend carrying this much?",
    "Let your exhale be longer than your inhale, and let the list go.",
];

static ANXIETY_PROMPTS: [&str; 9] = [
    "Name three things you can see around you right now.",
    "Is this worry about something happening now, or something imagined?",
    "Feel your feet on the floor.",
    "Of the outcomes you fear, which have actually happened before?",
    "Worry is not preparation. You have prepared enough.",
    "Place a hand on your chest and slow one breath.",
    "This feeling is intense, and it will pass. It always has.",
    "You are safe in this room, in this minute.",
    "Count five slow breaths. Nothing else is required of you.",
];

static DEPRESSION_PROMPTS: [&str; 9] = [
    "What is one tiny thing you are mildly curious about today?",
    "Low days are data, not verdicts.",
    "Step outside or open a window, even for one minute.",
    "Who could you send a two-line message to, with no agenda?",
    "You have gotten through every heavy day so far.",
    "Pick the smallest possible next step. Smaller than that.",
    "Feeling nothing is also a feeling, and it is temporary.",
    "You do not need a reason to rest.",
    "Being here, listening to this, already counts as trying.",
];

static FRUSTRATION_PROMPTS: [&str; 9] = [
    "What exactly is blocked? Say it in one sentence.",
    "Is this in your control, someone else's, or no one's?",
    "Relax your hands. Frustration lives in fists.",
    "What would a good-enough outcome look like, instead of a perfect one?",
    "Step away for ten minutes. The problem will keep.",
    "You can be right, or you can be done for today.",
    "The anger is information. It is telling you what matters to you.",
    "Nothing useful is decided at peak irritation.",
    "Let the waterfall be louder than the argument in your head.",
];
