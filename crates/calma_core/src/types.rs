//! Domain types shared across the workspace.
//!
//! A check-in is a self-reported `(Feeling, Severity)` pair; the engine maps
//! it to an `Experience` (content bundle + session metadata), and the store
//! persists the pairing as a `RelaxationSession`.

use crate::error::CalmaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One of the four self-reported mood categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feeling {
    Stress,
    Anxiety,
    Depression,
    Frustration,
}

impl Feeling {
    pub const ALL: [Feeling; 4] = [
        Feeling::Stress,
        Feeling::Anxiety,
        Feeling::Depression,
        Feeling::Frustration,
    ];

    /// Stable snake_case name, used for DB text columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feeling::Stress => "stress",
            Feeling::Anxiety => "anxiety",
            Feeling::Depression => "depression",
            Feeling::Frustration => "frustration",
        }
    }
}

impl FromStr for Feeling {
    type Err = CalmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stress" => Ok(Feeling::Stress),
            "anxiety" => Ok(Feeling::Anxiety),
            "depression" => Ok(Feeling::Depression),
            "frustration" => Ok(Feeling::Frustration),
            other => Err(CalmaError::UnknownFeeling(other.to_string())),
        }
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported intensity, 1..=10. Construction validates the range, so a
/// held `Severity` is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self, CalmaError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CalmaError::SeverityOutOfRange(value))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Severity {
    type Error = CalmaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Severity> for u8 {
    fn from(s: Severity) -> u8 {
        s.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    NatureVideo,
    Music,
    AmbientSound,
    Image,
    Text,
}

/// A pre-catalogued media reference, tagged with the feeling it targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable slug, unique within the catalog.
    pub id: String,
    pub kind: ContentKind,
    pub feeling: Feeling,
    pub title: String,
    /// Media URL; None for text entries.
    #[serde(default)]
    pub url: Option<String>,
    /// Track/clip length where known.
    #[serde(default)]
    pub duration_secs: Option<u32>,
}

/// Guided breathing parameters shown alongside the content bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingPattern {
    pub inhale_secs: u8,
    pub hold_secs: u8,
    pub exhale_secs: u8,
    pub cycles: u8,
}

impl BreathingPattern {
    /// Box breathing, the default for tension-type feelings.
    pub fn boxed() -> Self {
        Self {
            inhale_secs: 4,
            hold_secs: 4,
            exhale_secs: 4,
            cycles: 6,
        }
    }

    /// 4-7-8, suited to anxious activation.
    pub fn four_seven_eight() -> Self {
        Self {
            inhale_secs: 4,
            hold_secs: 7,
            exhale_secs: 8,
            cycles: 4,
        }
    }

    /// Slow-exhale pacing for low-arousal moods.
    pub fn slow_exhale() -> Self {
        Self {
            inhale_secs: 4,
            hold_secs: 2,
            exhale_secs: 6,
            cycles: 6,
        }
    }

    pub fn for_feeling(feeling: Feeling) -> Self {
        match feeling {
            Feeling::Stress | Feeling::Frustration => Self::boxed(),
            Feeling::Anxiety => Self::four_seven_eight(),
            Feeling::Depression => Self::slow_exhale(),
        }
    }
}

/// A persisted mood check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub feeling: Feeling,
    pub severity: Severity,
    #[serde(default)]
    pub note: Option<String>,
    /// Unix timestamp, seconds.
    pub created_at: i64,
}

impl CheckIn {
    pub fn new(user_id: Uuid, feeling: Feeling, severity: Severity, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            feeling,
            severity,
            note,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// The generated relaxation bundle for one check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    /// Kind of the leading item (video above the severity threshold, else music).
    pub primary: ContentKind,
    /// Ordered bundle: primary first, then any ambient/secondary tracks.
    pub items: Vec<ContentItem>,
    /// Exactly three reflection prompts for the severity band.
    pub prompts: Vec<String>,
    /// Present when the severity warrants guided breathing.
    #[serde(default)]
    pub breathing: Option<BreathingPattern>,
    pub duration_minutes: u32,
}

/// A check-in paired with its generated experience, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationSession {
    pub id: Uuid,
    pub check_in: CheckIn,
    pub experience: Experience,
    pub created_at: i64,
    #[serde(default)]
    pub completed_at: Option<i64>,
}

/// Per-feeling session count inside a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeelingCount {
    pub feeling: Feeling,
    pub count: i64,
}

/// Aggregates over a user's history, for the stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    /// Mean self-reported severity across all check-ins; 0.0 when empty.
    pub average_severity: f64,
    /// Counts in `Feeling::ALL` order, zero-count feelings included.
    pub by_feeling: Vec<FeelingCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_range() {
        assert!(Severity::new(1).is_ok());
        assert!(Severity::new(10).is_ok());
        assert!(matches!(
            Severity::new(0),
            Err(CalmaError::SeverityOutOfRange(0))
        ));
        assert!(matches!(
            Severity::new(11),
            Err(CalmaError::SeverityOutOfRange(11))
        ));
    }

    #[test]
    fn test_severity_rejects_out_of_range_json() {
        let ok: Severity = serde_json::from_str("7").unwrap();
        assert_eq!(ok.get(), 7);

        let err = serde_json::from_str::<Severity>("0");
        assert!(err.is_err());
        let err = serde_json::from_str::<Severity>("42");
        assert!(err.is_err());
    }

    #[test]
    fn test_feeling_round_trip() {
        for feeling in Feeling::ALL {
            let parsed: Feeling = feeling.as_str().parse().unwrap();
            assert_eq!(parsed, feeling);
        }
        assert!(matches!(
            "bored".parse::<Feeling>(),
            Err(CalmaError::UnknownFeeling(_))
        ));
    }

    #[test]
    fn test_feeling_serde_names() {
        let json = serde_json::to_string(&Feeling::Anxiety).unwrap();
        assert_eq!(json, "\"anxiety\"");
        let back: Feeling = serde_json::from_str("\"frustration\"").unwrap();
        assert_eq!(back, Feeling::Frustration);
    }

    #[test]
    fn test_breathing_presets() {
        assert_eq!(
            BreathingPattern::for_feeling(Feeling::Anxiety),
            BreathingPattern::four_seven_eight()
        );
        assert_eq!(
            BreathingPattern::for_feeling(Feeling::Stress),
            BreathingPattern::boxed()
        );
        assert_eq!(
            BreathingPattern::for_feeling(Feeling::Frustration),
            BreathingPattern::boxed()
        );
        assert_eq!(
            BreathingPattern::for_feeling(Feeling::Depression),
            BreathingPattern::slow_exhale()
        );
    }

    #[test]
    fn test_experience_json_round_trip() {
        let exp = Experience {
            primary: ContentKind::Music,
            items: vec![ContentItem {
                id: "calm-piano-1".into(),
                kind: ContentKind::Music,
                feeling: Feeling::Stress,
                title: "Calm Piano".into(),
                url: Some("https://cdn.example.com/audio/calm-piano-1.mp3".into()),
                duration_secs: Some(420),
            }],
            prompts: vec!["a".into(), "b".into(), "c".into()],
            breathing: None,
            duration_minutes: 5,
        };
        let json = serde_json::to_string(&exp).unwrap();
        let back: Experience = serde_json::from_str(&json).unwrap();
        assert_eq!(back, exp);
    }
}
