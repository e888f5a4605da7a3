//! The selection function itself.

use crate::library::{items_for, prompts_for, PROMPTS_PER_BAND};
use calma_core::{BreathingPattern, CalmaError, ContentItem, ContentKind, Experience, Feeling, Severity};

/// Severity band index used to slice the prompt table:
/// 1-3 → 0 (low), 4-6 → 1 (mid), 7-10 → 2 (high).
pub fn prompt_band(severity: Severity) -> usize {
    match severity.get() {
        1..=3 => 0,
        4..=6 => 1,
        _ => 2,
    }
}

fn duration_minutes(severity: Severity) -> u32 {
    match severity.get() {
        8..=10 => 10,
        5..=7 => 7,
        3..=4 => 5,
        _ => 3,
    }
}

fn first_of(feeling: Feeling, kind: ContentKind) -> Result<ContentItem, CalmaError> {
    items_for(feeling, kind)
        .first()
        .map(|item| (*item).clone())
        .ok_or(CalmaError::EmptyCatalog { feeling, kind })
}

/// Map a check-in to a relaxation experience.
///
/// Deterministic over the built-in catalog: the same `(feeling, severity)`
/// always yields the same bundle.
pub fn select_experience(feeling: Feeling, severity: Severity) -> Result<Experience, CalmaError> {
    let s = severity.get();

    let primary_kind = if s >= 7 {
        ContentKind::NatureVideo
    } else {
        ContentKind::Music
    };

    let mut items = vec![first_of(feeling, primary_kind)?];

    if s >= 5 {
        items.push(first_of(feeling, ContentKind::AmbientSound)?);
    }

    // Under a video at the top severities, layer in a quiet second track.
    if s >= 8 && primary_kind == ContentKind::NatureVideo {
        let music = items_for(feeling, ContentKind::Music);
        let secondary = music
            .get(1)
            .or_else(|| music.first())
            .map(|item| (*item).clone())
            .ok_or(CalmaError::EmptyCatalog {
                feeling,
                kind: ContentKind::Music,
            })?;
        items.push(secondary);
    }

    let band = prompt_band(severity);
    let prompts: Vec<String> = prompts_for(feeling)[band * PROMPTS_PER_BAND..]
        .iter()
        .take(PROMPTS_PER_BAND)
        .map(|p| p.to_string())
        .collect();

    let breathing = (s >= 6).then(|| BreathingPattern::for_feeling(feeling));

    let experience = Experience {
        primary: primary_kind,
        items,
        prompts,
        breathing,
        duration_minutes: duration_minutes(severity),
    };

    tracing::debug!(
        feeling = %feeling,
        severity = s,
        items = experience.items.len(),
        duration = experience.duration_minutes,
        "selected experience"
    );

    Ok(experience)
}
