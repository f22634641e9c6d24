use super::matcher::{MatchKind, MatchOutcome};
use crate::compatibility::domain::{
    AnalysisResult, CompatibilityRecord, CompatibilityStatus, Component, ComponentKey,
    DenyListEntry, ResultSource, Version,
};

/// Confidence of a deny-list verdict
pub const DENY_LIST_CONFIDENCE: f64 = 1.0;
/// Confidence of a rule hit on an exact name match
pub const EXACT_MATCH_CONFIDENCE: f64 = 0.95;
/// Confidence of a rule hit on an alias match
pub const ALIAS_MATCH_CONFIDENCE: f64 = 0.9;
/// Ceiling for anything derived from a fuzzy match
pub const FUZZY_CONFIDENCE_CEILING: f64 = 0.8;
/// Version is below the record's minimum supported version
pub const BELOW_MINIMUM_CONFIDENCE: f64 = 0.85;
/// Version unknown, but the record names a minimum to check against
pub const VERSION_UNKNOWN_WITH_MINIMUM_CONFIDENCE: f64 = 0.6;
/// Version unknown and nothing to guide the check
pub const VERSION_UNKNOWN_CONFIDENCE: f64 = 0.5;
/// Version parsed but no rule covers it
pub const UNCOVERED_VERSION_CONFIDENCE: f64 = 0.6;
/// No knowledge base entry at all
pub const NO_MATCH_CONFIDENCE: f64 = 0.3;

/// StatusResolver - applies the priority decision table to matcher output
///
/// First applicable rule wins:
/// 1. deny-list hit → `incompatible`
/// 2. record hit with a parseable version → first declared rule whose range
///    contains the version
/// 3. record hit, version unknown, record has a minimum → `needs_version_verification`
/// 4. no record → `unknown`
///
/// Pure and deterministic: the same inputs always produce the same result.
pub struct StatusResolver;

impl StatusResolver {
    pub fn resolve(
        component: &Component,
        key: ComponentKey,
        outcome: &MatchOutcome<'_>,
    ) -> AnalysisResult {
        match outcome {
            MatchOutcome::Denied(entry) => Self::resolve_denied(component, key, entry),
            MatchOutcome::Matched {
                record,
                kind,
                matched_name,
            } => {
                let result = Self::resolve_record(component, key, record, base_confidence(kind))
                    .with_matched_name(matched_name.clone());
                match kind {
                    MatchKind::Fuzzy { score, .. } => {
                        let note =
                            format!("Fuzzy match on '{}' (similarity {:.2})", matched_name, score);
                        let notes = join_notes(&result.notes, &note);
                        result.with_notes(notes).cap_confidence(FUZZY_CONFIDENCE_CEILING)
                    }
                    MatchKind::Exact | MatchKind::Alias => result,
                }
            }
            MatchOutcome::NoMatch => AnalysisResult::new(
                key,
                component.clone(),
                CompatibilityStatus::Unknown,
                NO_MATCH_CONFIDENCE,
                ResultSource::Static,
            )
            .with_notes("No knowledge base entry for this component"),
        }
    }

    fn resolve_denied(
        component: &Component,
        key: ComponentKey,
        entry: &DenyListEntry,
    ) -> AnalysisResult {
        let mut notes = format!("Deny list: {}", entry.reason);
        if let Some(alternative) = &entry.recommended_alternative {
            notes.push_str(&format!(". Recommended alternative: {}", alternative));
        }

        AnalysisResult::new(
            key,
            component.clone(),
            CompatibilityStatus::Incompatible,
            DENY_LIST_CONFIDENCE,
            ResultSource::Static,
        )
        .with_notes(notes)
        .with_minimum_supported_version(entry.minimum_supported_version.clone())
        .with_matched_name(entry.name.clone())
    }

    fn resolve_record(
        component: &Component,
        key: ComponentKey,
        record: &CompatibilityRecord,
        confidence: f64,
    ) -> AnalysisResult {
        let base = |status: CompatibilityStatus, confidence: f64| {
            AnalysisResult::new(
                key.clone(),
                component.clone(),
                status,
                confidence,
                ResultSource::Static,
            )
            .with_minimum_supported_version(record.minimum_supported_version.clone())
            .with_recommended_version(record.recommended_version.clone())
        };

        let Some(version) = Version::parse(component.version()) else {
            return Self::resolve_unknown_version(record, confidence, base);
        };

        if let Some(rule) = record.rules.iter().find(|rule| rule.range.contains(&version)) {
            return base(rule.status, confidence)
                .with_notes(rule.notes.clone())
                .with_matched_rule(rule.range.to_string());
        }

        let minimum = record
            .minimum_supported_version
            .as_deref()
            .and_then(|raw| Version::parse(raw).map(|parsed| (raw, parsed)));

        match minimum {
            Some((raw, parsed)) if version < parsed => {
                let recommended = record
                    .recommended_version
                    .clone()
                    .unwrap_or_else(|| raw.to_string());
                base(CompatibilityStatus::NeedsUpgrade, BELOW_MINIMUM_CONFIDENCE)
                    .with_recommended_version(Some(recommended.clone()))
                    .with_notes(format!(
                        "Version {} is below the minimum supported version {}; upgrade to {}",
                        component.version().trim(),
                        raw,
                        recommended
                    ))
            }
            Some((raw, _)) if record.rules.is_empty() => {
                base(CompatibilityStatus::Compatible, confidence)
                    .with_notes(format!("Meets minimum supported version {}", raw))
            }
            _ => base(
                CompatibilityStatus::NeedsVerification,
                UNCOVERED_VERSION_CONFIDENCE,
            )
            .with_notes(format!(
                "No compatibility rule covers version {}",
                component.version().trim()
            )),
        }
    }

    fn resolve_unknown_version(
        record: &CompatibilityRecord,
        confidence: f64,
        base: impl Fn(CompatibilityStatus, f64) -> AnalysisResult,
    ) -> AnalysisResult {
        if let Some(minimum) = &record.minimum_supported_version {
            return base(
                CompatibilityStatus::NeedsVersionVerification,
                VERSION_UNKNOWN_WITH_MINIMUM_CONFIDENCE,
            )
            .with_notes(format!(
                "Version unknown; verify the installed version is at least {}",
                minimum
            ));
        }

        match record.rules.first() {
            Some(rule) if record.is_version_independent() => base(rule.status, confidence)
                .with_notes(rule.notes.clone())
                .with_matched_rule(rule.range.to_string()),
            _ => base(
                CompatibilityStatus::NeedsVersionVerification,
                VERSION_UNKNOWN_CONFIDENCE,
            )
            .with_notes("Version unknown; compatibility depends on the installed version"),
        }
    }
}

fn base_confidence(kind: &MatchKind) -> f64 {
    match kind {
        MatchKind::Exact => EXACT_MATCH_CONFIDENCE,
        MatchKind::Alias => ALIAS_MATCH_CONFIDENCE,
        MatchKind::Fuzzy { .. } => FUZZY_CONFIDENCE_CEILING,
    }
}

fn join_notes(existing: &str, addition: &str) -> String {
    if existing.is_empty() {
        addition.to_string()
    } else {
        format!("{}. {}", existing.trim_end_matches('.'), addition)
    }
}
