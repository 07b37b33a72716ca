//! Severity derivation for recall records.
//!
//! FDA assigns every enforcement report a classification tier (I, II, III,
//! with I most severe). This module derives the pipeline's own three-level
//! risk label from that tier plus keyword signals in the free-text recall
//! reason. The derivation is centralized here as one pure function so it
//! can be tested exhaustively and produces identical output for identical
//! input across runs.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Classification tier
// ---------------------------------------------------------------------------

/// FDA-assigned recall classification tier, I being most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    I,
    II,
    III,
}

impl Classification {
    /// Parses the classification field as it appears in openFDA records
    /// ("Class I" / "Class II" / "Class III") or as a bare tier code.
    /// Returns `None` for anything unrecognized — the classifier defaults
    /// unknown tiers to `Severity::Medium`, it never guesses a tier.
    pub fn from_code(code: &str) -> Option<Classification> {
        match code.trim() {
            "Class I" | "I" => Some(Classification::I),
            "Class II" | "II" => Some(Classification::II),
            "Class III" | "III" => Some(Classification::III),
            _ => None,
        }
    }

    /// Base severity mapping: I → high, II → medium, III → low.
    pub fn base_severity(self) -> Severity {
        match self {
            Classification::I => Severity::High,
            Classification::II => Severity::Medium,
            Classification::III => Severity::Low,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::I => write!(f, "Class I"),
            Classification::II => write!(f, "Class II"),
            Classification::III => write!(f, "Class III"),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity label
// ---------------------------------------------------------------------------

/// Derived three-level risk label, in ascending order of severity.
///
/// Distinct from the raw classification tier: a keyword boost may place a
/// record one tier above its classification's base severity, never below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// One tier up, saturating at `High`.
    fn escalate(self) -> Severity {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High => Severity::High,
        }
    }

    /// Label used in aggregate tables and chart series.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// All severities, ascending. Useful for exhaustive table rows.
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derives the severity label for one record.
///
/// Rules, applied in order:
///   1. Base mapping from the classification tier; a missing or unrecognized
///      tier defaults to `Medium` before boost evaluation.
///   2. Keyword boost: the reason text is scanned case-insensitively for
///      each configured keyword (plain substring match). Any match escalates
///      exactly one tier; multiple matches still escalate one tier total.
///      The boost only ever raises severity, never lowers it.
///
/// Pure function: no randomness, no external state, no clock.
pub fn classify(
    classification: Option<Classification>,
    reason_text: &str,
    boost_keywords: &[String],
) -> Severity {
    let base = classification
        .map(Classification::base_severity)
        .unwrap_or(Severity::Medium);

    let reason = reason_text.to_lowercase();
    let boosted = boost_keywords
        .iter()
        .any(|kw| !kw.is_empty() && reason.contains(&kw.to_lowercase()));

    if boosted { base.escalate() } else { base }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
