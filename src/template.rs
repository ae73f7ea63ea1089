//! QNM template table
//!
//! Reference frequencies and correction coefficients keyed by mode `(l, n)`,
//! each mode holding its entries in strictly ascending spin order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interp::SPIN_MATCH_TOLERANCE;
use crate::RingdownError;

/// Angular index `l` and overtone index `n` of a quasinormal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct ModeKey {
    pub l: u32,
    pub n: u32,
}

impl ModeKey {
    /// The fundamental quadrupole mode `(2, 0)`.
    pub const FUNDAMENTAL: ModeKey = ModeKey { l: 2, n: 0 };

    pub const fn new(l: u32, n: u32) -> Self {
        Self { l, n }
    }
}

impl Default for ModeKey {
    fn default() -> Self {
        Self::FUNDAMENTAL
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.l, self.n)
    }
}

impl From<(u32, u32)> for ModeKey {
    fn from((l, n): (u32, u32)) -> Self {
        Self { l, n }
    }
}

impl From<ModeKey> for (u32, u32) {
    fn from(mode: ModeKey) -> Self {
        (mode.l, mode.n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid mode `{0}`: expected `l,n` with non-negative integers")]
pub struct ParseModeError(String);

impl FromStr for ModeKey {
    type Err = ParseModeError;

    /// Accepts `2,0`, `2:0` and `(2, 0)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (l, n) = trimmed
            .split_once(|c: char| c == ',' || c == ':')
            .ok_or_else(|| ParseModeError(s.to_string()))?;

        let l = l.trim().parse().map_err(|_| ParseModeError(s.to_string()))?;
        let n = n.trim().parse().map_err(|_| ParseModeError(s.to_string()))?;
        Ok(Self { l, n })
    }
}

/// One tabulated QNM reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QnmEntry {
    /// Dimensionless spin `a`
    pub spin: f64,
    /// Real part of the reference frequency
    pub omega0_real: f64,
    /// Imaginary part of the reference frequency (negative for decay)
    pub omega0_imag: f64,
    /// First-order real correction coefficient
    pub alpha1: f64,
    /// Second-order real correction coefficient
    pub alpha2: f64,
    /// First-order imaginary correction coefficient
    pub beta1: f64,
    /// Second-order imaginary correction coefficient
    pub beta2: f64,
}

impl QnmEntry {
    /// Create an entry with first-order corrections only.
    pub fn new(spin: f64, omega0_real: f64, omega0_imag: f64, alpha1: f64, beta1: f64) -> Self {
        Self {
            spin,
            omega0_real,
            omega0_imag,
            alpha1,
            alpha2: 0.0,
            beta1,
            beta2: 0.0,
        }
    }

    /// Set the second-order correction coefficients.
    pub fn with_second_order(mut self, alpha2: f64, beta2: f64) -> Self {
        self.alpha2 = alpha2;
        self.beta2 = beta2;
        self
    }

    fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("a", self.spin),
            ("omega0_R", self.omega0_real),
            ("omega0_I", self.omega0_imag),
            ("alpha1", self.alpha1),
            ("alpha2", self.alpha2),
            ("beta1", self.beta1),
            ("beta2", self.beta2),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(field, _)| field)
    }
}

/// Raw table row as handed over by a tabular source.
///
/// Every field is kept as text so that a missing or unparseable value is
/// reported by name instead of failing inside the reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRow {
    #[serde(rename = "a", default)]
    pub spin: Option<String>,
    #[serde(default)]
    pub l: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(rename = "omega0_R", default)]
    pub omega0_real: Option<String>,
    #[serde(rename = "omega0_I", default)]
    pub omega0_imag: Option<String>,
    #[serde(default)]
    pub alpha1: Option<String>,
    #[serde(default)]
    pub beta1: Option<String>,
    #[serde(default)]
    pub alpha2: Option<String>,
    #[serde(default)]
    pub beta2: Option<String>,
}

impl TemplateRow {
    /// Convert into a typed entry. `row` is the 1-based data row used in errors.
    pub fn parse(&self, row: usize) -> Result<(ModeKey, QnmEntry), RingdownError> {
        let mode = ModeKey::new(
            parse_index(&self.l, row, "l")?,
            parse_index(&self.n, row, "n")?,
        );

        let entry = QnmEntry {
            spin: parse_required(&self.spin, row, "a")?,
            omega0_real: parse_required(&self.omega0_real, row, "omega0_R")?,
            omega0_imag: parse_required(&self.omega0_imag, row, "omega0_I")?,
            alpha1: parse_required(&self.alpha1, row, "alpha1")?,
            alpha2: parse_optional(&self.alpha2, row, "alpha2")?,
            beta1: parse_required(&self.beta1, row, "beta1")?,
            beta2: parse_optional(&self.beta2, row, "beta2")?,
        };

        Ok((mode, entry))
    }
}

fn malformed(row: usize, field: &'static str, reason: impl Into<String>) -> RingdownError {
    RingdownError::MalformedRow {
        row,
        field,
        reason: reason.into(),
    }
}

fn required_text<'a>(
    value: &'a Option<String>,
    row: usize,
    field: &'static str,
) -> Result<&'a str, RingdownError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(malformed(row, field, "is missing")),
    }
}

fn parse_number(text: &str, row: usize, field: &'static str) -> Result<f64, RingdownError> {
    let value: f64 = text
        .parse()
        .map_err(|_| malformed(row, field, format!("is not a number: `{text}`")))?;

    if !value.is_finite() {
        return Err(malformed(row, field, format!("is not finite: `{text}`")));
    }

    Ok(value)
}

fn parse_required(
    value: &Option<String>,
    row: usize,
    field: &'static str,
) -> Result<f64, RingdownError> {
    parse_number(required_text(value, row, field)?, row, field)
}

// Second-order coefficients may be unmeasured for some modes.
fn parse_optional(
    value: &Option<String>,
    row: usize,
    field: &'static str,
) -> Result<f64, RingdownError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(text) => parse_number(text, row, field),
    }
}

fn parse_index(
    value: &Option<String>,
    row: usize,
    field: &'static str,
) -> Result<u32, RingdownError> {
    let text = required_text(value, row, field)?;
    text.parse()
        .map_err(|_| malformed(row, field, format!("is not a non-negative integer: `{text}`")))
}

/// Immutable QNM template table.
///
/// Built once, then shared by reference across any number of queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateStore {
    modes: BTreeMap<ModeKey, Vec<QnmEntry>>,
}

impl TemplateStore {
    /// Build the store from raw table rows. Row order is insignificant.
    pub fn load<I>(rows: I) -> Result<Self, RingdownError>
    where
        I: IntoIterator<Item = TemplateRow>,
    {
        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| row.parse(idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let store = Self::from_entries(entries)?;
        log::info!(
            "Loaded QNM data for {} modes ({} entries).",
            store.mode_count(),
            store.len()
        );
        Ok(store)
    }

    /// Build the store from typed entries.
    ///
    /// Spins closer than [`SPIN_MATCH_TOLERANCE`] within one mode count as
    /// duplicates, since lookups could not tell them apart.
    pub fn from_entries<I>(entries: I) -> Result<Self, RingdownError>
    where
        I: IntoIterator<Item = (ModeKey, QnmEntry)>,
    {
        let mut modes: BTreeMap<ModeKey, Vec<QnmEntry>> = BTreeMap::new();

        for (idx, (mode, entry)) in entries.into_iter().enumerate() {
            if let Some(field) = entry.non_finite_field() {
                return Err(malformed(idx + 1, field, "is not finite"));
            }
            modes.entry(mode).or_default().push(entry);
        }

        for (mode, entries) in modes.iter_mut() {
            entries.sort_by(|lhs, rhs| lhs.spin.total_cmp(&rhs.spin));

            if let Some(pair) = entries
                .windows(2)
                .find(|pair| pair[1].spin - pair[0].spin < SPIN_MATCH_TOLERANCE)
            {
                return Err(RingdownError::DuplicateSpin {
                    mode: *mode,
                    spin: pair[1].spin,
                });
            }
        }

        Ok(Self { modes })
    }

    /// Set of tabulated modes.
    pub fn modes(&self) -> BTreeSet<ModeKey> {
        self.modes.keys().copied().collect()
    }

    pub fn contains_mode(&self, mode: ModeKey) -> bool {
        self.modes.contains_key(&mode)
    }

    /// Entries of one mode in ascending spin order.
    pub fn entries_for(&self, mode: ModeKey) -> Result<&[QnmEntry], RingdownError> {
        self.modes
            .get(&mode)
            .map(Vec::as_slice)
            .ok_or(RingdownError::UnknownMode(mode))
    }

    /// Inclusive `[min, max]` spin bounds of one mode.
    pub fn spin_range(&self, mode: ModeKey) -> Result<(f64, f64), RingdownError> {
        let entries = self.entries_for(mode)?;
        match (entries.first(), entries.last()) {
            (Some(first), Some(last)) => Ok((first.spin, last.spin)),
            _ => Err(RingdownError::UnknownMode(mode)),
        }
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    /// Total number of entries across all modes.
    pub fn len(&self) -> usize {
        self.modes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    pub(crate) fn row(a: &str, l: &str, n: &str, re: &str, im: &str) -> TemplateRow {
        TemplateRow {
            spin: text(a),
            l: text(l),
            n: text(n),
            omega0_real: text(re),
            omega0_imag: text(im),
            alpha1: text("0.02"),
            beta1: text("-0.01"),
            alpha2: None,
            beta2: None,
        }
    }

    /// Two-point `(2, 0)` table used across the crate's tests.
    pub(crate) fn two_point_store() -> TemplateStore {
        TemplateStore::from_entries([
            (ModeKey::FUNDAMENTAL, QnmEntry::new(0.0, 0.50, -0.10, 0.02, -0.01)),
            (ModeKey::FUNDAMENTAL, QnmEntry::new(1.0, 0.60, -0.08, 0.03, -0.015)),
        ])
        .expect("two-point table should load")
    }

    #[test]
    fn test_load_groups_and_sorts_by_spin() {
        let rows = vec![
            row("0.9", "2", "0", "0.67", "-0.065"),
            row("0.0", "3", "0", "0.60", "-0.093"),
            row("0.0", "2", "0", "0.37", "-0.089"),
            row("0.5", "2", "0", "0.46", "-0.086"),
        ];
        let store = TemplateStore::load(rows).unwrap();

        assert_eq!(store.mode_count(), 2);
        assert_eq!(store.len(), 4);

        let spins: Vec<f64> = store
            .entries_for(ModeKey::FUNDAMENTAL)
            .unwrap()
            .iter()
            .map(|entry| entry.spin)
            .collect();
        assert_eq!(spins, vec![0.0, 0.5, 0.9]);
        assert_eq!(store.spin_range(ModeKey::new(3, 0)).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_optional_coefficients_default_to_zero() {
        let mut raw = row("0.0", "2", "0", "0.37", "-0.089");
        raw.alpha2 = text("  ");
        let store = TemplateStore::load([raw]).unwrap();
        let entry = store.entries_for(ModeKey::FUNDAMENTAL).unwrap()[0];

        assert_eq!(entry.alpha2, 0.0);
        assert_eq!(entry.beta2, 0.0);
        assert_eq!(entry.alpha1, 0.02);
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let mut raw = row("0.0", "2", "0", "0.37", "-0.089");
        raw.omega0_imag = None;
        let err = TemplateStore::load([row("0.5", "2", "0", "0.4", "-0.08"), raw]).unwrap_err();

        match err {
            RingdownError::MalformedRow { row, field, .. } => {
                assert_eq!(row, 2);
                assert_eq!(field, "omega0_I");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_fields_are_malformed() {
        let err = TemplateStore::load([row("0.0", "2", "0", "abc", "-0.089")]).unwrap_err();
        assert!(matches!(
            err,
            RingdownError::MalformedRow { field: "omega0_R", .. }
        ));

        let err = TemplateStore::load([row("0.0", "-2", "0", "0.37", "-0.089")]).unwrap_err();
        assert!(matches!(err, RingdownError::MalformedRow { field: "l", .. }));

        let err = TemplateStore::load([row("NaN", "2", "0", "0.37", "-0.089")]).unwrap_err();
        assert!(matches!(err, RingdownError::MalformedRow { field: "a", .. }));

        let mut raw = row("0.0", "2", "0", "0.37", "-0.089");
        raw.beta2 = text("x");
        let err = TemplateStore::load([raw]).unwrap_err();
        assert!(matches!(err, RingdownError::MalformedRow { field: "beta2", .. }));
    }

    #[test]
    fn test_duplicate_spin_is_rejected() {
        let rows = vec![
            row("0.5", "2", "0", "0.46", "-0.086"),
            row("0.0", "2", "0", "0.37", "-0.089"),
            row("0.5", "2", "0", "0.47", "-0.085"),
        ];
        let err = TemplateStore::load(rows).unwrap_err();

        match err {
            RingdownError::DuplicateSpin { mode, spin } => {
                assert_eq!(mode, ModeKey::FUNDAMENTAL);
                assert_eq!(spin, 0.5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spins_within_match_tolerance_are_duplicates() {
        let rows = vec![
            row("0.5", "2", "0", "0.46", "-0.086"),
            row("0.5000005", "2", "0", "0.47", "-0.085"),
        ];
        let err = TemplateStore::load(rows).unwrap_err();
        assert!(matches!(
            err,
            RingdownError::DuplicateSpin { mode, .. } if mode == ModeKey::FUNDAMENTAL
        ));

        let rows = vec![
            row("0.5", "2", "0", "0.46", "-0.086"),
            row("0.50001", "2", "0", "0.47", "-0.085"),
        ];
        assert!(TemplateStore::load(rows).is_ok());
    }

    #[test]
    fn test_same_spin_in_different_modes_is_fine() {
        let rows = vec![
            row("0.5", "2", "0", "0.46", "-0.086"),
            row("0.5", "2", "1", "0.44", "-0.261"),
        ];
        assert!(TemplateStore::load(rows).is_ok());
    }

    #[test]
    fn test_unknown_mode() {
        let store = two_point_store();
        let err = store.entries_for(ModeKey::new(4, 1)).unwrap_err();
        assert!(matches!(err, RingdownError::UnknownMode(mode) if mode == ModeKey::new(4, 1)));
        assert!(!store.contains_mode(ModeKey::new(4, 1)));
        assert_eq!(store.modes().into_iter().collect::<Vec<_>>(), vec![ModeKey::FUNDAMENTAL]);
    }

    #[test]
    fn test_empty_store() {
        let store = TemplateStore::load(Vec::new()).unwrap();
        assert!(store.is_empty());
        assert!(store.entries_for(ModeKey::FUNDAMENTAL).is_err());
    }

    #[test]
    fn test_mode_key_parse_and_display() {
        assert_eq!("2,0".parse::<ModeKey>().unwrap(), ModeKey::new(2, 0));
        assert_eq!("3:1".parse::<ModeKey>().unwrap(), ModeKey::new(3, 1));
        assert_eq!("(2, 1)".parse::<ModeKey>().unwrap(), ModeKey::new(2, 1));
        assert!("2".parse::<ModeKey>().is_err());
        assert!("a,b".parse::<ModeKey>().is_err());
        assert_eq!(ModeKey::new(2, 1).to_string(), "(2, 1)");
    }
}
