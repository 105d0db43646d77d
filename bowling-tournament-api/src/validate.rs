//! Input sanitizing and validation.
//!
//! Every entity runs the same pipeline before it is written: [`Validate::sanitize`] cleans
//! all free text fields, [`Validate::validate_required`] checks that mandatory values are
//! present and [`Validate::validate_format`] checks formats, ranges and cross-field
//! invariants. [`validate`] and [`validate_many`] run the full pipeline.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::hash::Hash;

use chrono::{DateTime, SubsecRound, Utc};

use crate::id::Identifier;
use crate::money::{Money, MAX_MONEY};

/// Maximum length of a tournament name.
pub const MAX_TMNT_NAME_LENGTH: usize = 100;
/// Maximum length of short labels (event, division, squad names).
pub const MAX_LABEL_LENGTH: usize = 20;
/// Maximum length of player first and last names.
pub const MAX_PERSON_NAME_LENGTH: usize = 20;
/// Maximum length of a stage override reason.
pub const MAX_REASON_LENGTH: usize = 200;

pub const MIN_SORT_ORDER: i32 = 1;
pub const MAX_SORT_ORDER: i32 = 1_000_000;

pub const MAX_GAMES: i32 = 99;
pub const MAX_LANE: i32 = 200;
pub const MAX_AVERAGE: i32 = 300;
pub const MAX_HDCP_FROM: i32 = 300;
pub const MAX_HDCP_PER: f64 = 1.25;
pub const MAX_TEAM_SIZE: i32 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required value is empty.
    Missing,
    /// A value is present but has an invalid format or is out of range.
    Invalid,
}

/// The first problem found while validating a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub kind: ErrorKind,
    /// Position of the failing element when validating a batch.
    pub index: Option<usize>,
}

impl ValidationError {
    #[inline]
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            kind: ErrorKind::Missing,
            index: None,
        }
    }

    #[inline]
    pub fn invalid(field: &'static str) -> Self {
        Self {
            field,
            kind: ErrorKind::Invalid,
            index: None,
        }
    }

    #[inline]
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::Missing => write!(f, "missing data in field `{}`", self.field)?,
            ErrorKind::Invalid => write!(f, "invalid data in field `{}`", self.field)?,
        }

        if let Some(index) = self.index {
            write!(f, " at index {}", index)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

pub type Result = std::result::Result<(), ValidationError>;

/// The sanitize and validate pipeline of a single entity.
pub trait Validate: Sized {
    /// Returns a copy with all free text fields cleaned using [`sanitize`].
    fn sanitize(&self) -> Self;

    fn validate_required(&self) -> Result;

    fn validate_format(&self) -> Result;

    /// The field reported when two elements of a batch share a [`Validate::batch_key`].
    const BATCH_KEY_FIELD: &'static str = "id";

    /// The key used to detect duplicates within a batch. `None` disables the check.
    fn batch_key(&self) -> Option<String> {
        None
    }

    /// Checks constraints spanning the elements of an already validated batch.
    fn validate_batch(values: &[Self]) -> Result {
        let _ = values;
        Ok(())
    }
}

/// Runs the full pipeline and returns the sanitized value.
pub fn validate<T>(value: &T) -> std::result::Result<T, ValidationError>
where
    T: Validate,
{
    let value = value.sanitize();
    value.validate_required()?;
    value.validate_format()?;
    Ok(value)
}

/// Runs the full pipeline on every element. The returned error carries the index of the
/// first failing element. Elements sharing the same [`Validate::batch_key`] are rejected.
pub fn validate_many<T>(values: &[T]) -> std::result::Result<Vec<T>, ValidationError>
where
    T: Validate,
{
    let mut keys = HashSet::with_capacity(values.len());
    let mut out = Vec::with_capacity(values.len());

    for (index, value) in values.iter().enumerate() {
        let value = validate(value).map_err(|err| err.at(index))?;

        if let Some(key) = value.batch_key() {
            if !keys.insert(key) {
                return Err(ValidationError::invalid(T::BATCH_KEY_FIELD).at(index));
            }
        }

        out.push(value);
    }

    T::validate_batch(&out)?;

    Ok(out)
}

/// Rejects the first element whose `key` was already seen in `values`.
pub fn unique_by<T, K, F>(field: &'static str, values: &[T], key: F) -> Result
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(values.len());

    for (index, value) in values.iter().enumerate() {
        if !seen.insert(key(value)) {
            return Err(ValidationError::invalid(field).at(index));
        }
    }

    Ok(())
}

/// Strips HTML tags and control characters, collapses whitespace and trims the input.
/// A `<` that does not open a tag is kept.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(len) = tag_len(rest) {
                rest = &rest[len..];
                continue;
            }
        }

        rest = &rest[c.len_utf8()..];

        match c {
            c if c.is_whitespace() => pending_space = true,
            c if c.is_control() => (),
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out
}

/// Returns the length in bytes of the tag `input` starts with. A tag opens with `<`
/// followed by a letter, `/` or `!` and runs up to the next `>`.
fn tag_len(input: &str) -> Option<usize> {
    match input[1..].chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' => (),
        _ => return None,
    }

    input.find('>').map(|end| end + 1)
}

/// Drops everything below milliseconds, the precision timestamps are stored with.
#[inline]
pub fn timestamp(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

/// Sanitizes an optional text, mapping empty results to `None`.
pub fn sanitize_opt(input: &Option<String>) -> Option<String> {
    input
        .as_deref()
        .map(sanitize)
        .filter(|s| !s.is_empty())
}

/// Checks a required, already sanitized text field.
pub fn required(field: &'static str, value: &str) -> Result {
    if value.is_empty() {
        Err(ValidationError::missing(field))
    } else {
        Ok(())
    }
}

/// Checks a required foreign key. An empty id is missing, anything else is checked in
/// [`valid_fk`].
pub fn required_id<I>(field: &'static str, id: &I) -> Result
where
    I: Identifier,
{
    required(field, id.as_str())
}

/// The foreign key helper: the id must carry the prefix of its kind.
pub fn valid_fk<I>(field: &'static str, id: &I) -> Result
where
    I: Identifier,
{
    check(field, id.is_valid())
}

pub fn valid_name(field: &'static str, value: &str, max: usize) -> Result {
    check(field, !value.is_empty() && value.chars().count() <= max)
}

pub fn in_range<T>(field: &'static str, value: T, min: T, max: T) -> Result
where
    T: PartialOrd,
{
    check(field, min <= value && value <= max)
}

pub fn valid_money(field: &'static str, value: Money, min: Money, max: Money) -> Result {
    in_range(field, value, min, max)
}

/// A fee must be positive and at most [`MAX_MONEY`].
pub fn valid_fee(field: &'static str, value: Money) -> Result {
    valid_money(field, value, Money::from_cents(1), MAX_MONEY)
}

/// Any non-negative amount up to [`MAX_MONEY`].
pub fn valid_amount(field: &'static str, value: Money) -> Result {
    valid_money(field, value, Money::ZERO, MAX_MONEY)
}

pub fn valid_sort_order(value: i32) -> Result {
    in_range("sort_order", value, MIN_SORT_ORDER, MAX_SORT_ORDER)
}

#[inline]
pub fn check(field: &'static str, ok: bool) -> Result {
    if ok {
        Ok(())
    } else {
        Err(ValidationError::invalid(field))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike, Utc};

    use super::{
        in_range, sanitize, timestamp, valid_fee, valid_fk, valid_name, validate_many, ErrorKind,
        Validate, ValidationError,
    };
    use crate::id::{DivId, TmntId};
    use crate::money::Money;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  Singles  "), "Singles");
        assert_eq!(sanitize("<b>Scratch</b> Div"), "Scratch Div");
        assert_eq!(sanitize("a\u{0007}b"), "ab");
        assert_eq!(sanitize("Late\n\t  Squad"), "Late Squad");
        assert_eq!(sanitize("<script>alert(1)</script>"), "alert(1)");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize("3 > 2"), "3 > 2");
        assert_eq!(sanitize("Under <200 avg"), "Under <200 avg");
        assert_eq!(sanitize("A < B Division"), "A < B Division");
        assert_eq!(sanitize("Seniors <b"), "Seniors <b");
        assert_eq!(sanitize("<!-- note -->Open"), "Open");
        assert_eq!(sanitize("Club <i>A</i> <3"), "Club A <3");
    }

    #[test]
    fn test_timestamp() {
        let value = Utc.timestamp_opt(1_797_757_200, 123_456_789).unwrap();
        let value = timestamp(value);
        assert_eq!(value.nanosecond(), 123_000_000);
        assert_eq!(value.timestamp(), 1_797_757_200);
        assert_eq!(timestamp(value), value);
    }

    #[test]
    fn test_primitives() {
        assert!(valid_name("div_name", "Scratch", 20).is_ok());
        assert!(valid_name("div_name", "", 20).is_err());
        assert!(valid_name("div_name", "This name is far too long", 20).is_err());

        assert!(in_range("games", 3, 1, 99).is_ok());
        assert!(in_range("games", 0, 1, 99).is_err());
        assert!(in_range("hdcp_per", 1.3, 0.0, 1.25).is_err());

        assert!(valid_fee("fee", Money::from_cents(500)).is_ok());
        assert!(valid_fee("fee", Money::ZERO).is_err());
        assert!(valid_fee("fee", Money::from_cents(100_000_000)).is_err());

        let id = TmntId::generate();
        assert!(valid_fk("tmnt_id", &id).is_ok());
        let wrong = TmntId::from(DivId::generate().to_string());
        assert_eq!(
            valid_fk("tmnt_id", &wrong),
            Err(ValidationError::invalid("tmnt_id"))
        );
    }

    #[derive(Clone, Debug)]
    struct Label(String);

    impl Validate for Label {
        const BATCH_KEY_FIELD: &'static str = "label";

        fn sanitize(&self) -> Self {
            Self(sanitize(&self.0))
        }

        fn validate_required(&self) -> super::Result {
            super::required("label", &self.0)
        }

        fn validate_format(&self) -> super::Result {
            valid_name("label", &self.0, 5)
        }

        fn batch_key(&self) -> Option<String> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn test_validate_many() {
        let labels = vec![Label(" a ".into()), Label("b".into())];
        let out = validate_many(&labels).unwrap();
        assert_eq!(out[0].0, "a");

        let labels = vec![Label("a".into()), Label("<i></i>".into())];
        let err = validate_many(&labels).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Missing);
        assert_eq!(err.index, Some(1));
        assert_eq!(err.to_string(), "missing data in field `label` at index 1");

        let labels = vec![Label("a".into()), Label("abcdef".into())];
        assert_eq!(validate_many(&labels).unwrap_err().kind, ErrorKind::Invalid);

        let labels = vec![Label("a".into()), Label(" a".into())];
        assert_eq!(
            validate_many(&labels).unwrap_err(),
            ValidationError::invalid("label").at(1)
        );
    }
}
