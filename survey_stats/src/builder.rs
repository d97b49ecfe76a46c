pub use crate::config::*;

/// A builder for survey records.
///
/// Values are normalized as they are added: surrounding whitespace and one
/// pair of wrapping double quotes are removed, and empty values are left
/// out. The city is recognized with `City::normalize`.
///
/// ```
/// use survey_stats::builder::RecordBuilder;
/// use survey_stats::{City, Field};
///
/// let record = RecordBuilder::new()
///     .answer(Field::PricePerception, " \"Más bajos\" ")
///     .answer(Field::ExpertTrust, "   ")
///     .answer(Field::City, "UIO - Norte")
///     .build();
///
/// assert_eq!(record.get(Field::PricePerception), Some("Más bajos"));
/// assert_eq!(record.get(Field::ExpertTrust), None);
/// assert_eq!(record.city, Some(City::Quito));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    pub(crate) _record: SurveyRecord,
}

impl RecordBuilder {
    pub fn new() -> RecordBuilder {
        RecordBuilder {
            _record: SurveyRecord::default(),
        }
    }

    /// Sets the answer for a field, replacing any previous value.
    pub fn answer(mut self, field: Field, raw: &str) -> RecordBuilder {
        self.set(field, raw);
        self
    }

    pub fn set(&mut self, field: Field, raw: &str) {
        let value = normalize_value(raw);
        match field {
            Field::City => {
                self._record.city = value.map(|s| City::normalize(&s));
            }
            _ => {
                if let Some(slot) = self._record.answer_mut(field) {
                    *slot = value;
                }
            }
        }
    }

    pub fn build(self) -> SurveyRecord {
        self._record
    }
}

/// Trims a raw value and removes the double quotes wrapping it, including
/// nested pairs such as `""Alta""`. A lone leading or trailing quote is
/// removed as well. Returns `None` when nothing is left.
pub fn normalize_value(raw: &str) -> Option<String> {
    let mut res = raw.trim();
    while res.len() >= 2 && res.starts_with('"') && res.ends_with('"') {
        res = res[1..res.len() - 1].trim();
    }
    let res = res.strip_prefix('"').unwrap_or(res);
    let res = res.strip_suffix('"').unwrap_or(res).trim();
    if res.is_empty() {
        None
    } else {
        Some(res.to_string())
    }
}
