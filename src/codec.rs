use crate::normalize::Selection;
use time::{
    format_description::{well_known::Iso8601, FormatItem},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime,
};

/// The wire format for dates: `YYYY-MM-DD`
pub(crate) static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The symbolic input meaning "the current date at call time"
pub const TODAY: &str = "today";

/// A date as supplied by a caller for the `value`, `min`, or `max` of a
/// picker
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DateInput {
    /// Resolved to the current date when the picker is rendered
    Today,
    Date(Date),
    /// Only the calendar date is sent; the time of day is dropped
    DateTime(PrimitiveDateTime),
    /// Only the calendar date in the value's own offset is sent
    Zoned(OffsetDateTime),
    /// Sent as-is.  Callers are trusted to supply `YYYY-MM-DD` strings, but
    /// nothing is validated here.
    Iso(String),
}

impl DateInput {
    /// Returns the calendar date this input denotes, with `Today` taken to
    /// be `today`.  `Iso` strings that are not strictly `YYYY-MM-DD` denote
    /// nothing.
    pub fn resolve(&self, today: Date) -> Option<Date> {
        match self {
            DateInput::Today => Some(today),
            DateInput::Iso(s) if s == TODAY => Some(today),
            DateInput::Date(d) => Some(*d),
            DateInput::DateTime(dt) => Some(dt.date()),
            DateInput::Zoned(dt) => Some(dt.date()),
            DateInput::Iso(s) => Date::parse(s, &YMD_FMT).ok(),
        }
    }
}

impl From<Date> for DateInput {
    fn from(value: Date) -> DateInput {
        DateInput::Date(value)
    }
}

impl From<PrimitiveDateTime> for DateInput {
    fn from(value: PrimitiveDateTime) -> DateInput {
        DateInput::DateTime(value)
    }
}

impl From<OffsetDateTime> for DateInput {
    fn from(value: OffsetDateTime) -> DateInput {
        DateInput::Zoned(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> DateInput {
        if value == TODAY {
            DateInput::Today
        } else {
            DateInput::Iso(value.to_owned())
        }
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> DateInput {
        if value == TODAY {
            DateInput::Today
        } else {
            DateInput::Iso(value)
        }
    }
}

/// Convert an optional input to its wire form.
///
/// `Today` is passed through as the literal `"today"`; resolving it is up to
/// whoever sends the payload.  A date that cannot be written as `YYYY-MM-DD`
/// (i.e., one before year 1) is treated as absent.
pub fn encode(input: Option<&DateInput>) -> Option<String> {
    match input? {
        DateInput::Today => Some(String::from(TODAY)),
        DateInput::Iso(s) => Some(s.clone()),
        DateInput::Date(d) => format_ymd(*d),
        DateInput::DateTime(dt) => format_ymd(dt.date()),
        DateInput::Zoned(dt) => format_ymd(dt.date()),
    }
}

pub(crate) fn format_ymd(date: Date) -> Option<String> {
    if !(1..=9999).contains(&date.year()) {
        return None;
    }
    date.format(&YMD_FMT).ok()
}

/// Best-effort conversion of a string reported by a widget to a date.
///
/// ISO 8601 date-times (with or without an offset) give their date
/// component, then plain `YYYY-MM-DD` is tried.  Anything else comes back
/// unchanged as [`Selection::Unparsed`]; this never returns
/// [`Selection::Empty`].
pub fn decode(raw: &str) -> Selection {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Selection::Date(dt.date());
    }
    if let Ok(dt) = PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Selection::Date(dt.date());
    }
    Date::parse(raw, &YMD_FMT).map_or_else(|_| Selection::Unparsed(raw.to_owned()), Selection::Date)
}
