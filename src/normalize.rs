use crate::codec::decode;
use log::debug;
use serde_json::{Map, Value};
use time::Date;

/// Whatever a widget host handed back after rendering a picker
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawResult {
    /// Nothing has been selected (or the widget has not reported yet)
    Absent,
    Text(String),
    /// A state object, normally of the form `{"value": ...}`
    Mapping(Map<String, Value>),
    /// Any other JSON value; never a valid selection
    Other(Value),
}

impl From<Value> for RawResult {
    fn from(value: Value) -> RawResult {
        match value {
            Value::Null => RawResult::Absent,
            Value::String(s) => RawResult::Text(s),
            Value::Object(map) => RawResult::Mapping(map),
            other => RawResult::Other(other),
        }
    }
}

impl From<Option<Value>> for RawResult {
    fn from(value: Option<Value>) -> RawResult {
        value.map_or(RawResult::Absent, RawResult::from)
    }
}

/// The outcome of rendering a picker
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Selection {
    /// No date is selected
    Empty,
    Date(Date),
    /// The widget reported a string that could not be read as a date
    Unparsed(String),
}

impl Selection {
    /// Returns the selected date, if there is one
    pub fn date(&self) -> Option<Date> {
        match self {
            Selection::Date(d) => Some(*d),
            Selection::Empty | Selection::Unparsed(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }
}

/// Collapse a widget's raw result into a [`Selection`].
///
/// Strings are decoded with [`decode`].  Mappings are unwrapped through
/// their `"value"` key first; a mapping without one is taken as the value
/// itself, which being a mapping yields [`Selection::Empty`].  Nothing here
/// fails: unexpected shapes are empty selections.
pub fn normalize(raw: RawResult) -> Selection {
    match raw {
        RawResult::Absent => Selection::Empty,
        RawResult::Text(s) => decode(&s),
        RawResult::Mapping(mut map) => {
            let value = map.remove("value").unwrap_or_else(|| {
                debug!("Widget state has no \"value\" key; using the whole object");
                Value::Object(map)
            });
            normalize_scalar(value)
        }
        RawResult::Other(value) => {
            debug!("Ignoring widget result of unexpected shape: {value}");
            Selection::Empty
        }
    }
}

fn normalize_scalar(value: Value) -> Selection {
    match value {
        Value::String(s) => decode(&s),
        Value::Null => Selection::Empty,
        other => {
            debug!("Ignoring non-string widget value: {other}");
            Selection::Empty
        }
    }
}
