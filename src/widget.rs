use crate::codec::{encode, DateInput, TODAY};
use crate::format::DisplayFormat;
use crate::normalize::{normalize, RawResult, Selection};
use log::{debug, warn};
use serde::{Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Display format used when none is given
pub const DEFAULT_FORMAT: &str = "YYYY/MM/DD";

/// Width used when none is given
pub const DEFAULT_WIDTH: Width = Width::Stretch;

/// How wide the rendered picker should be
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Width {
    /// Fill the width of the parent container
    Stretch,
    /// Size to fit the picker's content
    Content,
    Pixels(NonZeroU32),
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::Stretch => write!(f, "stretch"),
            Width::Content => write!(f, "content"),
            Width::Pixels(px) => write!(f, "{px}"),
        }
    }
}

impl FromStr for Width {
    type Err = WidthError;

    fn from_str(s: &str) -> Result<Width, WidthError> {
        match s {
            "stretch" => Ok(Width::Stretch),
            "content" => Ok(Width::Content),
            _ => s
                .parse::<NonZeroU32>()
                .map(Width::Pixels)
                .map_err(|_| WidthError(s.to_owned())),
        }
    }
}

impl Serialize for Width {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid width {0:?}: expected \"stretch\", \"content\", or a positive number of pixels")]
pub struct WidthError(String);

/// The configuration sent to a widget host for a single render
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Payload {
    pub value: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub format: String,
    pub locale: Option<String>,
    pub disabled: bool,
    pub width: Width,
    pub clearable: bool,
}

/// The boundary to whatever actually displays the picker and reports the
/// user's choice
pub trait WidgetHost {
    type Error;

    /// Render a picker once with the given configuration and return its
    /// current value.  `key` identifies the picker instance across
    /// re-renders.
    fn invoke(&mut self, key: Option<&str>, payload: &Payload) -> Result<RawResult, Self::Error>;
}

impl<H: WidgetHost + ?Sized> WidgetHost for &mut H {
    type Error = H::Error;

    fn invoke(&mut self, key: Option<&str>, payload: &Payload) -> Result<RawResult, H::Error> {
        (**self).invoke(key, payload)
    }
}

/// A date picker, configured builder-style and rendered through a
/// [`WidgetHost`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatePicker {
    value: Option<DateInput>,
    min: Option<DateInput>,
    max: Option<DateInput>,
    key: Option<String>,
    locale: Option<String>,
    format: String,
    disabled: bool,
    width: Width,
    clearable: bool,
}

impl DatePicker {
    /// A picker showing today's date with no bounds
    pub fn new() -> DatePicker {
        DatePicker {
            value: Some(DateInput::Today),
            min: None,
            max: None,
            key: None,
            locale: None,
            format: String::from(DEFAULT_FORMAT),
            disabled: false,
            width: DEFAULT_WIDTH,
            clearable: false,
        }
    }

    pub fn value<D: Into<DateInput>>(mut self, value: D) -> DatePicker {
        self.value = Some(value.into());
        self
    }

    /// Start the picker with no date selected
    pub fn no_value(mut self) -> DatePicker {
        self.value = None;
        self
    }

    pub fn min<D: Into<DateInput>>(mut self, min: D) -> DatePicker {
        self.min = Some(min.into());
        self
    }

    pub fn max<D: Into<DateInput>>(mut self, max: D) -> DatePicker {
        self.max = Some(max.into());
        self
    }

    pub fn key<S: Into<String>>(mut self, key: S) -> DatePicker {
        self.key = Some(key.into());
        self
    }

    pub fn locale<S: Into<String>>(mut self, locale: S) -> DatePicker {
        self.locale = Some(locale.into());
        self
    }

    pub fn format<S: Into<String>>(mut self, format: S) -> DatePicker {
        self.format = format.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> DatePicker {
        self.disabled = disabled;
        self
    }

    pub fn width(mut self, width: Width) -> DatePicker {
        self.width = width;
        self
    }

    pub fn clearable(mut self, clearable: bool) -> DatePicker {
        self.clearable = clearable;
        self
    }

    /// Build the payload for a render happening on `today`
    pub fn payload(&self, today: Date) -> Payload {
        self.check_range(today);
        Payload {
            value: encode_on(self.value.as_ref(), today),
            min: encode_on(self.min.as_ref(), today),
            max: encode_on(self.max.as_ref(), today),
            format: self.format.clone(),
            locale: self.locale.clone(),
            disabled: self.disabled,
            width: self.width,
            clearable: self.clearable,
        }
    }

    /// Render the picker, taking "today" to be the current local date
    pub fn render<H: WidgetHost>(&self, host: H) -> Result<Selection, H::Error> {
        self.render_at(host, local_today())
    }

    /// Render the picker with "today" taken to be `today`.
    ///
    /// A value the host reports in the picker's display format rather than
    /// as an ISO date is still recognized as a date.
    pub fn render_at<H: WidgetHost>(
        &self,
        mut host: H,
        today: Date,
    ) -> Result<Selection, H::Error> {
        let payload = self.payload(today);
        let key = self.key.as_deref();
        debug!("Rendering date picker (key = {key:?}) with payload {payload:?}");
        let raw = host.invoke(key, &payload)?;
        debug!("Date picker returned {raw:?}");
        Ok(match normalize(raw) {
            Selection::Unparsed(s) => self.recover(s),
            sel => sel,
        })
    }

    fn recover(&self, s: String) -> Selection {
        match DisplayFormat::new(&self.format) {
            Ok(display) => display
                .parse(&s)
                .map_or(Selection::Unparsed(s), Selection::Date),
            Err(e) => {
                debug!("Not parsing result with display format {:?}: {e}", self.format);
                Selection::Unparsed(s)
            }
        }
    }

    fn check_range(&self, today: Date) {
        let resolve = |input: Option<&DateInput>| input.and_then(|d| d.resolve(today));
        let min = resolve(self.min.as_ref());
        let max = resolve(self.max.as_ref());
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                warn!("Date picker minimum {min} is after its maximum {max}");
                return;
            }
        }
        if let Some(value) = resolve(self.value.as_ref()) {
            if min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max) {
                warn!("Date picker value {value} is outside of its allowed range");
            }
        }
    }
}

impl Default for DatePicker {
    fn default() -> DatePicker {
        DatePicker::new()
    }
}

fn encode_on(input: Option<&DateInput>, today: Date) -> Option<String> {
    match input {
        Some(DateInput::Today) => encode(Some(&DateInput::Date(today))),
        Some(DateInput::Iso(s)) if s == TODAY => encode(Some(&DateInput::Date(today))),
        other => encode(other),
    }
}

fn local_today() -> Date {
    match OffsetDateTime::now_local() {
        Ok(now) => now.date(),
        Err(e) => {
            warn!("Failed to determine local date; using UTC: {e}");
            OffsetDateTime::now_utc().date()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::convert::Infallible;
    use time::macros::{date, datetime};

    const TODAY: Date = date!(2024 - 05 - 20);

    /// A host that records what it was sent and replies with a canned value
    #[derive(Debug)]
    struct MockHost {
        reply: Value,
        calls: Vec<(Option<String>, Value)>,
    }

    impl MockHost {
        fn replying(reply: Value) -> MockHost {
            MockHost {
                reply,
                calls: Vec::new(),
            }
        }

        fn only_payload(&self) -> &Value {
            assert_eq!(self.calls.len(), 1, "host should be invoked exactly once");
            &self.calls[0].1
        }
    }

    impl WidgetHost for MockHost {
        type Error = Infallible;

        fn invoke(
            &mut self,
            key: Option<&str>,
            payload: &Payload,
        ) -> Result<RawResult, Infallible> {
            let payload = serde_json::to_value(payload).expect("payload should serialize");
            self.calls.push((key.map(String::from), payload));
            Ok(RawResult::from(self.reply.clone()))
        }
    }

    #[test]
    fn test_default_payload() {
        let payload = serde_json::to_value(DatePicker::new().payload(TODAY))
            .expect("payload should serialize");
        assert_eq!(
            payload,
            json!({
                "value": "2024-05-20",
                "min": null,
                "max": null,
                "format": "YYYY/MM/DD",
                "locale": null,
                "disabled": false,
                "width": "stretch",
                "clearable": false,
            })
        );
    }

    #[test]
    fn test_today_payload() {
        let mut host = MockHost::replying(Value::Null);
        let picker = DatePicker::new().value("today");
        let sel = picker.render_at(&mut host, TODAY);
        assert_eq!(sel, Ok(Selection::Empty));
        let payload = host.only_payload();
        assert_eq!(payload["value"], json!("2024-05-20"));
        assert_eq!(payload["min"], Value::Null);
        assert_eq!(payload["max"], Value::Null);
    }

    #[test]
    fn test_bounded_payload() {
        let mut host = MockHost::replying(Value::Null);
        let picker = DatePicker::new()
            .value(date!(2024 - 01 - 15))
            .min(date!(2024 - 01 - 01))
            .max(date!(2024 - 01 - 31));
        picker
            .render_at(&mut host, TODAY)
            .expect("mock host cannot fail");
        let payload = host.only_payload();
        assert_eq!(payload["value"], json!("2024-01-15"));
        assert_eq!(payload["min"], json!("2024-01-01"));
        assert_eq!(payload["max"], json!("2024-01-31"));
    }

    #[test]
    fn test_full_payload() {
        let picker = DatePicker::new()
            .value(datetime!(2024 - 02 - 10 18:45))
            .min("today")
            .max("2024-12-31")
            .key("date_input_full")
            .locale("ja")
            .format("YYYY-MM-DD")
            .disabled(true)
            .width(Width::Pixels(NonZeroU32::new(240).expect("240 is nonzero")))
            .clearable(true);
        let mut host = MockHost::replying(Value::Null);
        picker
            .render_at(&mut host, TODAY)
            .expect("mock host cannot fail");
        assert_eq!(host.calls.len(), 1);
        let (key, payload) = &host.calls[0];
        assert_eq!(key.as_deref(), Some("date_input_full"));
        assert_eq!(
            payload,
            &json!({
                "value": "2024-02-10",
                "min": "2024-05-20",
                "max": "2024-12-31",
                "format": "YYYY-MM-DD",
                "locale": "ja",
                "disabled": true,
                "width": "240",
                "clearable": true,
            })
        );
    }

    #[test]
    fn test_no_value() {
        let payload = DatePicker::new().no_value().payload(TODAY);
        assert_eq!(payload.value, None);
    }

    #[test]
    fn test_payload_leaves_caller_inputs_alone() {
        let picker = DatePicker::new().min("today");
        let before = picker.clone();
        let _ = picker.payload(TODAY);
        assert_eq!(picker, before);
    }

    #[rstest]
    #[case(json!("2024-06-01"), Selection::Date(date!(2024 - 06 - 01)))]
    #[case(Value::Null, Selection::Empty)]
    #[case(json!({"value": "2024-06-01"}), Selection::Date(date!(2024 - 06 - 01)))]
    #[case(json!({"value": null}), Selection::Empty)]
    #[case(json!({"other": "x"}), Selection::Empty)]
    #[case(json!(17), Selection::Empty)]
    #[case(json!("not-a-date"), Selection::Unparsed(String::from("not-a-date")))]
    fn test_render_result(#[case] reply: Value, #[case] expected: Selection) {
        let host = MockHost::replying(reply);
        assert_eq!(DatePicker::new().render_at(host, TODAY), Ok(expected));
    }

    #[rstest]
    #[case("YYYY/MM/DD", "2024/06/01", Selection::Date(date!(2024 - 06 - 01)))]
    #[case("DD.MM.YYYY", "01.06.2024", Selection::Date(date!(2024 - 06 - 01)))]
    #[case("DD.MM.YYYY", "2024/06/01", Selection::Unparsed(String::from("2024/06/01")))]
    #[case("YY/MM/DD", "24/06/01", Selection::Unparsed(String::from("24/06/01")))]
    #[case("Do MMM", "1st Jun", Selection::Unparsed(String::from("1st Jun")))]
    fn test_render_display_format_result(
        #[case] format: &str,
        #[case] reply: &str,
        #[case] expected: Selection,
    ) {
        let host = MockHost::replying(json!({ "value": reply }));
        let picker = DatePicker::new().format(format);
        assert_eq!(picker.render_at(host, TODAY), Ok(expected));
    }

    #[test]
    fn test_render_uses_current_date() {
        let mut host = MockHost::replying(Value::Null);
        let sel = DatePicker::new().render(&mut host);
        assert_eq!(sel, Ok(Selection::Empty));
        let value = host.only_payload()["value"]
            .as_str()
            .map(|s| decode(s).date())
            .expect("value should be a string");
        let utc = OffsetDateTime::now_utc().date();
        let around = [utc.previous_day(), Some(utc), utc.next_day()];
        assert!(
            around.contains(&value),
            "{value:?} should be within a day of {utc}"
        );
    }

    #[test]
    fn test_today_string_is_resolved() {
        let picker = DatePicker::new()
            .value(DateInput::Iso(String::from("today")))
            .max(DateInput::Iso(String::from("today")));
        let payload = picker.payload(TODAY);
        assert_eq!(payload.value.as_deref(), Some("2024-05-20"));
        assert_eq!(payload.max.as_deref(), Some("2024-05-20"));
    }

    #[test]
    fn test_render_is_stateless() {
        let picker = DatePicker::new().key("k");
        let mut host = MockHost::replying(json!("2024-06-01"));
        let first = picker.render_at(&mut host, TODAY);
        let second = picker.render_at(&mut host, TODAY);
        assert_eq!(first, second);
        assert_eq!(host.calls.len(), 2);
        assert_eq!(host.calls[0], host.calls[1]);
    }

    #[rstest]
    #[case("stretch", Width::Stretch)]
    #[case("content", Width::Content)]
    #[case("320", Width::Pixels(NonZeroU32::new(320).expect("320 is nonzero")))]
    fn test_parse_width(#[case] s: &str, #[case] width: Width) {
        assert_eq!(s.parse::<Width>(), Ok(width));
        assert_eq!(width.to_string(), s);
    }

    #[rstest]
    #[case("0")]
    #[case("-5")]
    #[case("wide")]
    #[case("Stretch")]
    #[case("")]
    fn test_parse_bad_width(#[case] s: &str) {
        assert_eq!(s.parse::<Width>(), Err(WidthError(s.to_owned())));
    }
}
