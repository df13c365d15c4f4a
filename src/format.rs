use thiserror::Error;
use time::{
    error::InvalidFormatDescription,
    format_description::{self, OwnedFormatItem},
    Date,
};

/// A display format in the token style used by pickers' `format` option
/// (e.g., `YYYY/MM/DD`), compiled to a `time` format description.
///
/// Supported tokens:
///
/// | Token  | Meaning                          |
/// | ------ | -------------------------------- |
/// | `YYYY` | four-digit year                  |
/// | `YY`   | last two digits of the year      |
/// | `M`    | month number, no padding         |
/// | `MM`   | month number, zero-padded        |
/// | `MMM`  | abbreviated English month name   |
/// | `MMMM` | full English month name          |
/// | `D`    | day of month, no padding         |
/// | `DD`   | day of month, zero-padded        |
///
/// Every character that is not an ASCII letter is copied literally.
#[derive(Clone, Debug)]
pub struct DisplayFormat {
    pattern: String,
    items: OwnedFormatItem,
    // A two-digit year cannot be parsed back to a date
    full_year: bool,
}

impl DisplayFormat {
    pub fn new(pattern: &str) -> Result<DisplayFormat, FormatError> {
        if pattern.is_empty() {
            return Err(FormatError::Empty);
        }
        let mut description = String::with_capacity(pattern.len() * 4);
        let mut full_year = false;
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c.is_ascii_alphabetic() {
                let mut run = 1;
                while chars.next_if_eq(&c).is_some() {
                    run += 1;
                }
                let component = match (c, run) {
                    ('Y', 4) => {
                        full_year = true;
                        "[year]"
                    }
                    ('Y', 2) => "[year repr:last_two]",
                    ('M', 1) => "[month padding:none]",
                    ('M', 2) => "[month]",
                    ('M', 3) => "[month repr:short]",
                    ('M', 4) => "[month repr:long]",
                    ('D', 1) => "[day padding:none]",
                    ('D', 2) => "[day]",
                    _ => {
                        return Err(FormatError::UnsupportedToken(c.to_string().repeat(run)))
                    }
                };
                description.push_str(component);
            } else if c == '[' {
                description.push_str("[[");
            } else {
                description.push(c);
            }
        }
        let items = format_description::parse_owned::<1>(&description)
            .map_err(FormatError::Description)?;
        Ok(DisplayFormat {
            pattern: pattern.to_owned(),
            items,
            full_year,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, date: Date) -> Option<String> {
        date.format(&self.items).ok()
    }

    /// Parse a date written in this format.  Always `None` for formats
    /// without a four-digit year.
    pub fn parse(&self, s: &str) -> Option<Date> {
        if !self.full_year {
            return None;
        }
        Date::parse(s, &self.items).ok()
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("display format is empty")]
    Empty,
    #[error("unsupported token {0:?} in display format")]
    UnsupportedToken(String),
    #[error("failed to compile display format")]
    Description(#[source] InvalidFormatDescription),
}
