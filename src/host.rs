use crate::codec::format_ymd;
use crate::normalize::{RawResult, Selection};
use crate::widget::{Payload, WidgetHost};
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

/// Longest reply line accepted from the other end, newline included
pub const REPLY_CAP: u64 = 65_536;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "t")]
enum Envelope<'a> {
    #[serde(rename = "render")]
    Render {
        key: Option<&'a str>,
        data: &'a Payload,
    },
    #[serde(rename = "result")]
    Outcome {
        status: &'static str,
        value: Option<String>,
    },
}

/// A [`WidgetHost`] that talks to the frontend over newline-delimited JSON.
///
/// Each render writes one line of the form
/// `{"t":"render","key":...,"data":{...}}` and then waits for one line in
/// reply, which is the widget's raw value: `null`, a date string, or a state
/// object.  A blank reply line means no value.
#[derive(Clone, Debug)]
pub struct LineHost<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineHost<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        LineHost { reader, writer }
    }

    /// Write a `{"t":"result",...}` line describing the final selection
    pub fn report(&mut self, selection: &Selection) -> Result<(), HostError> {
        let (status, value) = match selection {
            Selection::Empty => ("empty", None),
            Selection::Date(d) => ("date", format_ymd(*d)),
            Selection::Unparsed(s) => ("unparsed", Some(s.clone())),
        };
        self.send(&Envelope::Outcome { status, value })
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn send(&mut self, envelope: &Envelope<'_>) -> Result<(), HostError> {
        serde_json::to_writer(&mut self.writer, envelope)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<RawResult, HostError> {
        let mut line = Vec::new();
        let mut limited = (&mut self.reader).take(REPLY_CAP + 1);
        if limited.read_until(b'\n', &mut line)? == 0 {
            return Err(HostError::Closed);
        }
        if limited.limit() == 0 {
            if line.last() != Some(&b'\n') {
                self.skip_line()?;
            }
            return Err(HostError::TooLarge(REPLY_CAP));
        }
        let line = line.trim_ascii();
        debug!("Widget host replied: {:?}", String::from_utf8_lossy(line));
        if line.is_empty() {
            return Ok(RawResult::Absent);
        }
        let value = serde_json::from_slice::<Value>(line)?;
        Ok(RawResult::from(value))
    }

    // Discard input through the next newline so that the following reply
    // starts on a line boundary
    fn skip_line(&mut self) -> io::Result<()> {
        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(());
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    self.reader.consume(i + 1);
                    return Ok(());
                }
                None => {
                    let n = buf.len();
                    self.reader.consume(n);
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> WidgetHost for LineHost<R, W> {
    type Error = HostError;

    fn invoke(&mut self, key: Option<&str>, payload: &Payload) -> Result<RawResult, HostError> {
        self.send(&Envelope::Render { key, data: payload })?;
        self.receive()
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to communicate with widget host")]
    Io(#[from] io::Error),
    #[error("widget host sent invalid JSON")]
    Json(#[from] serde_json::Error),
    #[error("widget host reply exceeded {0} bytes")]
    TooLarge(u64),
    #[error("widget host closed the connection without replying")]
    Closed,
}
