//! A localized date picker binding.
//!
//! A [`DatePicker`] is configured builder-style, turned into a JSON
//! [`Payload`], and handed to a [`WidgetHost`] that actually displays it.
//! Whatever the host reports back is reduced to a [`Selection`].
mod codec;
mod format;
mod host;
mod normalize;
mod widget;
pub use crate::codec::{decode, encode, DateInput, TODAY};
pub use crate::format::{DisplayFormat, FormatError};
pub use crate::host::{HostError, LineHost, REPLY_CAP};
pub use crate::normalize::{normalize, RawResult, Selection};
pub use crate::widget::{
    DatePicker, Payload, WidgetHost, Width, WidthError, DEFAULT_FORMAT, DEFAULT_WIDTH,
};
