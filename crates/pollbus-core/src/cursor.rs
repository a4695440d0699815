//! Client-held resume tokens.

use std::fmt;
use std::str::FromStr;

use crate::error::BusError;
use crate::message::MessageId;

/// The last message a client has observed.
///
/// Cursors carry no server-side state; they are compared against stored
/// message ids and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cursor {
    /// Nothing observed yet.
    #[default]
    Start,
    /// Resume after this message.
    After(MessageId),
}

impl Cursor {
    /// Parse the token text a client sent back.
    ///
    /// The empty string, `none` and `null` mean [`Cursor::Start`]; browsers
    /// post an empty `t` before they have seen any message.
    pub fn parse(token: &str) -> Result<Self, BusError> {
        let token = token.trim();
        if token.is_empty()
            || token.eq_ignore_ascii_case("none")
            || token.eq_ignore_ascii_case("null")
        {
            return Ok(Cursor::Start);
        }
        token
            .parse::<u64>()
            .map(|raw| Cursor::After(MessageId::new(raw)))
            .map_err(|_| BusError::MalformedCursor(token.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn matches(&self, id: MessageId) -> bool {
        matches!(self, Cursor::After(seen) if *seen == id)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<MessageId> {
        match self {
            Cursor::Start => None,
            Cursor::After(id) => Some(*id),
        }
    }
}

impl From<MessageId> for Cursor {
    fn from(id: MessageId) -> Self {
        Cursor::After(id)
    }
}

impl FromStr for Cursor {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cursor::parse(s)
    }
}

/// Renders the token as sent on the wire; `Start` is the empty string.
impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Start => Ok(()),
            Cursor::After(id) => write!(f, "{}", id),
        }
    }
}
