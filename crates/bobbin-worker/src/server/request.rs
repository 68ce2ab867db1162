//! Splitting a received multipart message into request frames.

use std::borrow::Cow;

use super::errors::RequestError;

/// The three frames of a component request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RequestFrames<'a> {
    action: &'a [u8],
    mappings: &'a [u8],
    stream: &'a [u8],
}

impl<'a> RequestFrames<'a> {
    /// Splits `parts` into the `action`, `mappings` and `stream` frames.
    pub(crate) fn parse(parts: &'a [Vec<u8>]) -> Result<Self, RequestError> {
        match parts {
            [action, mappings, stream] => Ok(Self {
                action,
                mappings,
                stream,
            }),
            _ => Err(RequestError::FrameCount {
                received: parts.len(),
            }),
        }
    }

    /// Action name announced by the requester, for logging.
    pub(crate) fn action(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.action)
    }

    /// Size of the reserved mappings frame.
    pub(crate) const fn mappings_len(&self) -> usize {
        self.mappings.len()
    }

    /// The msgpack command body.
    pub(crate) const fn stream(&self) -> &'a [u8] {
        self.stream
    }
}
