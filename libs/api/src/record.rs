use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::{format_time, parse_time, Clock};
use crate::payload::random_payload;
use crate::LinkError;

/// Единица обмена: один JSON-объект на одно TCP-соединение.
///
/// Wire form is `{"data":"<payload>","time":"<local time>"}`, UTF-8 encoded,
/// with no framing around it. Extra keys are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub data: String,
    pub time: String,
}

impl Record {
    pub fn new(data: impl Into<String>, time: &NaiveDateTime) -> Self {
        Self { data: data.into(), time: format_time(time) }
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R, clock: &mut Clock, size: usize) -> Self {
        let data = random_payload(rng, size);
        Self::new(data, &clock.now())
    }

    pub fn encode(&self) -> Result<Vec<u8>, LinkError> {
        serde_json::to_vec(self).map_err(LinkError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, LinkError> {
        let text = std::str::from_utf8(bytes)?;
        serde_json::from_str(text).map_err(LinkError::Decode)
    }

    /// Decode bytes read into a buffer of `capacity` bytes.
    ///
    /// A read that filled the buffer and still failed to decode is reported
    /// as [`LinkError::Truncated`] rather than a plain decode error.
    pub fn decode_within(bytes: &[u8], capacity: usize) -> Result<Self, LinkError> {
        match Self::decode(bytes) {
            Err(LinkError::Decode(_) | LinkError::Utf8(_)) if bytes.len() >= capacity => {
                Err(LinkError::Truncated { size: capacity })
            }
            other => other,
        }
    }

    pub fn parsed_time(&self) -> Result<NaiveDateTime, LinkError> {
        parse_time(&self.time)
    }
}
