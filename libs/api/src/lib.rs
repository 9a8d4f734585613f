//! Shared pieces of the telemetry link: the record, its JSON codec,
//! payload and timestamp generation, and the error type.

mod clock;
mod error;
mod payload;
mod record;

pub use clock::{format_time, parse_time, Clock, TIME_FORMAT};
pub use error::{ErrorKind, LinkError, Stage};
pub use payload::{is_payload, random_payload, seeded_rng, PAYLOAD_CHARSET};
pub use record::Record;

/// Порт по умолчанию для обеих сторон.
pub const DEFAULT_PORT: u16 = 8500;
