use chrono::{Local, NaiveDateTime, SubsecRound};

use crate::LinkError;

/// Формат поля `time`: локальное время с точностью до микросекунд.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// %.f accepts any number of fractional digits on input.
const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn format_time(t: &NaiveDateTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

pub fn parse_time(s: &str) -> Result<NaiveDateTime, LinkError> {
    NaiveDateTime::parse_from_str(s.trim(), PARSE_FORMAT)
        .map_err(|source| LinkError::Time { value: s.to_string(), source })
}

/// Source of record timestamps for one sender run.
///
/// Values are truncated to microseconds and never go backwards: if the wall
/// clock steps back, the last issued value is repeated.
#[derive(Debug, Default)]
pub struct Clock {
    last: Option<NaiveDateTime>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&mut self) -> NaiveDateTime {
        self.observe(Local::now().naive_local())
    }

    pub fn observe(&mut self, t: NaiveDateTime) -> NaiveDateTime {
        let t = t.trunc_subsecs(6);
        let t = match self.last {
            Some(last) if t < last => last,
            _ => t,
        };
        self.last = Some(t);
        t
    }
}
