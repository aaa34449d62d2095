//! Text printouts of WTW multi-parameter meters.
//!
//! A meter prints one record each time a reading is stored, for example:
//!
//! ```text
//! 17.08.2024 16:00:30
//! Multi 3630 IDS
//! Ser. no.  12345678
//!
//! SenTix 940
//! Ser. no.  B012345678
//! pH 7.040  22.5 °C, AR, S: ++
//! _____________________________
//! ```
//!
//! # Invariants
//! - Input may arrive split at any byte; a record is emitted only after its
//!   separator line and the line ending that follows it were received.
//! - Every sensor line yields the reading and the sensor temperature.

use crate::model::meas_type::{Measurement, MeasurementType};
use crate::model::timestamp::Timestamp;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-_]{5,}$").expect("valid separator regex"));
// matched against lines with whitespace already collapsed
static SENSOR_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<name>\p{L}[\p{L}\p{N}]*) (?P<value>[-+]?[0-9]+(?:\.[0-9]+)?)(?: (?P<unit>[^\s,]+))? (?P<temp>[-+]?[0-9]+(?:\.[0-9]+)?) °C(?:[\s,]|$)",
    )
    .expect("valid sensor line regex")
});

const TEMPERATURE_UNIT: &str = "°C";

/// One printout.
#[derive(Debug)]
pub struct WtwRecord {
    /// Non-blank lines with whitespace collapsed, joined by `\n`.
    pub raw: String,
    pub measurements: Vec<Measurement>,
}

/// Incremental reader for a stream of printouts.
#[derive(Debug, Default)]
pub struct WtwReceiver {
    partial: String,
    lines: Vec<String>,
}

impl WtwReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `data` and returns the records it completed, stamping their
    /// measurements with `time`.
    pub fn add(&mut self, data: &str, time: Timestamp) -> Vec<WtwRecord> {
        self.partial.push_str(data);
        let mut records = Vec::new();
        while let Some(end) = self.partial.find(['\r', '\n']) {
            let skip = if self.partial[end..].starts_with("\r\n") { 2 } else { 1 };
            let line = collapse_whitespace(&self.partial[..end]);
            self.partial.drain(..end + skip);
            if SEPARATOR_RE.is_match(&line) {
                let lines = std::mem::take(&mut self.lines);
                if !lines.is_empty() {
                    records.push(parse_record(lines, time));
                }
            } else if !line.is_empty() {
                self.lines.push(line);
            }
        }
        records
    }
}

/// Parses the already collapsed lines of one printout.
pub fn parse_record(lines: Vec<String>, time: Timestamp) -> WtwRecord {
    let mut measurements = Vec::new();
    for line in &lines {
        let Some(caps) = SENSOR_LINE_RE.captures(line) else {
            continue;
        };
        let name = &caps["name"];
        let unit = caps.name("unit").map_or(name, |m| m.as_str());
        measurements.push(Measurement::new(
            MeasurementType::new(name, unit),
            time,
            &caps["value"],
        ));
        measurements.push(Measurement::new(
            MeasurementType::new(format!("Temp({name})"), TEMPERATURE_UNIT),
            time,
            &caps["temp"],
        ));
    }
    debug!(
        "event=wtw_record module=import status=ok lines={} measurements={}",
        lines.len(),
        measurements.len()
    );
    WtwRecord {
        raw: lines.join("\n"),
        measurements,
    }
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{collapse_whitespace, SENSOR_LINE_RE};

    #[test]
    fn collapse_whitespace_trims_and_joins() {
        assert_eq!(collapse_whitespace("  Ox   8.51 mg/l\t 22.9 °C "), "Ox 8.51 mg/l 22.9 °C");
        assert_eq!(collapse_whitespace(" \t "), "");
    }

    #[test]
    fn only_sensor_lines_match() {
        assert!(SENSOR_LINE_RE.is_match("pH 7.040 22.5 °C, AR, S: ++"));
        assert!(SENSOR_LINE_RE.is_match("Ox 8.51 mg/l 22.9 °C AR, S: +++"));
        for other in [
            "17.08.2024 16:00:30",
            "Multi 3630 IDS",
            "Ser. no. 12345678",
            "C = 0.458 1/cm, Tref25, nLF",
            "SC-FDO 45678901",
        ] {
            assert!(!SENSOR_LINE_RE.is_match(other), "{other}");
        }
    }
}
