//! Flat CSV projection of a sampling trip: one row per sample.
//!
//! # Invariants
//! - Rows are ordered by timestamp; rows without one come last, and equal
//!   keys keep their trip order.
//! - Trip notes land on the first row in trip order, location notes on the
//!   first row of each location; sorting may move them.
//! - Only the newest measurement per column is exported.

use crate::model::common::DataObjectWithTemplate;
use crate::model::coords::{Wgs84Coordinates, EMPTY_COORDS, WGS84_PRECISION};
use crate::model::location::SamplingLocation;
use crate::model::meas_type::{Measurement, MeasurementType};
use crate::model::set::deduplicated_set;
use crate::model::timestamp::{Timestamp, NO_TIMESTAMP};
use crate::model::trip::SamplingTrip;
use log::info;
use std::cmp::Reverse;

/// Drift above which the nominal coordinates are added to the notes.
pub const MAX_NOM_ACT_DIST_CSV_M: f64 = 50.0;

const LINE_END: &str = "\r\n";

const FIXED_LEADING: [&str; 4] = ["Timestamp", "Location", "Latitude", "Longitude"];
const FIXED_TRAILING: [&str; 3] = ["SampleType", "SubjectiveQuality", "Notes"];

/// An in-memory CSV document ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    /// `<trip key>.csv`
    pub filename: String,
    pub content: String,
    pub last_modified: Timestamp,
}

struct Row {
    time: Timestamp,
    cells: Vec<String>,
}

/// Renders `trip` as CSV.
pub fn trip_to_csv(trip: &SamplingTrip) -> CsvFile {
    let all_types: Vec<&MeasurementType> = deduplicated_set(
        trip.locations
            .iter()
            .flat_map(|loc| &loc.samples)
            .flat_map(|samp| &samp.measurements)
            .map(|meas| &meas.kind),
    );
    let meas_cols = measurement_columns(&all_types);

    let mut header: Vec<String> = FIXED_LEADING.iter().map(|c| c.to_string()).collect();
    header.extend(meas_cols.iter().cloned());
    header.extend(FIXED_TRAILING.iter().map(|c| c.to_string()));

    let trip_notes = trip_notes(trip);
    let mut rows: Vec<Row> = Vec::new();
    for (li, loc) in trip.locations.iter().enumerate() {
        let coords = export_coords(loc);
        let loc_notes = location_notes(loc);
        for (si, samp) in loc.samples.iter().enumerate() {
            let mut notes: Vec<String> = vec![samp.notes.trim().to_string()];
            if !samp.short_desc.trim().is_empty() {
                notes.push(format!("Sample: {}", samp.short_desc.trim()));
            }
            if li == 0 && si == 0 {
                notes.extend(trip_notes.iter().cloned());
            }
            if si == 0 {
                notes.extend(loc_notes.iter().cloned());
            }
            notes.retain(|n| !n.is_empty());

            // newest first; unset times count as oldest
            let mut newest: Vec<&Measurement> = samp.measurements.iter().collect();
            newest.sort_by_key(|m| Reverse(m.time.millis()));

            let mut first_meas_time: Option<i64> = None;
            let mut values: Vec<String> = Vec::with_capacity(meas_cols.len());
            for column in &meas_cols {
                match newest.iter().find(|m| column_name(&m.kind) == *column) {
                    Some(m) => {
                        if let Some(ms) = m.time.millis().filter(|_| m.time.is_valid_and_set()) {
                            first_meas_time = Some(first_meas_time.map_or(ms, |t| t.min(ms)));
                        }
                        values.push(m.value.clone());
                    }
                    None => values.push(String::new()),
                }
            }

            let time = match first_meas_time {
                Some(ms) => Timestamp::from_millis(ms),
                None if loc.start_time.is_valid_and_set() => loc.start_time,
                None => NO_TIMESTAMP,
            };

            let mut cells = vec![
                time.to_iso8601().unwrap_or_default(),
                loc.name.clone(),
                coord_text(&coords, coords.wgs84lat),
                coord_text(&coords, coords.wgs84lon),
            ];
            cells.extend(values);
            cells.push(samp.kind.as_str().to_string());
            cells.push(samp.subjective_quality.as_str().to_string());
            cells.push(notes.join("; "));
            rows.push(Row { time, cells });
        }
    }

    rows.sort_by_key(|row| row.time.sort_key());

    let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 1);
    lines.push(csv_line(&header));
    lines.extend(rows.iter().map(|row| csv_line(&row.cells)));

    info!(
        "event=csv_export module=export status=ok rows={} columns={}",
        rows.len(),
        header.len()
    );

    CsvFile {
        filename: format!("{}.csv", trip.trip_key()),
        content: lines.join(LINE_END),
        last_modified: trip.last_modified,
    }
}

/// Column name for a measurement type; unitless ids that collide with a
/// fixed column get a `[]` suffix.
fn column_name(kind: &MeasurementType) -> String {
    let id = kind.type_id();
    if FIXED_LEADING.contains(&id.as_str()) || FIXED_TRAILING.contains(&id.as_str()) {
        format!("{id}[]")
    } else {
        id
    }
}

/// Distinct column names in first-seen order. Types rendering to the same
/// name share a column.
fn measurement_columns(types: &[&MeasurementType]) -> Vec<String> {
    let mut cols: Vec<String> = Vec::new();
    for kind in types {
        let name = column_name(kind);
        if !cols.contains(&name) {
            cols.push(name);
        }
    }
    cols
}

fn trip_notes(trip: &SamplingTrip) -> Vec<String> {
    let mut heading = format!("Trip: {}", trip.name);
    if let Some(start) = trip.start_time.to_iso8601() {
        heading.push_str(&format!(" [{start}]"));
    }
    let mut notes = vec![heading];
    if !trip.notes.trim().is_empty() {
        notes.push(format!("Trip Notes: {}", trip.notes.trim()));
    }
    if !trip.persons.trim().is_empty() {
        notes.push(format!("Persons: {}", trip.persons.trim()));
    }
    if !trip.weather.trim().is_empty() {
        notes.push(format!("Weather: {}", trip.weather.trim()));
    }
    notes
}

fn location_notes(loc: &SamplingLocation) -> Vec<String> {
    let mut notes = Vec::new();
    if !loc.notes.trim().is_empty() {
        notes.push(format!("Location Notes: {}", loc.notes.trim()));
    }
    if loc.nominal_drift_m().is_some_and(|d| d > MAX_NOM_ACT_DIST_CSV_M) {
        if let Some(template) = loc.template() {
            notes.push(format!(
                "Nominal Sampling Location Coordinates (WGS84 Lat,Lon): {}",
                template.nominal_coords.summary()
            ));
        }
    }
    if !loc.completed_tasks.is_empty() {
        notes.push(format!("Completed Tasks: {}", loc.completed_tasks.join(", ")));
    }
    notes
}

/// Actual coordinates when valid, else the template's nominal ones.
fn export_coords(loc: &SamplingLocation) -> Wgs84Coordinates {
    if loc.actual_coords.are_valid() {
        return loc.actual_coords;
    }
    match loc.template() {
        Some(t) if t.nominal_coords.are_valid() => t.nominal_coords,
        _ => EMPTY_COORDS,
    }
}

fn coord_text(coords: &Wgs84Coordinates, component: f64) -> String {
    if coords.are_valid() {
        format!("{component:.prec$}", prec = WGS84_PRECISION)
    } else {
        String::new()
    }
}

fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// RFC 4180 quoting; also quotes fields with surrounding whitespace so
/// spreadsheet tools keep it.
fn quote_field(field: &str) -> String {
    let needs_quotes = field.contains(['"', ',', '\r', '\n'])
        || field.starts_with(char::is_whitespace)
        || field.ends_with(char::is_whitespace);
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{column_name, quote_field};
    use crate::model::meas_type::MeasurementType;

    #[test]
    fn quote_field_follows_rfc4180() {
        assert_eq!(quote_field("plain"), "plain");
        assert_eq!(quote_field("a,b"), "\"a,b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("two\r\nlines"), "\"two\r\nlines\"");
        assert_eq!(quote_field(" padded"), "\" padded\"");
        assert_eq!(quote_field(""), "");
    }

    #[test]
    fn unitless_type_colliding_with_fixed_column_is_suffixed() {
        assert_eq!(column_name(&MeasurementType::new("Notes", "Notes")), "Notes[]");
        assert_eq!(column_name(&MeasurementType::new("pH", "pH")), "pH");
        assert_eq!(column_name(&MeasurementType::new("SampleType", "-")), "SampleType[]");
        assert_eq!(column_name(&MeasurementType::new("Latitude", "°")), "Latitude[°]");
    }
}
