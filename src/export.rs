//! Session export: GPX 1.1, CSV and (with `serde`) JSON.
//!
//! All formatters are pure functions of a finalized [`Session`]; writing
//! the result somewhere is the caller's business.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use log::debug;

use crate::error::ExportError;
use crate::tracker::Session;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum ExportFormat {
    Gpx,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Gpx => "gpx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpx" => Ok(ExportFormat::Gpx),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// `gps_track_YYYY-MM-DD.<ext>`
pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!("gps_track_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

/// Format a session in the requested format.
pub fn export_session(session: &Session, format: ExportFormat) -> Result<String, ExportError> {
    debug!("Exporting session {} as {}", session.id, format.extension());
    match format {
        ExportFormat::Gpx => to_gpx(session),
        ExportFormat::Csv => to_csv(session),
        #[cfg(feature = "serde")]
        ExportFormat::Json => to_json(session),
        #[cfg(not(feature = "serde"))]
        ExportFormat::Json => Err(ExportError::UnsupportedFormat("json".to_string())),
    }
}

fn iso_time(timestamp_ms: i64) -> Result<String, ExportError> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or(ExportError::InvalidTimestamp(timestamp_ms))
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn non_empty(session: &Session) -> Result<(), ExportError> {
    if session.points.is_empty() {
        Err(ExportError::EmptySession)
    } else {
        Ok(())
    }
}

/// GPX 1.1 document with one track segment.
///
/// Every point becomes a `<trkpt>` with `lat`/`lon`; `<ele>` is written
/// only when the sample has an altitude, `<time>` is ISO-8601 UTC.
pub fn to_gpx(session: &Session) -> Result<String, ExportError> {
    non_empty(session)?;

    let track_date = DateTime::<Utc>::from_timestamp_millis(session.start_time)
        .ok_or(ExportError::InvalidTimestamp(session.start_time))?
        .date_naive();
    let name = xml_escape(&format!("GPS Track {}", track_date.format("%Y-%m-%d")));

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(
        "<gpx version=\"1.1\" creator=\"GPS Life Tracker\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n",
    );
    xml.push_str("  <trk>\n");
    xml.push_str(&format!("    <name>{}</name>\n", name));
    xml.push_str("    <trkseg>\n");

    for point in &session.points {
        xml.push_str(&format!("      <trkpt lat=\"{}\" lon=\"{}\">\n", point.latitude, point.longitude));
        if let Some(ele) = point.altitude {
            xml.push_str(&format!("        <ele>{}</ele>\n", ele));
        }
        xml.push_str(&format!("        <time>{}</time>\n", iso_time(point.timestamp)?));
        xml.push_str("      </trkpt>\n");
    }

    xml.push_str("    </trkseg>\n");
    xml.push_str("  </trk>\n");
    xml.push_str("</gpx>\n");

    Ok(xml)
}

/// CSV with header `timestamp,latitude,longitude,altitude,accuracy,speed,heading`.
/// Missing optional fields are left empty.
pub fn to_csv(session: &Session) -> Result<String, ExportError> {
    non_empty(session)?;

    fn opt(v: Option<f64>) -> String {
        v.map(|x| x.to_string()).unwrap_or_default()
    }

    let mut csv = String::from("timestamp,latitude,longitude,altitude,accuracy,speed,heading\n");
    for p in &session.points {
        // Writing to a String cannot fail
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{}",
            iso_time(p.timestamp)?,
            p.latitude,
            p.longitude,
            opt(p.altitude),
            p.accuracy,
            opt(p.speed),
            opt(p.heading)
        );
    }
    Ok(csv)
}

/// Pretty-printed JSON of the whole session.
#[cfg(feature = "serde")]
pub fn to_json(session: &Session) -> Result<String, ExportError> {
    non_empty(session)?;
    Ok(serde_json::to_string_pretty(session)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PositionSample;

    // 2024-03-15T12:00:00Z
    const T0: i64 = 1_710_504_000_000;

    fn session(points: Vec<PositionSample>) -> Session {
        Session {
            id: T0.to_string(),
            start_time: T0,
            end_time: Some(T0 + 120_000),
            points,
            distance: 111.2,
            duration_secs: 120.0,
            average_speed_kmh: 3.3,
        }
    }

    fn two_points() -> Session {
        session(vec![
            PositionSample::new(40.7128, -74.006, 8.0, T0).with_altitude(12.5),
            PositionSample::new(40.7138, -74.006, 9.0, T0 + 60_000).with_speed(1.5),
        ])
    }

    #[test]
    fn test_gpx_structure() {
        let gpx = to_gpx(&two_points()).unwrap();

        assert!(gpx.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(gpx.contains("creator=\"GPS Life Tracker\""));
        assert!(gpx.contains("<name>GPS Track 2024-03-15</name>"));
        assert_eq!(gpx.matches("<trkpt ").count(), 2);
        assert!(gpx.contains("<trkpt lat=\"40.7128\" lon=\"-74.006\">"));
        assert!(gpx.contains("<time>2024-03-15T12:00:00.000Z</time>"));
        assert!(gpx.contains("<time>2024-03-15T12:01:00.000Z</time>"));
        assert!(gpx.trim_end().ends_with("</gpx>"));
    }

    #[test]
    fn test_gpx_elevation_only_when_present() {
        let gpx = to_gpx(&two_points()).unwrap();
        assert_eq!(gpx.matches("<ele>").count(), 1);
        assert!(gpx.contains("<ele>12.5</ele>"));
    }

    #[test]
    fn test_csv() {
        let csv = to_csv(&two_points()).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,latitude,longitude,altitude,accuracy,speed,heading");
        assert_eq!(lines[1], "2024-03-15T12:00:00.000Z,40.7128,-74.006,12.5,8,,");
        assert_eq!(lines[2], "2024-03-15T12:01:00.000Z,40.7138,-74.006,,9,1.5,");
    }

    #[test]
    fn test_empty_session() {
        let empty = session(vec![]);
        assert!(matches!(to_gpx(&empty), Err(ExportError::EmptySession)));
        assert!(matches!(to_csv(&empty), Err(ExportError::EmptySession)));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("GPX".parse::<ExportFormat>().unwrap(), ExportFormat::Gpx);
        assert_eq!(" csv ".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "kml".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(f)) if f == "kml"
        ));
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(export_filename(ExportFormat::Gpx, date), "gps_track_2024-03-05.gpx");
        assert_eq!(export_filename(ExportFormat::Json, date), "gps_track_2024-03-05.json");
    }

    #[test]
    fn test_export_session_dispatch() {
        let s = two_points();
        assert_eq!(export_session(&s, ExportFormat::Csv).unwrap(), to_csv(&s).unwrap());
        assert_eq!(export_session(&s, ExportFormat::Gpx).unwrap(), to_gpx(&s).unwrap());
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_roundtrips_session() {
        let s = two_points();
        let json = to_json(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
