// Reader for the raw response export.

use csv::ReaderBuilder;
use snafu::{OptionExt, ResultExt};
use survey_dataset::{ResponseRecord, ResponseSet};

use crate::svy::{CsvStructureSnafu, MissingTimestampColumnSnafu, SvyResult};
use log::debug;

/// The column that anchors row filtering, in priority order. An export
/// carrying none of these is not usable.
const TIMESTAMP_FIELDS: [&str; 3] = ["StartDate", "RecordedDate", "TakeTime"];

/// Substrings that betray a vendor-injected metadata or placeholder row
/// when found in the timestamp cell: repeated header labels, JSON import
/// markers.
const METADATA_MARKERS: [&str; 3] = ["Date", "{", "ImportId"];

/// Parses the response export, discarding the non-data rows vendors insert
/// below the header.
pub fn read_responses(text: &str) -> SvyResult<ResponseSet> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvStructureSnafu {})?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let ts_idx = TIMESTAMP_FIELDS
        .iter()
        .find_map(|f| headers.iter().position(|h| h == f))
        .context(MissingTimestampColumnSnafu {})?;

    let mut records: Vec<ResponseRecord> = Vec::new();
    for (lineno, record_r) in rdr.records().enumerate() {
        let record = match record_r {
            Ok(r) => r,
            Err(e) => {
                debug!("read_responses: skipping malformed row {}: {}", lineno + 2, e);
                continue;
            }
        };
        let ts = record.get(ts_idx).unwrap_or("").trim();
        if ts.is_empty() || METADATA_MARKERS.iter().any(|m| ts.contains(m)) {
            debug!("read_responses: dropping metadata row {}: {:?}", lineno + 2, ts);
            continue;
        }
        let mut rec = ResponseRecord::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            if let Some(value) = record.get(idx) {
                rec.insert(header.clone(), value.to_string());
            }
        }
        records.push(rec);
    }
    debug!("read_responses: {} records", records.len());
    Ok(ResponseSet { headers, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svy::SvyError;

    #[test]
    fn data_rows_survive_and_metadata_rows_do_not() {
        let text = "StartDate,Q1\n\
                    Start Date,\n\
                    \"{\"\"ImportId\"\":\"\"startDate\"\"}\",\n\
                    ,missing timestamp\n\
                    2023-04-02 09:11,A\n";
        let rs = read_responses(text).unwrap();
        assert_eq!(rs.records.len(), 1);
        assert_eq!(rs.records[0].get("Q1").map(String::as_str), Some("A"));
    }

    #[test]
    fn alternate_timestamp_columns_are_accepted() {
        let rs = read_responses("TakeTime,Q1\n12:05,A\n").unwrap();
        assert_eq!(rs.records.len(), 1);
        // Header order is preserved for column resolution.
        assert_eq!(rs.headers, vec!["TakeTime", "Q1"]);
    }

    #[test]
    fn first_timestamp_field_wins() {
        // RecordedDate is usable, but StartDate comes first in priority and
        // its placeholder content drops the row.
        let text = "StartDate,RecordedDate,Q1\nStart Date,2023-04-02,A\n2023-04-02,2023-04-02,B\n";
        let rs = read_responses(text).unwrap();
        assert_eq!(rs.records.len(), 1);
        assert_eq!(rs.records[0].get("Q1").map(String::as_str), Some("B"));
    }

    #[test]
    fn an_export_without_timestamps_is_rejected() {
        let res = read_responses("Q1,Q2\nA,B\n");
        assert!(matches!(
            res,
            Err(SvyError::MissingTimestampColumn { .. })
        ));
    }
}
