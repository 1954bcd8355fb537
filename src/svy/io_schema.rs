// Reader for the schema export: one CSV row per question, with field names
// that vary by vendor.

use std::collections::HashSet;

use csv::ReaderBuilder;
use snafu::ResultExt;
use survey_dataset::{QuestionDefinition, QuestionKind};

use crate::svy::io_common::{first_field_index, normalize_prompt, split_list};
use crate::svy::{CsvStructureSnafu, SvyResult};
use log::{debug, warn};

const ID_FIELDS: [&str; 3] = ["Q#", "QuestionID", "Question #"];
const TEXT_FIELDS: [&str; 3] = ["QText", "Question Text", "Text"];
const TYPE_FIELDS: [&str; 2] = ["Type", "Question Type"];
const CHOICE_FIELDS: [&str; 2] = ["Choices", "Answer Choices"];
const ROW_FIELDS: [&str; 2] = ["Rows", "Answer Rows"];
const COLUMN_FIELDS: [&str; 2] = ["Columns", "Answer Columns"];
const BLOCK_FIELDS: [&str; 2] = ["BlockName", "Block"];

/// An identifier carrying this marker denotes the free-text companion of
/// another question, not a first-class question.
const TEXT_COMPANION_MARKER: &str = "_TEXT";

/// Parses the schema export into the ordered question sequence.
///
/// Rows that cannot be interpreted are skipped, never fatal. Only a header
/// row that the CSV reader cannot produce at all aborts the parse.
pub fn read_schema(text: &str) -> SvyResult<Vec<QuestionDefinition>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr.headers().context(CsvStructureSnafu {})?.clone();

    let id_idx = first_field_index(&headers, &ID_FIELDS);
    let text_idx = first_field_index(&headers, &TEXT_FIELDS);
    let type_idx = first_field_index(&headers, &TYPE_FIELDS);
    let choices_idx = first_field_index(&headers, &CHOICE_FIELDS);
    let rows_idx = first_field_index(&headers, &ROW_FIELDS);
    let columns_idx = first_field_index(&headers, &COLUMN_FIELDS);
    let block_idx = first_field_index(&headers, &BLOCK_FIELDS);

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut res: Vec<QuestionDefinition> = Vec::new();
    for (lineno, record_r) in rdr.records().enumerate() {
        let record = match record_r {
            Ok(r) => r,
            Err(e) => {
                debug!("read_schema: skipping malformed row {}: {}", lineno + 2, e);
                continue;
            }
        };
        let id = field(&record, id_idx);
        if id.is_empty() {
            debug!("read_schema: row {} has no identifier", lineno + 2);
            continue;
        }
        if id.contains(TEXT_COMPANION_MARKER) {
            continue;
        }
        if !seen_ids.insert(id.to_string()) {
            // Ids never collide in a well-formed schema; when an export
            // violates that, the first definition wins.
            warn!("read_schema: duplicate question id {}, keeping the first", id);
            continue;
        }

        let kind = match field(&record, type_idx) {
            "" => QuestionKind::Verbatim,
            s => QuestionKind::from_vendor(s),
        };
        let choices = split_list(field(&record, choices_idx));
        let rows = split_list(field(&record, rows_idx));
        let columns = split_list(field(&record, columns_idx));

        // Single-row matrix promotion: a Matrix with columns but no rows is
        // the vendor's encoding of a plain horizontal scale.
        let (kind, choices, columns) =
            if kind == QuestionKind::Matrix && rows.is_empty() && !columns.is_empty() {
                (QuestionKind::Single, columns, Vec::new())
            } else {
                (kind, choices, columns)
            };

        res.push(QuestionDefinition {
            id: id.to_string(),
            text: normalize_prompt(field(&record, text_idx)),
            kind,
            choices,
            rows,
            columns,
            block: field(&record, block_idx).to_string(),
        });
    }
    debug!("read_schema: {} questions", res.len());
    Ok(res)
}

fn field<'a>(record: &'a csv::StringRecord, idx: Option<usize>) -> &'a str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_vendor_header_sets_parse() {
        let a = "Q#,QText,Type,Choices\nQ1,Color,Single,Red;Blue\n";
        let b =
            "QuestionID,Question Text,Question Type,Answer Choices\nQ1,Color,Single,Red;Blue\n";
        for text in [a, b] {
            let qs = read_schema(text).unwrap();
            assert_eq!(qs.len(), 1);
            assert_eq!(qs[0].id, "Q1");
            assert_eq!(qs[0].kind, QuestionKind::Single);
            assert_eq!(qs[0].choices, vec!["Red", "Blue"]);
        }
    }

    #[test]
    fn missing_type_defaults_to_verbatim() {
        let qs = read_schema("Q#,QText\nQ1,Anything else?\n").unwrap();
        assert_eq!(qs[0].kind, QuestionKind::Verbatim);
    }

    #[test]
    fn single_row_matrix_is_promoted() {
        let text = "Q#,QText,Type,Choices,Rows,Columns\n\
                    Q1,How satisfied?,Matrix,,,Bad;Fine;Great\n\
                    Q2,Rate each,Matrix,,Speed;Price,Bad;Great\n";
        let qs = read_schema(text).unwrap();
        assert_eq!(qs[0].kind, QuestionKind::Single);
        assert_eq!(qs[0].choices, vec!["Bad", "Fine", "Great"]);
        assert!(qs[0].columns.is_empty());
        // A true grid is left alone.
        assert_eq!(qs[1].kind, QuestionKind::Matrix);
        assert_eq!(qs[1].rows, vec!["Speed", "Price"]);
        assert_eq!(qs[1].columns, vec!["Bad", "Great"]);
    }

    #[test]
    fn companion_and_unidentified_rows_are_excluded() {
        let text = "Q#,QText,Type\nQ1,Color,Single\nQ1_TEXT,Color (other),Verbatim\n,Orphan,Single\n";
        let qs = read_schema(text).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].id, "Q1");
    }

    #[test]
    fn duplicate_ids_keep_the_first_definition() {
        let text = "Q#,QText,Type\nQ1,First,Single\nQ1,Second,Multi\n";
        let qs = read_schema(text).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].text, "First");
    }

    #[test]
    fn prompts_are_normalized_in_place() {
        let text = "Q#,QText,Type\nQ1,<p>Your   ZIP</p>,Verbatim\n";
        let qs = read_schema(text).unwrap();
        assert_eq!(qs[0].text, "Your ZIP");
        let text = "Q#,QText,Type\nQ1,zipcode,Verbatim\n";
        assert_eq!(read_schema(text).unwrap()[0].text, "Zip Code");
    }

    #[test]
    fn short_rows_do_not_abort_the_parse() {
        let text = "Q#,QText,Type,Choices\nQ1\nQ2,Ok,Single,A;B\n";
        let qs = read_schema(text).unwrap();
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].id, "Q1");
        assert_eq!(qs[0].kind, QuestionKind::Verbatim);
        assert_eq!(qs[1].choices, vec!["A", "B"]);
    }
}
