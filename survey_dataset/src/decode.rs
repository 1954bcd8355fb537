// Decoding primitives: sentinel markers, token lists and the per-kind
// decoders that rewrite one record field into canonical labels.

use crate::model::ResponseRecord;

/// Vendor literals denoting an intentionally absent answer. Matched
/// case-insensitively: the two vendors do not agree on capitalization.
const SENTINELS: [&str; 3] = [".empty.", ".timeout.", ".dropped."];

pub(crate) fn is_sentinel(value: &str) -> bool {
    SENTINELS.iter().any(|s| value.eq_ignore_ascii_case(s))
}

/// Drops a leading currency symbol, if any, and trims the remainder.
pub(crate) fn strip_currency(token: &str) -> &str {
    token
        .trim()
        .trim_start_matches(['$', '€', '£'])
        .trim()
}

/// Parses a string made of ASCII digits only. Signs, decimals and
/// thousands separators all disqualify: raw codes are plain ordinals.
pub(crate) fn parse_pure_integer(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok()
}

/// Splits a raw value into tokens if it looks like a delimited list of pure
/// numbers (after currency stripping). Empty tokens are kept: they align
/// positions for matrix rows and ranking slots.
pub(crate) fn numeric_token_list(raw: &str) -> Option<Vec<String>> {
    let tokens: Vec<String> = raw
        .split([',', ';'])
        .map(|t| strip_currency(t).to_string())
        .collect();
    let mut any_numeric = false;
    for t in &tokens {
        if t.is_empty() {
            continue;
        }
        if parse_pure_integer(t).is_none() {
            return None;
        }
        any_numeric = true;
    }
    if any_numeric {
        Some(tokens)
    } else {
        None
    }
}

/// Recognizes a repeated `row:col` or `row=col` pair list, e.g. "1:2,3:4".
/// Returns None as soon as one non-empty segment is not such a pair.
pub(crate) fn parse_key_value_pairs(raw: &str) -> Option<Vec<(usize, usize)>> {
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for part in raw.split([',', ';']) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (row_s, col_s) = part.split_once([':', '='])?;
        let row = parse_pure_integer(row_s.trim())? as usize;
        let col = parse_pure_integer(col_s.trim())? as usize;
        pairs.push((row, col));
    }
    if pairs.is_empty() {
        None
    } else {
        Some(pairs)
    }
}

/// Resolves one raw token against an option list.
///
/// In 1-based-null mode a token is always an ordinal: "0" is no answer and
/// anything else indexes `options[token - 1]`. In standard mode an exact
/// label match wins; a 1-based index lookup is the last resort. Out-of-range
/// indices resolve to None rather than erroring (ambiguous encodings degrade
/// per-field).
pub(crate) fn resolve_token(
    token: &str,
    options: &[String],
    one_based_null: bool,
) -> Option<String> {
    let t = strip_currency(token);
    if t.is_empty() {
        return None;
    }
    if one_based_null {
        if t == "0" {
            return None;
        }
        let idx = parse_pure_integer(t)? as usize;
        return options.get(idx.checked_sub(1)?).cloned();
    }
    if let Some(label) = options.iter().find(|o| o.as_str() == t) {
        return Some(label.clone());
    }
    let idx = parse_pure_integer(t)? as usize;
    options.get(idx.checked_sub(1)?).cloned()
}

// **** Per-kind decoders ****
//
// Each decoder receives the already-split token list and writes the
// canonical field and its synthetic sub-fields into the record. A decoder
// that resolves nothing writes nothing, leaving the mirrored raw value in
// place.

pub(crate) fn decode_single(
    rec: &mut ResponseRecord,
    id: &str,
    tokens: &[String],
    options: &[String],
    one_based_null: bool,
) {
    for t in tokens {
        if t.is_empty() {
            continue;
        }
        if let Some(label) = resolve_token(t, options, one_based_null) {
            rec.insert(id.to_string(), label);
            return;
        }
    }
}

pub(crate) fn decode_multi(
    rec: &mut ResponseRecord,
    id: &str,
    tokens: &[String],
    options: &[String],
    one_based_null: bool,
) {
    let mut labels: Vec<String> = Vec::new();
    for t in tokens {
        if t.is_empty() {
            continue;
        }
        if let Some(label) = resolve_token(t, options, one_based_null) {
            // Sub-fields are keyed by selection slot, not by choice index:
            // only tokens that resolve get a slot.
            rec.insert(format!("{}_{}", id, labels.len() + 1), label.clone());
            labels.push(label);
        }
    }
    if !labels.is_empty() {
        rec.insert(id.to_string(), labels.join("; "));
    }
}

pub(crate) fn decode_matrix(
    rec: &mut ResponseRecord,
    id: &str,
    tokens: &[String],
    columns: &[String],
    one_based_null: bool,
) {
    let mut labels: Vec<String> = Vec::new();
    for (idx, t) in tokens.iter().enumerate() {
        if t.is_empty() {
            continue;
        }
        if let Some(label) = resolve_token(t, columns, one_based_null) {
            rec.insert(format!("{}_{}", id, idx + 1), label.clone());
            labels.push(label);
        }
    }
    if !labels.is_empty() {
        rec.insert(id.to_string(), labels.join("; "));
    }
}

pub(crate) fn decode_ranking(
    rec: &mut ResponseRecord,
    id: &str,
    tokens: &[String],
    choices: &[String],
    one_based_null: bool,
) {
    let mut parts: Vec<String> = Vec::new();
    for (idx, t) in tokens.iter().enumerate() {
        if t.is_empty() {
            continue;
        }
        let choice = match choices.get(idx) {
            Some(c) => c,
            // Positions beyond the choice list carry no information.
            None => break,
        };
        if one_based_null && t == "0" {
            continue;
        }
        let rank = match parse_pure_integer(t) {
            Some(r) if r >= 1 => r,
            // A rank of zero is an unpopulated slot in either mode.
            _ => continue,
        };
        rec.insert(format!("{}_{}", id, rank), choice.clone());
        parts.push(format!("{} (#{})", choice, rank));
    }
    if !parts.is_empty() {
        rec.insert(id.to_string(), parts.join("; "));
    }
}

pub(crate) fn decode_key_value_matrix(
    rec: &mut ResponseRecord,
    id: &str,
    pairs: &[(usize, usize)],
    columns: &[String],
) {
    for (row, col) in pairs {
        if *row == 0 || *col == 0 {
            continue;
        }
        if let Some(label) = columns.get(col - 1) {
            rec.insert(format!("{}_{}", id, row), label.clone());
        }
    }
}
