use log::debug;

use crate::decode::{is_sentinel, parse_pure_integer};

/// Cap on the number of raw values inspected per question. Past this point
/// the verdict is already as good as it is going to get.
pub const MAX_DETECTION_SAMPLES: usize = 1000;

/// Decides whether a question's raw numeric codes are 1-based with 0 as a
/// null sentinel, from a bounded sample of its column values.
///
/// There is no schema flag distinguishing 0-based array positions, 1-based
/// ordinal codes and literal label text; the only signal is the observed
/// value range. A maximum that lands exactly on the option count points at
/// 1-based codes, since 0-based codes top out one short of it. The common
/// 0-10 satisfaction scale (11 options, encoded 1..=11) is the textbook
/// instance.
///
/// Known limitation, kept for compatibility with both vendors: once a
/// question is in this mode, a genuine zero-valued answer is
/// indistinguishable from "no answer" and is reported as missing.
pub fn detect_one_based_null<'a, I>(option_count: usize, samples: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    if option_count == 0 {
        return false;
    }
    let mut max_seen: u64 = 0;
    let mut numeric_seen: usize = 0;
    for raw in samples.into_iter().take(MAX_DETECTION_SAMPLES) {
        let v = raw.trim();
        if v.is_empty() || is_sentinel(v) {
            continue;
        }
        if let Some(n) = parse_pure_integer(v) {
            numeric_seen += 1;
            if n > max_seen {
                max_seen = n;
            }
        }
    }
    let one_based = max_seen > 0 && max_seen == option_count as u64;
    if one_based && numeric_seen < 20 {
        debug!(
            "detect_one_based_null: 1-based verdict from only {} numeric samples",
            numeric_seen
        );
    }
    one_based
}
