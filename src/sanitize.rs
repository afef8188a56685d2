//! Removal of `<think>…</think>` reasoning spans from raw completions.

use std::sync::LazyLock;

use regex::Regex;

const OPEN: &str = "<think>";
const CLOSE: &str = "</think>";

static THINK_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("reasoning span pattern"));

/// Strip reasoning markup from a completion.
///
/// Closed spans are removed wherever they appear, newlines included. Residue
/// from truncated output is handled afterwards: a dangling `<think>` drops the
/// rest of the text, and a stray `</think>` drops everything before it.
/// Text without tags is returned unchanged.
pub fn strip_reasoning(text: &str) -> String {
    // The second pass catches spans spliced together by the first.
    let once = THINK_SPAN.replace_all(text, "");
    let mut cleaned = THINK_SPAN.replace_all(&once, "").into_owned();

    if let Some(open) = cleaned.find(OPEN) {
        cleaned.truncate(open);
    }
    if let Some(close) = cleaned.rfind(CLOSE) {
        cleaned.drain(..close + CLOSE.len());
    }
    cleaned
}
