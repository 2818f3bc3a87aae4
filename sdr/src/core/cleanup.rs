//! Normalization of raw model text before it is used in an email.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").expect("fence regex is valid")
});

static SUBJECT_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*[*_]*\s*subject\s*[*_]*\s*:\s*[*_]*\s*").expect("label regex is valid")
});

static BODY_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("body regex is valid"));

/// Remove a single surrounding Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    match FENCE_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// Reduce subject-writer output to one clean subject line.
///
/// Takes the first non-empty line, drops a leading `Subject:` label (plain or
/// Markdown-emphasized) and one pair of matching surrounding quotes or
/// emphasis markers. Errors when nothing usable remains.
pub fn clean_subject(raw: &str) -> Result<String> {
    let line = strip_code_fence(raw)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    let line = SUBJECT_LABEL_RE.replace(line, "");
    let subject = strip_wrapping(line.trim()).trim();
    if subject.is_empty() {
        bail!("subject writer returned an empty subject");
    }
    Ok(subject.to_string())
}

/// Remove one wrapper that opens and closes the text with the same marker.
fn strip_wrapping(text: &str) -> &str {
    for marker in ["**", "__", "\"", "'", "`", "*", "_", "“"] {
        let close = if marker == "“" { "”" } else { marker };
        if let Some(inner) = text
            .strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    text
}

/// Insert the signature block before `</body>`, or append it when the
/// converter returned a fragment.
pub fn attach_signature(html: &str, signature: &str) -> String {
    let html = strip_code_fence(html);
    match BODY_CLOSE_RE.find_iter(html).last() {
        Some(close) => {
            let mut out = String::with_capacity(html.len() + signature.len() + 1);
            out.push_str(&html[..close.start()]);
            out.push_str(signature);
            out.push('\n');
            out.push_str(&html[close.start()..]);
            out
        }
        None => format!("{html}\n{signature}"),
    }
}
