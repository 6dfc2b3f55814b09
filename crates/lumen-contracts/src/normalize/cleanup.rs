use std::sync::LazyLock;

use regex::Regex;

pub const FALLBACK_HEADER: &str = "# Overview";

static DASH_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)-[ \t]+").expect("dash bullet pattern"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|__").expect("emphasis pattern"));
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t-]*#+[ \t]*").expect("header pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("link pattern"));
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run pattern"));
static WIDE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"• {2,}").expect("wide bullet pattern"));

/// Rewrites model output into the house format: `# ` headers, `• ` bullets,
/// no emphasis markers, links or code ticks, at most one blank line in a row.
///
/// The result always starts with a `# ` header and `clean_review(clean_review(x))
/// == clean_review(x)`. Every `*` that survives emphasis removal becomes a
/// bullet, including multiplication signs inside sentences.
pub fn clean_review(raw: &str) -> String {
    // After the first pass no `*` or backtick is left, so later passes only
    // delete or shorten text and the loop settles.
    let mut current = clean_pass(raw);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = DASH_BULLET.replace_all(&text, "${1}• ");
    let text = EMPHASIS.replace_all(&text, "");
    let text = text.replace('*', "• ");
    let text = HEADER.replace_all(&text, "# ");
    let text = strip_links(&text).replace('`', "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    let text = DASH_BULLET.replace_all(&text, "${1}• ");
    let text = WIDE_BULLET.replace_all(&text, "• ");
    let text = text.trim();

    if text.starts_with("# ") {
        text.to_string()
    } else if text.is_empty() {
        FALLBACK_HEADER.to_string()
    } else {
        format!("{FALLBACK_HEADER}\n{text}")
    }
}

fn strip_links(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = LINK.replace_all(&current, "$1").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "plain sentence",
        "**Overview**\nA clean layout.\n- Good spacing\n  - nested point\n\n\n\n## Strengths\n* Bold colors",
        "- # Heading\n--#Other\n   ###   Deep",
        "see [docs](http://x) and `code` here",
        "[[a](b)](c)",
        "_`_ emphasis __made__ here",
        "`#` header after ticks",
        "2*3 = 6 and **bold** and __under__",
        "#",
        "\n\n  \n- item\r\n-\tdash tab\r\n",
        "•     wide bullet\n•\tkept tab",
        "[a]`(b)` link after ticks",
        "[_]__(x)_",
        "[_][_]__(x)_(v)_",
        "[_][_][_]__(x)_(v)_(v)_",
    ];

    fn nested_link_chain(depth: usize) -> String {
        let mut text = "[_]__(x)_".to_string();
        for _ in 0..depth {
            text = format!("[_]{text}(v)_");
        }
        text
    }

    #[test]
    fn cleanup_is_idempotent() {
        for sample in SAMPLES {
            let once = clean_review(sample);
            assert_eq!(clean_review(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn deep_link_and_underscore_chains_settle() {
        for depth in [7, 12, 20] {
            let input = nested_link_chain(depth);
            let once = clean_review(&input);
            assert_eq!(clean_review(&once), once, "depth {depth}");
            assert_eq!(once, "# Overview");
        }
    }

    #[test]
    fn cleaned_text_always_starts_with_header() {
        for sample in SAMPLES {
            let cleaned = clean_review(sample);
            assert!(cleaned.starts_with("# "), "output: {cleaned:?}");
        }
        assert_eq!(clean_review(""), "# Overview");
        assert_eq!(clean_review("plain sentence"), "# Overview\nplain sentence");
    }

    #[test]
    fn dash_bullets_become_dots_and_keep_indentation() {
        let cleaned = clean_review("# Strengths\n- item\n  - sub\nnot-a-bullet");
        assert_eq!(cleaned, "# Strengths\n• item\n  • sub\nnot-a-bullet");
    }

    #[test]
    fn emphasis_is_deleted_and_stray_asterisks_become_bullets() {
        let cleaned = clean_review("# Notes\n**Bold** and __under__\n* star item\n2*3");
        assert_eq!(cleaned, "# Notes\nBold and under\n• star item\n2• 3");
    }

    #[test]
    fn headers_are_normalized() {
        let cleaned = clean_review("## Strengths\n--### Improvements\n  #Recommendations");
        assert_eq!(cleaned, "# Strengths\n# Improvements\n# Recommendations");
    }

    #[test]
    fn links_and_backticks_are_stripped() {
        assert_eq!(
            clean_review("# Refs\nsee [docs](http://x)"),
            "# Refs\nsee docs"
        );
        assert_eq!(clean_review("# Code\nuse `flex-wrap`"), "# Code\nuse flex-wrap");
    }

    #[test]
    fn blank_runs_collapse_to_one_empty_line() {
        let cleaned = clean_review("# A\none\n\n\n\n\ntwo\n\n\nthree");
        assert_eq!(cleaned, "# A\none\n\ntwo\n\nthree");
    }

    #[test]
    fn bullets_uncovered_by_emphasis_removal_are_normalized() {
        let cleaned = clean_review("# A\n__- hidden__\n•    spaced");
        assert_eq!(cleaned, "# A\n• hidden\n• spaced");
    }

    #[test]
    fn windows_line_endings_are_handled() {
        let cleaned = clean_review("# A\r\n- one\r\n\r\n\r\n\r\n- two\r\n");
        assert_eq!(cleaned, "# A\n• one\n\n• two");
    }
}
