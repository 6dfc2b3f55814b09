#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Strengths,
    Improvements,
    Recommendations,
}

impl Section {
    pub fn is_list(self) -> bool {
        matches!(self, Section::Strengths | Section::Improvements)
    }
}

/// A header rule matches a line when the lowercased line contains any of the
/// keywords (and a `:` when `needs_colon` is set).
#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    pub section: Section,
    pub keywords: &'static [&'static str],
    pub needs_colon: bool,
}

impl HeaderRule {
    fn matches(&self, lowered: &str) -> bool {
        if self.needs_colon && !lowered.contains(':') {
            return false;
        }
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

// Order is precedence: the first matching rule wins.
pub const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        section: Section::Overview,
        keywords: &["overview"],
        needs_colon: true,
    },
    HeaderRule {
        section: Section::Strengths,
        keywords: &["strength", "pros"],
        needs_colon: false,
    },
    HeaderRule {
        section: Section::Improvements,
        keywords: &["areas", "improvement", "cons"],
        needs_colon: false,
    },
    HeaderRule {
        section: Section::Recommendations,
        keywords: &["recommend", "suggestion"],
        needs_colon: false,
    },
];

pub const LIST_MARKERS: &[&str] = &["•", "-", "*", "1.", "2.", "3.", "A.", "B.", "C."];

pub fn classify_header(rules: &[HeaderRule], line: &str) -> Option<Section> {
    let lowered = line.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.section)
}

/// Strips a leading list marker and the punctuation or spacing that follows
/// it. Lines without a marker yield `None`.
pub fn strip_list_marker<'a>(markers: &[&str], line: &'a str) -> Option<&'a str> {
    let rest = markers
        .iter()
        .find_map(|marker| line.strip_prefix(marker))?;
    let item = rest.trim_start_matches(|ch: char| {
        ch.is_whitespace() || matches!(ch, '.' | ')' | ':' | '-')
    });
    Some(item.trim_end())
}
