use crate::review::StructuredReview;

use super::sections::{classify_header, strip_list_marker, HeaderRule, Section};

/// Splits loosely formatted review text into overview, strengths,
/// improvements and recommendations.
///
/// Header lines are recognized by keyword and dropped. Text before the first
/// header is ignored, and list sections only keep lines that start with a
/// list marker.
pub fn extract_sections(
    raw: &str,
    rules: &[HeaderRule],
    markers: &[&str],
    is_premium: bool,
) -> StructuredReview {
    let mut overview = String::new();
    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    let mut recommendations = String::new();
    let mut current: Option<Section> = None;

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(section) = classify_header(rules, line) {
            match section {
                Section::Strengths => strengths.clear(),
                Section::Improvements => improvements.clear(),
                Section::Overview | Section::Recommendations => {}
            }
            current = Some(section);
            continue;
        }

        let Some(section) = current else {
            continue;
        };
        match section {
            Section::Overview => append_text(&mut overview, line),
            Section::Recommendations => append_text(&mut recommendations, line),
            Section::Strengths | Section::Improvements => {
                let Some(item) = strip_list_marker(markers, line) else {
                    continue;
                };
                if item.is_empty() {
                    continue;
                }
                let list = if section == Section::Strengths {
                    &mut strengths
                } else {
                    &mut improvements
                };
                list.push(item.to_string());
            }
        }
    }

    StructuredReview {
        overview: overview.trim().to_string(),
        strengths,
        improvements,
        recommendations: recommendations.trim().to_string(),
        is_premium,
    }
}

fn append_text(target: &mut String, line: &str) {
    target.push(' ');
    target.push_str(line);
}
