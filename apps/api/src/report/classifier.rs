//! Line classifier for model-generated report text.
//!
//! A two-state machine: `Outside` until the first section heading, then
//! `InSection(section)`. Each line is classified by pure functions of the
//! current state and the line itself, in this precedence:
//!
//! 1. heading — the cleaned line equals a section label, optionally numbered
//! 2. bullet  — inside a section and the line starts with `"- "`
//! 3. table   — the line contains `|`; exactly four cells or it is dropped
//! 4. text    — anything else (an empty line is a blank)

use crate::fitment::sections::ReportSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    Outside,
    InSection(ReportSection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportLine {
    Heading(ReportSection),
    Bullet(String),
    TableRow([String; 4]),
    Text(String),
    Blank,
    /// A pipe row with the wrong number of cells. Never rendered.
    Dropped,
}

/// Trims the line and removes emphasis: every `*` and any leading `#`s.
pub fn clean_line(raw: &str) -> String {
    let without_stars = raw.replace('*', "");
    without_stars
        .trim()
        .trim_start_matches('#')
        .trim()
        .to_string()
}

/// Matches a cleaned line against the section labels, ignoring a leading
/// `"N."` or `"N)"`.
pub fn match_heading(line: &str) -> Option<ReportSection> {
    ReportSection::from_label(line).or_else(|| ReportSection::from_label(strip_number(line)?))
}

fn strip_number(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .map(str::trim_start)
}

/// Splits a pipe-delimited row. The pieces before the first and after the
/// last `|` are discarded; the rest are trimmed cells.
pub fn split_table_cells(line: &str) -> Vec<String> {
    let pieces: Vec<&str> = line.split('|').collect();
    if pieces.len() < 2 {
        return Vec::new();
    }
    pieces[1..pieces.len() - 1]
        .iter()
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Classifies one raw line and returns the next state.
pub fn classify_line(state: ParseState, raw: &str) -> (ReportLine, ParseState) {
    let line = clean_line(raw);

    if let Some(section) = match_heading(&line) {
        return (ReportLine::Heading(section), ParseState::InSection(section));
    }

    if let ParseState::InSection(_) = state {
        if let Some(item) = line.strip_prefix("- ") {
            return (ReportLine::Bullet(item.trim().to_string()), state);
        }
    }

    if line.contains('|') {
        let kind = match <[String; 4]>::try_from(split_table_cells(&line)) {
            Ok(cells) => ReportLine::TableRow(cells),
            Err(_) => ReportLine::Dropped,
        };
        return (kind, state);
    }

    if line.is_empty() {
        (ReportLine::Blank, state)
    } else {
        (ReportLine::Text(line), state)
    }
}

/// Classifies every line of the report, dropping malformed table rows.
pub fn parse_report(content: &str) -> Vec<ReportLine> {
    let mut state = ParseState::default();
    let mut lines = Vec::new();

    for raw in content.lines() {
        let (line, next) = classify_line(state, raw);
        state = next;
        if line != ReportLine::Dropped {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REPORT: &str = r#"Okay, here is the report.
**1. Candidate Name and Email**
Alice Doe - alice@example.com
2. "Can Do" list:
- Rust: Expert
- Kubernetes: Intermediate
3. "Should Do" list
- Rust: Expert
4. Skill Comparison Table:
| Skill | "Can Do" Level | "Should Do" Level | Matching Score |
|---|---|---|---|
| Rust | Expert | Expert | 100% |
| Go | Beginner | Competent | 40% |
| Broken | row |
5. Overall Matching Score: 82.5%
6. Analysis of Strengths and Weaknesses

Strong systems background.
7. Recommendations for Improvement
8. Conclusion on Fitment
- Recommend for interview
"#;

    fn count<F: Fn(&ReportLine) -> bool>(lines: &[ReportLine], f: F) -> usize {
        lines.iter().filter(|l| f(l)).count()
    }

    #[test]
    fn test_clean_line_strips_emphasis() {
        assert_eq!(clean_line("  **Bold** text "), "Bold text");
        assert_eq!(clean_line("## 1. Candidate Name and Email"), "1. Candidate Name and Email");
    }

    #[test]
    fn test_heading_with_and_without_number() {
        assert_eq!(
            match_heading("Conclusion on Fitment"),
            Some(ReportSection::Conclusion)
        );
        assert_eq!(
            match_heading("8. Conclusion on Fitment"),
            Some(ReportSection::Conclusion)
        );
        assert_eq!(
            match_heading("2.\"Can Do\" list:"),
            Some(ReportSection::CanDoList)
        );
        assert_eq!(match_heading("8 Conclusion on Fitment"), None);
        assert_eq!(match_heading("5. Overall Matching Score: 82%"), None);
    }

    #[test]
    fn test_bullet_requires_active_section() {
        let (line, state) = classify_line(ParseState::Outside, "- orphan");
        assert_eq!(line, ReportLine::Text("- orphan".into()));
        assert_eq!(state, ParseState::Outside);

        let in_section = ParseState::InSection(ReportSection::CanDoList);
        let (line, state) = classify_line(in_section, "  - Rust: Expert");
        assert_eq!(line, ReportLine::Bullet("Rust: Expert".into()));
        assert_eq!(state, in_section);
    }

    #[test]
    fn test_heading_switches_section() {
        let (line, state) = classify_line(
            ParseState::InSection(ReportSection::CanDoList),
            "3. \"Should Do\" list",
        );
        assert_eq!(line, ReportLine::Heading(ReportSection::ShouldDoList));
        assert_eq!(state, ParseState::InSection(ReportSection::ShouldDoList));
    }

    #[test]
    fn test_table_row_cells() {
        let (line, _) = classify_line(ParseState::Outside, "| Rust | Expert | Expert | 100% |");
        assert_eq!(
            line,
            ReportLine::TableRow([
                "Rust".into(),
                "Expert".into(),
                "Expert".into(),
                "100%".into()
            ])
        );
    }

    #[test]
    fn test_wrong_cell_count_dropped() {
        let (line, _) = classify_line(ParseState::Outside, "| a | b |");
        assert_eq!(line, ReportLine::Dropped);
        let (line, _) = classify_line(ParseState::Outside, "| a | b | c | d | e |");
        assert_eq!(line, ReportLine::Dropped);
        let (line, _) = classify_line(ParseState::Outside, "a | b");
        assert_eq!(line, ReportLine::Dropped);
    }

    #[test]
    fn test_four_rows_in_four_rows_out() {
        let text = "\
| Skill | Can | Should | Score |
| Rust | Expert | Expert | 100% |
| Go | Beginner | Competent | 40% |
| SQL | Competent | Competent | 100% |
| bad | row |";
        let lines = parse_report(text);
        assert_eq!(count(&lines, |l| matches!(l, ReportLine::TableRow(_))), 4);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_sample_report_structure() {
        let lines = parse_report(SAMPLE_REPORT);

        let headings: Vec<_> = lines
            .iter()
            .filter_map(|l| match l {
                ReportLine::Heading(s) => Some(s.number()),
                _ => None,
            })
            .collect();
        // Section 5 carries its value on the same line, so it is body text.
        assert_eq!(headings, vec![1, 2, 3, 4, 6, 7, 8]);

        assert_eq!(count(&lines, |l| matches!(l, ReportLine::Bullet(_))), 4);
        // Header, separator and two data rows; the broken row is dropped.
        assert_eq!(count(&lines, |l| matches!(l, ReportLine::TableRow(_))), 4);
        assert_eq!(count(&lines, |l| matches!(l, ReportLine::Blank)), 1);
        assert_eq!(
            lines[0],
            ReportLine::Text("Okay, here is the report.".into())
        );
        assert!(lines.contains(&ReportLine::Text(
            "5. Overall Matching Score: 82.5%".into()
        )));
    }
}
