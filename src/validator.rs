//! Structural validation of an assembled test.
//!
//! The generated text must contain the four branches in order, each with three
//! questions, and every question must carry a scenario, at least four lettered
//! options and a score mapping that mentions every option letter. All defects
//! are collected; only a question without `Options:` stops early, since its
//! scores cannot be checked.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::state_machine::Branch;

const QUESTIONS_PER_BRANCH: usize = 3;
const MIN_OPTIONS: usize = 4;

const SCENARIO_MARKER: &str = "Scenario & Question:";
const OPTIONS_MARKER: &str = "Options:";
const SCORES_MARKER: &str = "Expert Consensus Scores:";

/// `Branch <digit>: <title>` anywhere in the text, up to the end of its line.
static BRANCH_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Branch\s+[0-9]:\s+[^\n]+").expect("branch header pattern"));

/// Outcome of [`validate`]: `ok` is true exactly when `defects` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub ok: bool,
    pub defects: Vec<String>,
}

impl ValidationReport {
    fn from_defects(defects: Vec<String>) -> Self {
        Self {
            ok: defects.is_empty(),
            defects,
        }
    }

    /// Defects joined for a single error message.
    pub fn summary(&self) -> String {
        self.defects.join("; ")
    }
}

/// A `Branch <n>: <title>` line and the text up to the next one.
struct BranchSection<'a> {
    header: &'a str,
    body: &'a str,
}

/// A `Question <n>` block inside a branch body.
struct QuestionBlock<'a> {
    number: &'a str,
    block: &'a str,
}

/// Validate the full text of a generated test.
pub fn validate(content: &str) -> ValidationReport {
    if content.trim().is_empty() {
        return ValidationReport::from_defects(vec!["Test content is empty".to_string()]);
    }

    let (preface, sections) = split_branches(content);
    if sections.is_empty() {
        return ValidationReport::from_defects(vec![
            "No branches found in generated content".to_string(),
        ]);
    }

    let mut defects = Vec::new();

    if !preface.trim().is_empty() {
        defects.push("Unexpected text found before the first branch".to_string());
    }

    if sections.len() != Branch::ALL.len() {
        defects.push(format!(
            "Expected {} branches but found {}",
            Branch::ALL.len(),
            sections.len()
        ));
    }

    for (branch, section) in Branch::ALL.iter().zip(&sections) {
        let expected = branch.header();
        if section.header != expected {
            defects.push(format!(
                "Expected branch header '{expected}' but found '{}'",
                section.header
            ));
        }
        check_branch_body(&expected, section.body, &mut defects);
    }

    ValidationReport::from_defects(defects)
}

fn check_branch_body(label: &str, body: &str, defects: &mut Vec<String>) {
    let questions = split_questions(body);
    if questions.len() != QUESTIONS_PER_BRANCH {
        defects.push(format!(
            "{label}: Expected {QUESTIONS_PER_BRANCH} questions but found {}",
            questions.len()
        ));
        return;
    }

    for QuestionBlock { number, block } in questions {
        let prefix = format!("{label} Question {number}");

        if !block.contains(SCENARIO_MARKER) {
            defects.push(format!("{prefix}: Missing 'Scenario & Question' section"));
        }

        if !block.contains(OPTIONS_MARKER) {
            defects.push(format!("{prefix}: Missing 'Options' section"));
            continue;
        }

        let letters: Vec<char> = block.lines().filter_map(option_letter).collect();
        if letters.len() < MIN_OPTIONS {
            defects.push(format!(
                "{prefix}: Expected at least {MIN_OPTIONS} options but found {}",
                letters.len()
            ));
        }

        let Some(scores) = scores_section(block) else {
            defects.push(format!("{prefix}: Missing 'Expert Consensus Scores' section"));
            continue;
        };

        let missing: BTreeSet<char> = letters
            .into_iter()
            .filter(|letter| !scores.contains(*letter))
            .collect();
        if !missing.is_empty() {
            let listed: Vec<String> = missing.iter().map(char::to_string).collect();
            defects.push(format!(
                "{prefix}: Missing scores for options {}",
                listed.join(", ")
            ));
        }
    }
}

/// Lines of `text` with their byte offsets.
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

/// Split on branch headers, returning the preface and each section.
///
/// Decoration around a header (`## `, `**`) stays outside it and lands in
/// the preface or the previous section's body.
fn split_branches(content: &str) -> (&str, Vec<BranchSection<'_>>) {
    let headers: Vec<regex::Match<'_>> = BRANCH_HEADER.find_iter(content).collect();

    let Some(first) = headers.first() else {
        return (content, Vec::new());
    };

    let sections = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let body_end = headers
                .get(i + 1)
                .map_or(content.len(), |next| next.start());
            BranchSection {
                header: header.as_str().trim(),
                body: &content[header.end()..body_end],
            }
        })
        .collect();

    (&content[..first.start()], sections)
}

/// Split a branch body into question blocks. A block runs from its
/// `Question <n>` line to the next one or the end of the body.
fn split_questions(body: &str) -> Vec<QuestionBlock<'_>> {
    // (number, block start, line start)
    let starts: Vec<(&str, usize, usize)> = lines_with_offsets(body)
        .filter_map(|(start, line)| {
            question_start(line).map(|(number, consumed)| (number, start + consumed, start))
        })
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &(number, block_start, _))| {
            let block_end = starts
                .get(i + 1)
                .map_or(body.len(), |&(_, _, next_line)| next_line);
            QuestionBlock {
                number,
                block: body[block_start..block_end].trim(),
            }
        })
        .collect()
}

/// Case-insensitive `Question <digits>` at the start of a line. Returns the
/// number and how many bytes of the line it spans.
fn question_start(line: &str) -> Option<(&str, usize)> {
    let indent = line.len() - line.trim_start().len();
    let trimmed = &line[indent..];

    let word = trimmed.get(..8)?;
    if !word.eq_ignore_ascii_case("question") {
        return None;
    }

    let rest = &trimmed[8..];
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        return None;
    }

    let digits = after_ws
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_ws.len());
    if digits == 0 {
        return None;
    }

    let consumed = line.len() - after_ws.len() + digits;
    Some((&after_ws[..digits], consumed))
}

/// `A) text` through `E) text` at the very start of a line.
fn option_letter(line: &str) -> Option<char> {
    let mut chars = line.chars();
    let letter = chars.next().filter(|c| ('A'..='E').contains(c))?;
    if chars.next()? != ')' {
        return None;
    }
    let text = chars.as_str();
    if text.starts_with(char::is_whitespace) && !text.trim().is_empty() {
        Some(letter)
    } else {
        None
    }
}

/// Text after the scores marker, up to the first blank line.
fn scores_section(block: &str) -> Option<&str> {
    let start = block.find(SCORES_MARKER)? + SCORES_MARKER.len();
    let section = &block[start..];
    Some(section.find("\n\n").map_or(section, |end| &section[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{branch_text, full_test};

    #[test]
    fn well_formed_test_passes() {
        let report = validate(&full_test());
        assert!(report.ok, "unexpected defects: {:?}", report.defects);
        assert!(report.defects.is_empty());
    }

    #[test]
    fn empty_content_fails_immediately() {
        let report = validate("   \n\t ");
        assert!(!report.ok);
        assert_eq!(report.defects, vec!["Test content is empty"]);
    }

    #[test]
    fn text_without_branches() {
        let report = validate("Here is your test!\nQuestion 1");
        assert_eq!(report.defects, vec!["No branches found in generated content"]);
    }

    #[test]
    fn three_branches_reports_count_mismatch() {
        let content: String = Branch::ALL[..3]
            .iter()
            .map(|b| branch_text(*b))
            .collect::<Vec<_>>()
            .join("\n\n");
        let report = validate(&content);
        assert!(!report.ok);
        assert!(
            report
                .defects
                .contains(&"Expected 4 branches but found 3".to_string())
        );
        assert_eq!(report.defects.len(), 1);
    }

    #[test]
    fn preface_is_reported_even_when_branches_are_valid() {
        let content = format!("Sure! Here is the test.\n\n{}", full_test());
        let report = validate(&content);
        assert_eq!(
            report.defects,
            vec!["Unexpected text found before the first branch"]
        );
    }

    #[test]
    fn wrong_header_names_expected_and_found() {
        let content = full_test().replace(
            "Branch 3: Understanding Emotions",
            "Branch 3: Understanding Feelings",
        );
        let report = validate(&content);
        assert_eq!(
            report.defects,
            vec![
                "Expected branch header 'Branch 3: Understanding Emotions' but found 'Branch 3: Understanding Feelings'"
            ]
        );
    }

    #[test]
    fn missing_score_letter_is_named() {
        let branch = "Branch 1: Perceiving Emotions\n\n\
            Question 1\n\n\
            Scenario & Question: A friend frowns. What do they feel?\n\n\
            Options:\n\
            A) Joy\n\
            B) Sadness\n\
            C) Anger\n\
            D) Calm\n\n\
            Expert Consensus Scores: A: 1, B: 5, C: 3\n\n\
            Question 2\n\n\
            Scenario & Question: s\n\nOptions:\nA) a\nB) b\nC) c\nD) d\n\n\
            Expert Consensus Scores: A: 1, B: 2, C: 3, D: 4\n\n\
            Question 3\n\n\
            Scenario & Question: s\n\nOptions:\nA) a\nB) b\nC) c\nD) d\n\n\
            Expert Consensus Scores: A: 1, B: 2, C: 3, D: 4\n";
        let content = format!(
            "{branch}\n\n{}",
            Branch::ALL[1..]
                .iter()
                .map(|b| branch_text(*b))
                .collect::<Vec<_>>()
                .join("\n\n")
        );
        let report = validate(&content);
        assert_eq!(
            report.defects,
            vec!["Branch 1: Perceiving Emotions Question 1: Missing scores for options D"]
        );
    }

    #[test]
    fn scores_section_stops_at_blank_line() {
        // E only appears after the blank line, so it counts as unscored.
        let block = "Scenario & Question: s\n\nOptions:\nA) a\nB) b\nC) c\nD) d\nE) e\n\n\
            Expert Consensus Scores: A: 1, B: 2, C: 3, D: 4\n\nE: 5";
        let mut defects = Vec::new();
        let body = format!(
            "\nQuestion 1\n{block}\nQuestion 2\n{block}\nQuestion 3\n{block}\n"
        );
        check_branch_body("Branch 1: Perceiving Emotions", &body, &mut defects);
        assert_eq!(defects.len(), 3);
        assert!(defects[0].ends_with("Question 1: Missing scores for options E"));
    }

    #[test]
    fn missing_options_short_circuits_question() {
        let body = "Question 1\nScenario & Question: s\nno options here\n\
            Question 2\nOptions:\nA) a\nB) b\nC) c\nD) d\nExpert Consensus Scores: A1 B2 C3 D4\n\
            Question 3\nScenario & Question: s\nOptions:\nA) a\nB) b\nExpert Consensus Scores: A: 1, B: 2\n";
        let mut defects = Vec::new();
        check_branch_body("Branch 2: Using Emotions to Facilitate Thought", body, &mut defects);
        assert_eq!(
            defects,
            vec![
                "Branch 2: Using Emotions to Facilitate Thought Question 1: Missing 'Options' section",
                "Branch 2: Using Emotions to Facilitate Thought Question 2: Missing 'Scenario & Question' section",
                "Branch 2: Using Emotions to Facilitate Thought Question 3: Expected at least 4 options but found 2",
            ]
        );
    }

    #[test]
    fn missing_scores_marker_is_reported() {
        let body = "Question 1\nScenario & Question: s\nOptions:\nA) a\nB) b\nC) c\nD) d\n\
            Question 2\nScenario & Question: s\nOptions:\nA) a\nB) b\nC) c\nD) d\nScores: A1\n\
            Question 3\nScenario & Question: s\nOptions:\nA) a\nB) b\nC) c\nD) d\nExpert Consensus Scores: A B C D\n";
        let mut defects = Vec::new();
        check_branch_body("Branch 4: Managing Emotions", body, &mut defects);
        assert_eq!(
            defects,
            vec![
                "Branch 4: Managing Emotions Question 1: Missing 'Expert Consensus Scores' section",
                "Branch 4: Managing Emotions Question 2: Missing 'Expert Consensus Scores' section",
            ]
        );
    }

    #[test]
    fn wrong_question_count_skips_question_checks() {
        let body = "Question 1\nnothing useful\nQuestion 2\nstill nothing\n";
        let mut defects = Vec::new();
        check_branch_body("Branch 3: Understanding Emotions", body, &mut defects);
        assert_eq!(
            defects,
            vec!["Branch 3: Understanding Emotions: Expected 3 questions but found 2"]
        );
    }

    #[test]
    fn defects_accumulate_across_branches() {
        let content = full_test()
            .replacen("Options:", "Choices:", 1)
            .replace("Branch 4: Managing Emotions", "Branch 4: Handling Emotions");
        let report = validate(&content);
        assert!(!report.ok);
        assert_eq!(report.defects.len(), 2);
        assert!(report.defects[0].contains("Question 1: Missing 'Options' section"));
        assert!(report.defects[1].starts_with("Expected branch header 'Branch 4: Managing Emotions'"));
        assert_eq!(
            report.summary(),
            format!("{}; {}", report.defects[0], report.defects[1])
        );
    }

    #[test]
    fn score_values_are_not_range_checked() {
        let content = full_test().replace("A: 1,", "A: 9,");
        assert!(validate(&content).ok);
    }

    #[test]
    fn question_marker_is_case_insensitive() {
        let content = full_test().replace("Question 2\n", "QUESTION 2\n");
        assert!(validate(&content).ok);
    }

    fn headers(content: &str) -> Vec<&str> {
        split_branches(content).1.iter().map(|s| s.header).collect()
    }

    #[test]
    fn branch_header_parsing() {
        assert_eq!(
            headers("  Branch 1: Perceiving Emotions \r\n"),
            vec!["Branch 1: Perceiving Emotions"]
        );
        assert!(headers("Branch 10: Too Many").is_empty());
        assert!(headers("Branch 1:NoSpace").is_empty());
        assert!(headers("Branch1: Missing Space").is_empty());
        assert_eq!(
            headers("**Branch 1: Perceiving Emotions**"),
            vec!["Branch 1: Perceiving Emotions**"]
        );
    }

    #[test]
    fn markdown_headers_are_found_and_reported_as_preface() {
        let content = full_test().replace("Branch ", "## Branch ");
        let (preface, sections) = split_branches(&content);
        assert_eq!(preface, "## ");
        assert_eq!(sections[1].header, "Branch 2: Using Emotions to Facilitate Thought");

        let report = validate(&content);
        assert_eq!(
            report.defects,
            vec!["Unexpected text found before the first branch"]
        );
    }

    #[test]
    fn markdown_headers_still_check_questions() {
        let content = full_test()
            .replace("Branch ", "## Branch ")
            .replacen("Options:", "Choices:", 1);
        let report = validate(&content);
        assert_eq!(report.defects.len(), 2);
        assert_eq!(report.defects[0], "Unexpected text found before the first branch");
        assert!(report.defects[1].ends_with("Question 1: Missing 'Options' section"));
    }

    #[test]
    fn option_letter_parsing() {
        assert_eq!(option_letter("A) Joy"), Some('A'));
        assert_eq!(option_letter("E)  Pride"), Some('E'));
        assert_eq!(option_letter("F) Out of range"), None);
        assert_eq!(option_letter(" A) indented"), None);
        assert_eq!(option_letter("A)no space"), None);
        assert_eq!(option_letter("A) "), None);
        assert_eq!(option_letter("a) lowercase"), None);
    }
}
