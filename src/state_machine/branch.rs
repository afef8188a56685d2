use std::fmt;

use serde::{Deserialize, Serialize};

/// The four skill branches of the assessment, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    Perceiving,
    Using,
    Understanding,
    Managing,
}

impl Branch {
    pub const ALL: [Branch; 4] = [
        Branch::Perceiving,
        Branch::Using,
        Branch::Understanding,
        Branch::Managing,
    ];

    /// 1-based position in the test.
    pub fn number(&self) -> usize {
        match self {
            Branch::Perceiving => 1,
            Branch::Using => 2,
            Branch::Understanding => 3,
            Branch::Managing => 4,
        }
    }

    /// Stable section identifier used in progress records.
    pub fn key(&self) -> &'static str {
        match self {
            Branch::Perceiving => "branch_1",
            Branch::Using => "branch_2",
            Branch::Understanding => "branch_3",
            Branch::Managing => "branch_4",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Branch::Perceiving => "Perceiving Emotions",
            Branch::Using => "Using Emotions to Facilitate Thought",
            Branch::Understanding => "Understanding Emotions",
            Branch::Managing => "Managing Emotions",
        }
    }

    /// Exact header line the generated text must carry.
    pub fn header(&self) -> String {
        format!("Branch {}: {}", self.number(), self.title())
    }

    pub fn next(&self) -> Option<Branch> {
        Branch::ALL.get(self.number()).copied()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_match_assessment_layout() {
        let headers: Vec<String> = Branch::ALL.iter().map(Branch::header).collect();
        assert_eq!(
            headers,
            vec![
                "Branch 1: Perceiving Emotions",
                "Branch 2: Using Emotions to Facilitate Thought",
                "Branch 3: Understanding Emotions",
                "Branch 4: Managing Emotions",
            ]
        );
    }

    #[test]
    fn next_walks_in_order() {
        assert_eq!(Branch::Perceiving.next(), Some(Branch::Using));
        assert_eq!(Branch::Using.next(), Some(Branch::Understanding));
        assert_eq!(Branch::Understanding.next(), Some(Branch::Managing));
        assert_eq!(Branch::Managing.next(), None);
    }

    #[test]
    fn keys_are_numbered() {
        assert_eq!(Branch::Perceiving.key(), "branch_1");
        assert_eq!(Branch::Managing.key(), "branch_4");
    }
}
