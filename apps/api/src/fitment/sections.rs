//! The eight report sections. This table is the contract between the prompt
//! scaffolding and the report parser: both read labels from here, so the
//! text the model is asked to produce is exactly the text the parser matches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportSection {
    CandidateNameAndEmail,
    CanDoList,
    ShouldDoList,
    SkillComparisonTable,
    OverallMatchingScore,
    StrengthsAndWeaknesses,
    Recommendations,
    Conclusion,
}

impl ReportSection {
    /// All sections in report order.
    pub const ALL: [ReportSection; 8] = [
        ReportSection::CandidateNameAndEmail,
        ReportSection::CanDoList,
        ReportSection::ShouldDoList,
        ReportSection::SkillComparisonTable,
        ReportSection::OverallMatchingScore,
        ReportSection::StrengthsAndWeaknesses,
        ReportSection::Recommendations,
        ReportSection::Conclusion,
    ];

    /// 1-based position in the report.
    pub fn number(self) -> usize {
        match self {
            ReportSection::CandidateNameAndEmail => 1,
            ReportSection::CanDoList => 2,
            ReportSection::ShouldDoList => 3,
            ReportSection::SkillComparisonTable => 4,
            ReportSection::OverallMatchingScore => 5,
            ReportSection::StrengthsAndWeaknesses => 6,
            ReportSection::Recommendations => 7,
            ReportSection::Conclusion => 8,
        }
    }

    /// Literal label, punctuation included.
    pub fn label(self) -> &'static str {
        match self {
            ReportSection::CandidateNameAndEmail => "Candidate Name and Email",
            ReportSection::CanDoList => "\"Can Do\" list:",
            ReportSection::ShouldDoList => "\"Should Do\" list",
            ReportSection::SkillComparisonTable => "Skill Comparison Table:",
            ReportSection::OverallMatchingScore => SCORE_LABEL,
            ReportSection::StrengthsAndWeaknesses => "Analysis of Strengths and Weaknesses",
            ReportSection::Recommendations => "Recommendations for Improvement",
            ReportSection::Conclusion => "Conclusion on Fitment",
        }
    }

    /// `"N. Label"`, as rendered in reports.
    pub fn heading(self) -> String {
        format!("{}. {}", self.number(), self.label())
    }

    /// Exact label match.
    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == text)
    }
}

/// Marker the score extractor searches for.
pub const SCORE_LABEL: &str = "Overall Matching Score:";
