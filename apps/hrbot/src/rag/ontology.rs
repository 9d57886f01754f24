//! HR keyword ontology: decides whether an unanswered question is still an HR topic.
//!
//! Only consulted after retrieval found nothing relevant. A hit means "send
//! them to a human", a miss means "politely refuse".

use std::str::FromStr;

pub const HR_KEYWORDS: &[&str] = &[
    // Leave
    "leave",
    "casual leave",
    "sick leave",
    "annual leave",
    "vacation",
    "holiday",
    "maternity",
    "paternity",
    "compassionate leave",
    "absence",
    // Salary / payroll
    "salary",
    "pay",
    "wage",
    "payment",
    "payroll",
    "allowance",
    "bonus",
    "deduction",
    "stipend",
    "compensation",
    "earnings",
    // Policies
    "policy",
    "handbook",
    "guideline",
    "code of conduct",
    "rules",
    // Hiring / onboarding
    "onboarding",
    "hiring",
    "recruitment",
    "job offer",
    "probation",
    "orientation",
    "induction",
    "employment",
    // Departments / relations
    "hr",
    "human resource",
    "employee",
    "staff",
    "relations",
    "team",
    "supervisor",
    "manager",
    "performance",
    // Performance
    "review",
    "kpi",
    "evaluation",
    "appraisal",
    "promotion",
    "rating",
    // Benefits
    "benefit",
    "insurance",
    "medical",
    "health",
    "retirement",
    "pension",
    "gratuity",
    // Conduct
    "discipline",
    "warning",
    "harassment",
    "complaint",
    "grievance",
    "termination",
    "exit",
    "resignation",
    "dismissal",
    // Work hours
    "work hours",
    "attendance",
    "shift",
    "overtime",
    "lateness",
    // Training
    "training",
    "development",
    "learning",
    "workshop",
    "course",
    // Loans
    "loan",
    "salary advance",
    // Safety
    "safety",
    "workplace safety",
    "security",
];

/// How keywords are matched against a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeywordMatching {
    /// Keyword appears anywhere, even inside a longer word ("hr" in "three").
    #[default]
    Substring,
    /// Keyword must be delimited by non-alphanumeric characters or the text edges.
    WordBoundary,
}

impl FromStr for KeywordMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(KeywordMatching::Substring),
            "word" | "word_boundary" => Ok(KeywordMatching::WordBoundary),
            other => Err(format!(
                "unknown keyword matching mode '{other}' (expected 'substring' or 'word')"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ontology {
    keywords: Vec<String>,
    matching: KeywordMatching,
}

impl Default for Ontology {
    fn default() -> Self {
        Self::new(KeywordMatching::default())
    }
}

impl Ontology {
    pub fn new(matching: KeywordMatching) -> Self {
        Self::with_keywords(HR_KEYWORDS.iter().copied(), matching)
    }

    pub fn with_keywords<'a>(
        keywords: impl IntoIterator<Item = &'a str>,
        matching: KeywordMatching,
    ) -> Self {
        Self {
            keywords: keywords.into_iter().map(str::to_lowercase).collect(),
            matching,
        }
    }

    pub fn matching(&self) -> KeywordMatching {
        self.matching
    }

    /// First keyword found in the lower-cased question, if any.
    pub fn find_keyword(&self, question: &str) -> Option<&str> {
        let lower = question.to_lowercase();
        self.keywords
            .iter()
            .find(|kw| match self.matching {
                KeywordMatching::Substring => lower.contains(kw.as_str()),
                KeywordMatching::WordBoundary => contains_word(&lower, kw),
            })
            .map(String::as_str)
    }

    pub fn is_in_domain(&self, question: &str) -> bool {
        self.find_keyword(question).is_some()
    }
}

fn contains_word(text: &str, keyword: &str) -> bool {
    text.match_indices(keyword).any(|(start, _)| {
        let end = start + keyword.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_question_is_in_domain() {
        let ontology = Ontology::default();
        assert_eq!(
            ontology.find_keyword("How many sick LEAVE days do I get?"),
            Some("leave")
        );
    }

    #[test]
    fn test_payroll_question_is_in_domain() {
        assert!(Ontology::default().is_in_domain("When does payroll run?"));
    }

    #[test]
    fn test_weather_question_is_out_of_domain() {
        assert!(!Ontology::default().is_in_domain("What's the weather today?"));
    }

    #[test]
    fn test_substring_mode_matches_inside_words() {
        // "hr" inside "three"
        let ontology = Ontology::with_keywords(["hr"], KeywordMatching::Substring);
        assert!(ontology.is_in_domain("give me three reasons"));
    }

    #[test]
    fn test_word_boundary_mode_requires_whole_words() {
        let ontology = Ontology::with_keywords(["hr", "sick leave"], KeywordMatching::WordBoundary);
        assert!(!ontology.is_in_domain("give me three reasons"));
        assert!(ontology.is_in_domain("who is my HR contact?"));
        assert!(ontology.is_in_domain("sick leave."));
        assert!(!ontology.is_in_domain("homesick leaves"));
    }

    #[test]
    fn test_parse_matching_mode() {
        assert_eq!(
            "substring".parse::<KeywordMatching>().unwrap(),
            KeywordMatching::Substring
        );
        assert_eq!(
            " Word ".parse::<KeywordMatching>().unwrap(),
            KeywordMatching::WordBoundary
        );
        assert!("fuzzy".parse::<KeywordMatching>().is_err());
    }
}
