use serde::Serialize;

/// Section markers looked for in a financial report.
const SECTIONS: &[(&str, &[&str])] = &[
    ("income statement", &["income statement", "revenue", "net income", "net sales", "profit"]),
    ("balance sheet", &["balance sheet", "total assets", "total liabilities", "equity"]),
    ("cash flow statement", &["cash flow", "operating activities", "free cash flow"]),
    ("per-share data", &["earnings per share", "eps", "dividend"]),
];

const MIN_SECTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub is_financial_report: bool,
    pub sections_found: Vec<String>,
    pub warnings: Vec<String>,
    pub characters: usize,
}

/// Checks extracted text for the sections a financial report carries.
pub fn verify(text: &str) -> Verification {
    let lower = text.to_lowercase();

    let sections_found: Vec<String> = SECTIONS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| contains_word(&lower, m)))
        .map(|(name, _)| name.to_string())
        .collect();

    let is_financial_report = sections_found.len() >= MIN_SECTIONS;
    let mut warnings = Vec::new();
    if !is_financial_report {
        warnings.push(format!(
            "Only {} of {} expected report sections found; results may be unreliable",
            sections_found.len(),
            SECTIONS.len()
        ));
    }

    Verification {
        is_financial_report,
        sections_found,
        warnings,
        characters: text.chars().count(),
    }
}

/// Case-folded `haystack` contains `needle` on word boundaries.
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_report_recognised() {
        let v = verify("Income Statement\nRevenue 120\nBalance Sheet\nTotal assets 900");
        assert!(v.is_financial_report);
        assert_eq!(v.sections_found, vec!["income statement", "balance sheet"]);
        assert!(v.warnings.is_empty());
    }

    #[test]
    fn test_non_financial_text_warns() {
        let v = verify("A recipe for bread: flour, water, salt.");
        assert!(!v.is_financial_report);
        assert_eq!(v.warnings.len(), 1);
    }

    #[test]
    fn test_contains_word_boundaries() {
        assert!(contains_word("eps rose", "eps"));
        assert!(!contains_word("steps taken", "eps"));
        assert!(contains_word("net sales, up", "net sales"));
    }
}
