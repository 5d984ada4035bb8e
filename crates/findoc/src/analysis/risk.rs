use serde::Serialize;

use super::metrics::Metric;
use super::verify::contains_word;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Financial,
    Operational,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

const KEYWORDS: &[(RiskCategory, &[&str])] = &[
    (
        RiskCategory::Financial,
        &[
            "debt",
            "leverage",
            "liquidity",
            "impairment",
            "default",
            "going concern",
            "covenant",
            "write-down",
        ],
    ),
    (
        RiskCategory::Operational,
        &[
            "supply chain",
            "restructuring",
            "litigation",
            "cybersecurity",
            "recall",
            "labor shortage",
        ],
    ),
    (
        RiskCategory::Market,
        &[
            "competition",
            "volatility",
            "inflation",
            "interest rate",
            "recession",
            "currency",
            "regulatory",
        ],
    ),
];

const MEDIUM_THRESHOLD: usize = 2;
const HIGH_THRESHOLD: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub indicator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub mitigations: Vec<String>,
}

pub fn assess_risk(text: &str, metrics: &[Metric]) -> RiskAssessment {
    let lower = text.to_lowercase();
    let lower = lower.as_str();

    let mut factors: Vec<RiskFactor> = KEYWORDS
        .iter()
        .flat_map(|(category, words)| {
            words
                .iter()
                .filter(move |w| contains_word(lower, w))
                .map(move |w| RiskFactor {
                    category: *category,
                    indicator: w.to_string(),
                })
        })
        .collect();

    factors.extend(metrics.iter().filter(|m| m.negative).map(|m| RiskFactor {
        category: RiskCategory::Financial,
        indicator: format!("negative {} ({})", m.name, m.value),
    }));

    let level = match factors.len() {
        n if n >= HIGH_THRESHOLD => RiskLevel::High,
        n if n >= MEDIUM_THRESHOLD => RiskLevel::Medium,
        _ => RiskLevel::Low,
    };

    let mitigations = [
        (RiskCategory::Financial, "Strengthen liquidity and reduce leverage"),
        (RiskCategory::Operational, "Diversify suppliers and harden operations"),
        (RiskCategory::Market, "Diversify exposure and hedge rate and currency moves"),
    ]
    .iter()
    .filter(|(category, _)| factors.iter().any(|f| f.category == *category))
    .map(|(_, m)| m.to_string())
    .collect();

    RiskAssessment {
        level,
        factors,
        mitigations,
    }
}
