use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const AMOUNT: &str = r"(\(?-?[$€£]?\s?\d[\d,]*(?:\.\d+)?\)?(?:\s?(?:million|billion|thousand|bn|mn)\b|%)?)";

fn metric_pattern(labels: &str) -> Regex {
    // Label, up to 40 non-numeric filler characters, then the amount.
    Regex::new(&format!(r"(?i)\b({})\b[^0-9$€£(\n-]{{0,40}}{}", labels, AMOUNT))
        .unwrap()
}

static METRICS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("revenue", metric_pattern(r"total revenues?|revenues?|net sales")),
        ("net_income", metric_pattern(r"net income|net profit|net earnings|net loss")),
        ("operating_income", metric_pattern(r"operating income|operating profit")),
        ("eps", metric_pattern(r"diluted eps|eps|earnings per share")),
        ("cash_flow", metric_pattern(r"free cash flow|operating cash flow|cash flow")),
        ("total_assets", metric_pattern(r"total assets")),
        ("total_liabilities", metric_pattern(r"total liabilities")),
    ]
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    /// Label as written in the document.
    pub label: String,
    pub value: String,
    /// Parenthesised, minus-signed, or reported as a loss.
    pub negative: bool,
}

/// First occurrence of each known metric, in catalogue order.
pub fn extract_metrics(text: &str) -> Vec<Metric> {
    METRICS
        .iter()
        .filter_map(|(name, re)| {
            let caps = re.captures(text)?;
            let label = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().trim().to_string();
            let negative = value.starts_with('(')
                || value.starts_with('-')
                || label.to_lowercase().contains("loss");
            Some(Metric {
                name: name.to_string(),
                label,
                value,
                negative,
            })
        })
        .collect()
}

pub fn find<'a>(metrics: &'a [Metric], name: &str) -> Option<&'a Metric> {
    metrics.iter().find(|m| m.name == name)
}
