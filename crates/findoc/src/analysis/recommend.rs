use serde::Serialize;

use super::metrics::{self, Metric};
use super::risk::{RiskAssessment, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Hold,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Earnings {
    Profit,
    Loss,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    pub rationale: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_context: Option<String>,
}

pub fn recommend(
    metrics: &[Metric],
    risk: &RiskAssessment,
    market_context: Option<String>,
) -> Recommendation {
    let earnings = match metrics::find(metrics, "net_income") {
        Some(m) if m.negative => Earnings::Loss,
        Some(_) => Earnings::Profit,
        None => Earnings::Unknown,
    };

    let action = match (risk.level, earnings) {
        (RiskLevel::Low, Earnings::Profit) => Action::Buy,
        (RiskLevel::High, Earnings::Loss | Earnings::Unknown) => Action::Sell,
        (RiskLevel::Medium, Earnings::Loss) => Action::Sell,
        _ => Action::Hold,
    };

    let mut rationale = vec![format!("Overall risk profile is {:?}", risk.level)];
    match earnings {
        Earnings::Profit => rationale.push("The company reports positive net income".to_string()),
        Earnings::Loss => rationale.push("The company reports a net loss".to_string()),
        Earnings::Unknown => {
            rationale.push("Net income could not be determined from the document".to_string())
        }
    }
    if let Some(revenue) = metrics::find(metrics, "revenue") {
        rationale.push(format!("Reported revenue: {}", revenue.value));
    }

    Recommendation {
        action,
        rationale,
        market_context: market_context.filter(|c| !c.trim().is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(level: RiskLevel) -> RiskAssessment {
        RiskAssessment {
            level,
            factors: vec![],
            mitigations: vec![],
        }
    }

    fn net_income(negative: bool) -> Vec<Metric> {
        vec![Metric {
            name: "net_income".into(),
            label: if negative { "Net loss" } else { "Net income" }.into(),
            value: "$5 million".into(),
            negative,
        }]
    }

    #[test]
    fn test_low_risk_profitable_is_buy() {
        let r = recommend(&net_income(false), &risk(RiskLevel::Low), None);
        assert_eq!(r.action, Action::Buy);
        assert!(r.market_context.is_none());
    }

    #[test]
    fn test_high_risk_unknown_earnings_is_sell() {
        let r = recommend(&[], &risk(RiskLevel::High), None);
        assert_eq!(r.action, Action::Sell);
    }

    #[test]
    fn test_medium_risk_loss_is_sell() {
        let r = recommend(&net_income(true), &risk(RiskLevel::Medium), None);
        assert_eq!(r.action, Action::Sell);
        assert!(r.rationale.iter().any(|s| s.contains("net loss")));
    }

    #[test]
    fn test_otherwise_hold() {
        assert_eq!(
            recommend(&net_income(false), &risk(RiskLevel::High), None).action,
            Action::Hold
        );
        assert_eq!(recommend(&[], &risk(RiskLevel::Low), None).action, Action::Hold);
    }

    #[test]
    fn test_blank_market_context_dropped() {
        let r = recommend(&[], &risk(RiskLevel::Low), Some("  ".into()));
        assert!(r.market_context.is_none());
        let r = recommend(&[], &risk(RiskLevel::Low), Some("- Outlook: stable".into()));
        assert_eq!(r.market_context.as_deref(), Some("- Outlook: stable"));
    }
}
