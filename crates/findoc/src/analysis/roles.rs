//! Role profiles for the pipeline stages.
//!
//! Built once at startup and shared read-only through `Arc<Roles>`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl RoleProfile {
    pub fn new(role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
        }
    }

    /// System prompt for model calls made on behalf of this role.
    pub fn system_prompt(&self) -> String {
        format!("You are a {}. {}\nYour goal: {}", self.role, self.backstory, self.goal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roles {
    pub verifier: RoleProfile,
    pub analyst: RoleProfile,
    pub risk_assessor: RoleProfile,
    pub advisor: RoleProfile,
}

impl Default for Roles {
    fn default() -> Self {
        Self {
            verifier: RoleProfile::new(
                "Financial Document Verifier",
                "Verify the uploaded document is a valid financial report and confirm readability.",
                "You specialize in financial document verification and check that a document \
                 is a legitimate financial report before further analysis.",
            ),
            analyst: RoleProfile::new(
                "Senior Financial Analyst",
                "Extract key financial metrics and provide evidence-based insights aligned \
                 with the query.",
                "You read corporate earnings reports daily and focus on accuracy and \
                 actionable, clearly structured findings.",
            ),
            risk_assessor: RoleProfile::new(
                "Risk Management Expert",
                "Perform balanced risk assessments, categorizing risks as low, medium, or high.",
                "You evaluate financial documents objectively and propose mitigation strategies.",
            ),
            advisor: RoleProfile::new(
                "Investment Advisor",
                "Provide buy, hold, or sell guidance based strictly on extracted data and \
                 market conditions.",
                "You have long experience in equity research and portfolio management.",
            ),
        }
    }
}
