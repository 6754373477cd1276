use serde::{Deserialize, Serialize};

/// Role criteria the CV is screened against.
/// Missing lists are treated as "not specified" in the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCriteria {
    #[serde(default)]
    pub min_experience_years: u32,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub dealbreakers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    pub cv_text: String,
    pub role_title: String,
    pub criteria: RoleCriteria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenStatus {
    Shortlist,
    TalentPool,
    Reject,
}

/// Screening verdict returned to the client, parsed from LLM JSON output.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScreenAnalysis {
    pub score: i64,
    pub status: ScreenStatus,
    pub reasoning: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub candidate_email: Option<String>,
    #[serde(default)]
    pub candidate_phone: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ScreenStatus::TalentPool).unwrap(),
            "\"TALENT_POOL\""
        );
        let status: ScreenStatus = serde_json::from_str("\"SHORTLIST\"").unwrap();
        assert_eq!(status, ScreenStatus::Shortlist);
    }

    #[test]
    fn test_analysis_tolerates_missing_optional_fields() {
        let raw = r#"{"score": 82, "status": "SHORTLIST", "reasoning": "Strong match"}"#;
        let analysis: ScreenAnalysis = serde_json::from_str(raw).unwrap();
        assert_eq!(analysis.score, 82);
        assert!(analysis.candidate_name.is_none());
        assert!(analysis.strengths.is_empty());
    }

    #[test]
    fn test_criteria_defaults() {
        let criteria: RoleCriteria = serde_json::from_str("{}").unwrap();
        assert_eq!(criteria.min_experience_years, 0);
        assert!(criteria.required_skills.is_empty());
        assert!(criteria.education.is_none());
    }
}
