pub mod handlers;
pub mod models;
pub mod prompts;

use crate::errors::ApiError;
use crate::llm_client::LlmClient;
use crate::screening::models::{ScreenAnalysis, ScreenRequest, ScreenStatus};

/// Maps a 0-100 score to a screening verdict.
/// 70-100: SHORTLIST, 40-69: TALENT_POOL, 0-39: REJECT.
pub fn status_for_score(score: i64) -> ScreenStatus {
    if score >= 70 {
        ScreenStatus::Shortlist
    } else if score >= 40 {
        ScreenStatus::TalentPool
    } else {
        ScreenStatus::Reject
    }
}

/// Clamps the model-reported score and re-derives the verdict from it.
/// The model's own status claim is not trusted.
fn finalize(mut analysis: ScreenAnalysis) -> ScreenAnalysis {
    analysis.score = analysis.score.clamp(0, 100);
    analysis.status = status_for_score(analysis.score);
    analysis
}

/// Scores a CV against role criteria via the LLM.
pub async fn screen_cv(llm: &LlmClient, req: &ScreenRequest) -> Result<ScreenAnalysis, ApiError> {
    let prompt = prompts::build_screening_prompt(&req.role_title, &req.criteria, &req.cv_text);
    let analysis: ScreenAnalysis = llm.call_json(prompts::SCREEN_SYSTEM, &prompt).await?;
    Ok(finalize(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(score: i64, status: ScreenStatus) -> ScreenAnalysis {
        ScreenAnalysis {
            score,
            status,
            reasoning: "test".to_string(),
            candidate_name: None,
            candidate_email: None,
            candidate_phone: None,
            strengths: vec![],
            missing: vec![],
        }
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(status_for_score(0), ScreenStatus::Reject);
        assert_eq!(status_for_score(39), ScreenStatus::Reject);
        assert_eq!(status_for_score(40), ScreenStatus::TalentPool);
        assert_eq!(status_for_score(69), ScreenStatus::TalentPool);
        assert_eq!(status_for_score(70), ScreenStatus::Shortlist);
        assert_eq!(status_for_score(100), ScreenStatus::Shortlist);
    }

    #[test]
    fn test_finalize_clamps_score() {
        let out = finalize(analysis(250, ScreenStatus::Reject));
        assert_eq!(out.score, 100);
        assert_eq!(out.status, ScreenStatus::Shortlist);

        let out = finalize(analysis(-5, ScreenStatus::Shortlist));
        assert_eq!(out.score, 0);
        assert_eq!(out.status, ScreenStatus::Reject);
    }

    #[test]
    fn test_finalize_overrides_model_status() {
        // Model claims SHORTLIST but the score says otherwise.
        let out = finalize(analysis(35, ScreenStatus::Shortlist));
        assert_eq!(out.status, ScreenStatus::Reject);
    }
}
