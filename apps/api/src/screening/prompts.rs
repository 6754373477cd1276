// Screening LLM prompt templates.
// All prompts for the screening module are defined here.

use crate::screening::models::RoleCriteria;

pub const SCREEN_SYSTEM: &str =
    "You are an expert HR screener. Respond only with valid JSON.";

/// Builds the screening prompt from the role criteria and raw CV text,
/// with must-have / nice-to-have / dealbreaker sections.
pub fn build_screening_prompt(role_title: &str, criteria: &RoleCriteria, cv_text: &str) -> String {
    format!(
        r#"You are screening CVs for: {role_title}

MUST HAVE (fail without these):
- Minimum {min_years} years experience
- Required skills: {required}
- Location: {locations}

NICE TO HAVE (boost score):
- Preferred skills: {preferred}
- Education: {education}

DEALBREAKERS (auto-reject):
{dealbreakers}

CV TEXT:
{cv_text}

Analyze this CV and respond with JSON only (no other text):
{{
  "score": <number 0-100>,
  "status": "<SHORTLIST|TALENT_POOL|REJECT>",
  "reasoning": "<1-2 sentences explaining the decision>",
  "candidate_name": "<extracted name or null>",
  "candidate_email": "<extracted email or null>",
  "candidate_phone": "<extracted phone or null>",
  "strengths": ["<strength1>", "<strength2>"],
  "missing": ["<missing1>", "<missing2>"]
}}

Scoring guide:
- 70-100: SHORTLIST - Meets all must-haves, strong match
- 40-69: TALENT_POOL - Missing something but good for future roles
- 0-39: REJECT - Missing critical requirements"#,
        min_years = criteria.min_experience_years,
        required = list_or(&criteria.required_skills, ", ", "None specified"),
        locations = list_or(&criteria.locations, " or ", "Any"),
        preferred = list_or(&criteria.preferred_skills, ", ", "None specified"),
        education = criteria.education.as_deref().unwrap_or("Not specified"),
        dealbreakers = bullet_list(&criteria.dealbreakers),
    )
}

fn list_or(items: &[String], separator: &str, fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(separator)
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "None specified".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
