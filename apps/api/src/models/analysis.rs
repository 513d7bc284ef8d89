use serde::{Deserialize, Serialize};

/// The normalized, guaranteed-shape output of one résumé analysis.
///
/// Every field is always present; sequence fields may be empty but never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub candidate_name: String,
    pub professional_summary: String,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub languages: Vec<Language>,
    pub hobbies: Vec<Hobby>,
    pub feedback: Feedback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub inferred_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub school: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub language: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hobby {
    pub name: String,
    /// Human qualities inferred from the hobby (team sport → team spirit).
    pub deduced_qualities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// 0 – 100 completeness/quality score.
    pub overall_match_score: f64,
}
