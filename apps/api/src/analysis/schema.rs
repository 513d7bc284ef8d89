//! Response-shape definition.
//!
//! One static [`Shape`] tree describes the analysis result. It is rendered into the
//! Gemini `responseSchema` (advisory to the model) and walked by the normalizer
//! (enforced locally), so the two can never drift apart.

use serde_json::{json, Map, Value};

pub const DEFAULT_CANDIDATE_NAME: &str = "Candidate";
pub const DEFAULT_SUMMARY: &str = "Analysis complete.";
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug)]
pub enum Shape {
    /// Free text. With a placeholder the value is guaranteed non-empty.
    Text { placeholder: Option<&'static str> },
    /// Numeric score, clamped into `[min, max]`; anything non-numeric becomes `min`.
    Score { min: f64, max: f64 },
    List(&'static Shape),
    Object(&'static [Field]),
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
    pub description: Option<&'static str>,
}

impl Field {
    const fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: false,
            description: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

const TEXT: Shape = Shape::Text { placeholder: None };
const TEXT_LIST: Shape = Shape::List(&TEXT);

const EXPERIENCE_FIELDS: &[Field] = &[
    Field::new("title", TEXT),
    Field::new("company", TEXT),
    Field::new("startDate", TEXT),
    Field::new("endDate", TEXT),
    Field::new("description", TEXT),
    Field::new("inferredSkills", TEXT_LIST)
        .describe("Skills inferred from this specific experience"),
];

const EDUCATION_FIELDS: &[Field] = &[
    Field::new("degree", TEXT),
    Field::new("school", TEXT),
    Field::new("startDate", TEXT),
    Field::new("endDate", TEXT),
];

const LANGUAGE_FIELDS: &[Field] = &[
    Field::new("language", TEXT),
    Field::new("level", TEXT),
];

const HOBBY_FIELDS: &[Field] = &[
    Field::new("name", TEXT),
    Field::new("deducedQualities", TEXT_LIST)
        .describe("Human qualities deduced from this hobby (e.g. team sport -> team spirit)"),
];

const FEEDBACK_FIELDS: &[Field] = &[
    Field::new("strengths", TEXT_LIST).describe("Strong points of the profile"),
    Field::new("improvements", TEXT_LIST).describe("Suggestions to improve the CV"),
    Field::new(
        "overallMatchScore",
        Shape::Score {
            min: MIN_SCORE,
            max: MAX_SCORE,
        },
    )
    .describe("Score from 0 to 100 rating the quality and completeness of the CV"),
];

const ANALYSIS_FIELDS: &[Field] = &[
    Field::new(
        "candidateName",
        Shape::Text {
            placeholder: Some(DEFAULT_CANDIDATE_NAME),
        },
    )
    .required()
    .describe("Full name of the candidate as found on the CV"),
    Field::new(
        "professionalSummary",
        Shape::Text {
            placeholder: Some(DEFAULT_SUMMARY),
        },
    )
    .required()
    .describe("A three-sentence professional summary highlighting the profile"),
    Field::new("experiences", Shape::List(&EXPERIENCE)).required(),
    Field::new("education", Shape::List(&EDUCATION)).required(),
    Field::new("hardSkills", TEXT_LIST)
        .required()
        .describe("Exhaustive list of technical skills"),
    Field::new("softSkills", TEXT_LIST)
        .required()
        .describe("Soft skills deduced from the whole profile"),
    Field::new("languages", Shape::List(&LANGUAGE)).required(),
    Field::new("hobbies", Shape::List(&HOBBY)).required(),
    Field::new("feedback", FEEDBACK).required(),
];

const EXPERIENCE: Shape = Shape::Object(EXPERIENCE_FIELDS);
const EDUCATION: Shape = Shape::Object(EDUCATION_FIELDS);
const LANGUAGE: Shape = Shape::Object(LANGUAGE_FIELDS);
const HOBBY: Shape = Shape::Object(HOBBY_FIELDS);
const FEEDBACK: Shape = Shape::Object(FEEDBACK_FIELDS);

/// Shape of the full analysis result.
pub static ANALYSIS_SHAPE: Shape = Shape::Object(ANALYSIS_FIELDS);

impl Shape {
    /// Renders this shape as a Gemini `responseSchema` (OpenAPI subset).
    pub fn to_response_schema(&self) -> Value {
        match self {
            Shape::Text { .. } => json!({ "type": "STRING" }),
            Shape::Score { .. } => json!({ "type": "NUMBER" }),
            Shape::List(item) => json!({ "type": "ARRAY", "items": item.to_response_schema() }),
            Shape::Object(fields) => {
                let mut properties = Map::new();
                for field in fields.iter() {
                    let mut schema = field.shape.to_response_schema();
                    if let (Some(description), Value::Object(obj)) = (field.description, &mut schema) {
                        obj.insert("description".to_string(), json!(description));
                    }
                    properties.insert(field.name.to_string(), schema);
                }

                let mut schema = json!({ "type": "OBJECT", "properties": properties });
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name)
                    .collect();
                if !required.is_empty() {
                    schema["required"] = json!(required);
                }
                schema
            }
        }
    }
}

/// The `responseSchema` sent with every analysis request.
pub fn response_schema() -> Value {
    ANALYSIS_SHAPE.to_response_schema()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_required_keys() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec![
                "candidateName",
                "professionalSummary",
                "experiences",
                "education",
                "hardSkills",
                "softSkills",
                "languages",
                "hobbies",
                "feedback",
            ]
        );
        assert_eq!(schema["type"], "OBJECT");
    }

    #[test]
    fn test_nested_shapes_are_rendered() {
        let schema = response_schema();
        let props = &schema["properties"];

        let experience = &props["experiences"]["items"];
        assert_eq!(props["experiences"]["type"], "ARRAY");
        assert_eq!(experience["type"], "OBJECT");
        assert_eq!(experience["properties"]["inferredSkills"]["type"], "ARRAY");
        assert_eq!(
            experience["properties"]["inferredSkills"]["items"]["type"],
            "STRING"
        );
        assert!(experience.get("required").is_none());

        assert_eq!(
            props["hobbies"]["items"]["properties"]["deducedQualities"]["type"],
            "ARRAY"
        );
        assert_eq!(props["languages"]["items"]["properties"]["level"]["type"], "STRING");
        assert_eq!(props["education"]["items"]["properties"]["school"]["type"], "STRING");
    }

    #[test]
    fn test_feedback_score_is_numeric() {
        let schema = response_schema();
        let feedback = &schema["properties"]["feedback"];
        assert_eq!(feedback["type"], "OBJECT");
        assert_eq!(feedback["properties"]["overallMatchScore"]["type"], "NUMBER");
        assert!(feedback["properties"]["overallMatchScore"]["description"]
            .as_str()
            .unwrap()
            .contains("0 to 100"));
    }

    #[test]
    fn test_descriptions_attach_to_fields() {
        let schema = response_schema();
        assert_eq!(
            schema["properties"]["hardSkills"]["description"],
            "Exhaustive list of technical skills"
        );
        assert!(schema["properties"]["experiences"].get("description").is_none());
    }
}
