//! Question sets: the categorized JSON the generator returns, and the
//! transformation into one ordered, category-tagged question list.

use serde::{de, Deserialize};
use serde_json::Value;

use crate::llm_client::strip_json_fences;
use crate::models::interview::{Question, QuestionCategory};

/// Raw generator output: category → list of questions.
/// Missing categories deserialize as empty; unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionSets {
    #[serde(default)]
    pub general: Vec<Value>,
    #[serde(default)]
    pub technical: Vec<Value>,
    #[serde(default)]
    pub project: Vec<Value>,
    #[serde(default)]
    pub experience: Vec<Value>,
}

impl QuestionSets {
    pub fn for_category(&self, category: QuestionCategory) -> &[Value] {
        match category {
            QuestionCategory::General => &self.general,
            QuestionCategory::Technical => &self.technical,
            QuestionCategory::Project => &self.project,
            QuestionCategory::Experience => &self.experience,
        }
    }
}

/// Parses a generator reply, tolerating ```json fences around the object.
pub fn parse_question_sets(raw: &str) -> Result<QuestionSets, serde_json::Error> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))?;
    if !value.is_object() {
        return Err(de::Error::custom("expected a JSON object keyed by category"));
    }
    serde_json::from_value(value)
}

/// Flattens categorized questions into interview order: categories in
/// `QuestionCategory::ALL` order, questions in the order given.
/// Non-string items are stringified; blank items are dropped.
pub fn flatten_question_sets(sets: &QuestionSets) -> Vec<Question> {
    QuestionCategory::ALL
        .iter()
        .flat_map(|&category| {
            sets.for_category(category)
                .iter()
                .filter_map(question_text)
                .map(move |text| Question { category, text })
        })
        .collect()
}

fn question_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => return None,
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}
