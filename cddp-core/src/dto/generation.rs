//! Generation DTOs

use serde::{Deserialize, Serialize};

use crate::domain::template::TemplateId;

/// Successful generation
///
/// `text` is the backend's raw answer, guaranteed to be valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub template: TemplateId,
    pub text: String,
}

impl GenerateResponse {
    /// Parses `text` into a JSON value
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.text)
    }
}

/// Template listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl From<TemplateId> for TemplateInfo {
    fn from(id: TemplateId) -> Self {
        let template = id.template();
        TemplateInfo {
            id,
            required: template.required().iter().map(|s| s.to_string()).collect(),
            optional: template.optional().iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_info_conversion() {
        let info: TemplateInfo = TemplateId::SampleData.into();
        assert_eq!(
            info.required,
            vec!["industry_name", "number_of_lines", "target_table"]
        );
        assert_eq!(info.optional, vec!["column_values_patterns"]);
    }

    #[test]
    fn test_generate_response_json() {
        let response = GenerateResponse {
            template: TemplateId::PipelineScenarios,
            text: r#"[{"pipeline_name":"a"}]"#.to_string(),
        };
        assert_eq!(response.json().unwrap()[0]["pipeline_name"], "a");
    }
}
