//! Shared gloss-field extraction for the two NLP adapters
//! (`text_to_gloss`, `gloss_to_text`) that return gloss-shaped JSON under
//! one of several key names, mirroring the original's `_extract_gloss`.

use serde_json::Value;

use sign_core::ports::ai::NlpOutput;

use crate::error::AiError;

pub(super) fn extract_gloss_field(body: &Value) -> Result<NlpOutput, AiError> {
    for key in ["gloss_translation", "gloss", "output", "text"] {
        if let Some(value) = body.get(key) {
            if let Some(array) = value.as_array() {
                let tokens: Vec<String> = array
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if !tokens.is_empty() {
                    return Ok(NlpOutput::Gloss(tokens));
                }
            } else if let Some(s) = value.as_str() {
                let tokens: Vec<String> = s.split_whitespace().map(str::to_string).collect();
                if !tokens.is_empty() {
                    return Ok(NlpOutput::Gloss(tokens));
                }
            }
        }
    }
    Err(AiError::InvalidResponse {
        message: "response had no usable gloss field".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_array_gloss() {
        let body = serde_json::json!({"gloss": ["حريق", "خطر"]});
        assert_eq!(
            extract_gloss_field(&body).unwrap(),
            NlpOutput::Gloss(vec!["حريق".to_string(), "خطر".to_string()])
        );
    }

    #[test]
    fn extracts_string_gloss_by_splitting_whitespace() {
        let body = serde_json::json!({"gloss_translation": "حريق خطر"});
        assert_eq!(
            extract_gloss_field(&body).unwrap(),
            NlpOutput::Gloss(vec!["حريق".to_string(), "خطر".to_string()])
        );
    }

    #[test]
    fn falls_back_through_key_priority() {
        let body = serde_json::json!({"output": "مشكله"});
        assert_eq!(
            extract_gloss_field(&body).unwrap(),
            NlpOutput::Gloss(vec!["مشكله".to_string()])
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let body = serde_json::json!({"unrelated": 1});
        assert!(extract_gloss_field(&body).is_err());
    }
}
