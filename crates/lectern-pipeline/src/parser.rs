//! Parse analysis-oracle output
//!
//! Summarization calls return free-form markdown and need no parsing; the
//! per-chunk analysis call must return the structured findings object.

use crate::error::PipelineError;
use serde_json::Value;
use tracing::warn;

/// Structured findings for one chunk, as returned by the analysis oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFindings {
    /// Whether the chunk contained extractable content
    pub has_content: bool,
    /// Extracted knowledge points in source order
    pub knowledge: Vec<String>,
}

/// Parse the analysis oracle's JSON response.
///
/// Models sometimes wrap JSON in markdown code fences; those are stripped
/// first. Non-string entries in the knowledge array are skipped with a
/// warning rather than failing the whole unit.
pub fn parse_analysis_response(response: &str) -> Result<ChunkFindings, PipelineError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| PipelineError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let obj = json
        .as_object()
        .ok_or_else(|| PipelineError::InvalidFormat("Expected JSON object".to_string()))?;

    let has_content = obj
        .get("has_content")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| {
            PipelineError::InvalidFormat("Missing or invalid 'has_content'".to_string())
        })?;

    let mut knowledge = Vec::new();
    if let Some(entries) = obj.get("knowledge").and_then(|v| v.as_array()) {
        for (idx, entry) in entries.iter().enumerate() {
            match entry.as_str() {
                Some(point) if !point.trim().is_empty() => {
                    knowledge.push(point.trim().to_string());
                }
                Some(_) => {}
                None => {
                    warn!("Skipping non-string knowledge entry {}", idx);
                }
            }
        }
    }

    Ok(ChunkFindings {
        has_content,
        knowledge,
    })
}

/// Extract JSON from a response, handling markdown code fences.
fn extract_json(response: &str) -> Result<String, PipelineError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(PipelineError::InvalidFormat("Empty code block".to_string()));
        }
        // Skip the opening fence (``` or ```json) and the closing fence
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_response() {
        let findings = parse_analysis_response(
            r#"{"has_content": true, "knowledge": ["first point", "second point"]}"#,
        )
        .unwrap();
        assert!(findings.has_content);
        assert_eq!(findings.knowledge.len(), 2);
        assert_eq!(findings.knowledge[0], "first point");
    }

    #[test]
    fn test_parse_skip_response() {
        let findings =
            parse_analysis_response(r#"{"has_content": false, "knowledge": []}"#).unwrap();
        assert!(!findings.has_content);
        assert!(findings.knowledge.is_empty());
    }

    #[test]
    fn test_parse_fenced_response() {
        let response = "```json\n{\"has_content\": true, \"knowledge\": [\"a point\"]}\n```";
        let findings = parse_analysis_response(response).unwrap();
        assert!(findings.has_content);
        assert_eq!(findings.knowledge, vec!["a point".to_string()]);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_analysis_response("I could not analyze this."),
            Err(PipelineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_has_content() {
        assert!(matches!(
            parse_analysis_response(r#"{"knowledge": ["point"]}"#),
            Err(PipelineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_array_response() {
        assert!(matches!(
            parse_analysis_response(r#"["point"]"#),
            Err(PipelineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_skips_non_string_entries() {
        let findings = parse_analysis_response(
            r#"{"has_content": true, "knowledge": ["real point", 42, "  ", "another"]}"#,
        )
        .unwrap();
        assert_eq!(
            findings.knowledge,
            vec!["real point".to_string(), "another".to_string()]
        );
    }

    #[test]
    fn test_missing_knowledge_array_is_empty() {
        let findings = parse_analysis_response(r#"{"has_content": false}"#).unwrap();
        assert!(findings.knowledge.is_empty());
    }
}
