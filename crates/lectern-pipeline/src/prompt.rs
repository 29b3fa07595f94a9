//! Prompt assembly for the analysis and summarization oracles
//!
//! Depth selects between instruction templates; the pipeline itself never
//! interprets depth beyond this table.

use lectern_domain::Depth;

/// Builds the per-chunk analysis prompt.
pub struct AnalysisPromptBuilder {
    chunk_text: String,
    prior_context: Option<String>,
    depth: Depth,
}

impl AnalysisPromptBuilder {
    /// Create a builder for one chunk's analysis call.
    pub fn new(chunk_text: impl Into<String>, depth: Depth) -> Self {
        Self {
            chunk_text: chunk_text.into(),
            prior_context: None,
            depth,
        }
    }

    /// Attach the tail of the preceding chunk as coherence context.
    pub fn with_prior_context(mut self, context: Option<String>) -> Self {
        self.prior_context = context.filter(|c| !c.is_empty());
        self
    }

    /// Build the complete analysis prompt.
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(analysis_instructions(self.depth));
        prompt.push_str("\n\n");

        if let Some(context) = &self.prior_context {
            prompt.push_str("Tail of the preceding passage, for continuity only (do not extract from it):\n");
            prompt.push_str("---\n");
            prompt.push_str(context);
            prompt.push_str("\n---\n\n");
        }

        prompt.push_str("Content text:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.chunk_text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(ANALYSIS_OUTPUT_REMINDER);

        prompt
    }
}

/// Build the prompt summarizing one interval's knowledge points.
///
/// `body` is the pre-assembled list of knowledge points and degraded-chunk
/// notes for the group.
pub fn interval_summary_prompt(body: &str, depth: Depth) -> String {
    format!(
        "{}\n\nAnalysis depth: {}\n\nAnalyze this content:\n{}",
        INTERVAL_SUMMARY_INSTRUCTIONS, depth, body
    )
}

/// Build the single meta-summary prompt from the table of contents and the
/// ordered interval summaries.
pub fn meta_summary_prompt(toc: Option<&str>, summaries_body: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(META_SUMMARY_INSTRUCTIONS);
    prompt.push_str("\n\n");
    if let Some(toc) = toc {
        prompt.push_str("Table of contents of the source document:\n");
        prompt.push_str(toc);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Create a consolidated meta-summary from these summaries:\n\n");
    prompt.push_str(summaries_body);
    prompt
}

fn analysis_instructions(depth: Depth) -> &'static str {
    match depth {
        Depth::Conceptual => ANALYSIS_INSTRUCTIONS_CONCEPTUAL,
        Depth::Standard => ANALYSIS_INSTRUCTIONS_STANDARD,
        Depth::Detailed => ANALYSIS_INSTRUCTIONS_DETAILED,
    }
}

const ANALYSIS_INSTRUCTIONS_STANDARD: &str = r#"Analyze this content as if you're studying from a document.

SKIP content if the passage contains only:
- Table of contents or chapter listings
- Index pages, blank pages
- Copyright or publishing details
- References, bibliography, acknowledgments

DO extract knowledge if the passage contains:
- Actual educational content and key definitions
- Important arguments, theories, or frameworks
- Examples and case studies with their context
- Significant findings or conclusions

For valid content, set has_content to true and extract detailed, learnable
knowledge points, preserving technical terms and important quotes.
For passages to skip, set has_content to false and return an empty list."#;

const ANALYSIS_INSTRUCTIONS_CONCEPTUAL: &str = r#"Analyze this content and capture only its central ideas.

SKIP front matter, listings, indexes, copyright pages, and references by
setting has_content to false with an empty list.

For substantive passages, set has_content to true and extract a small
number of high-level knowledge points: the main concepts, arguments, and
conclusions. Leave out examples, asides, and implementation detail."#;

const ANALYSIS_INSTRUCTIONS_DETAILED: &str = r#"Analyze this content as if preparing detailed study notes.

SKIP front matter, listings, indexes, copyright pages, and references by
setting has_content to false with an empty list.

For substantive passages, set has_content to true and extract thorough
knowledge points: definitions with their exact wording, examples with
their context, methodologies step by step, notable quotes, and any data
or formulas. Prefer more, smaller points over fewer, broader ones."#;

const ANALYSIS_OUTPUT_REMINDER: &str = r#"Output format (JSON object only, no additional text):
{"has_content": true, "knowledge": ["first point", "second point"]}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;

const INTERVAL_SUMMARY_INSTRUCTIONS: &str = r#"Create a comprehensive summary of the provided content in a concise but detailed way, using markdown format.

Use markdown formatting:
- ## for main sections and ### for subsections
- Bullet points for lists
- `code blocks` for any code or formulas
- **bold** for emphasis and *italic* for terminology
- > blockquotes for important notes

Where the input notes that a portion failed to analyze, keep that gap
visible in the summary rather than papering over it.

Return only the markdown summary, nothing else."#;

const META_SUMMARY_INSTRUCTIONS: &str = r#"You are a document-analysis expert creating a high-level meta-summary that consolidates several interval summaries of one document.

Guidelines:
1. Identify themes and concepts that recur across the summaries
2. Merge complementary information and resolve contradictions
3. Order key points by importance
4. Provide an overall framework showing how the ideas connect
5. Where an interval is marked as failed, treat it as an explicit gap

Use markdown: # for the title, ## for main sections, bullet lists,
**bold** for emphasis, *italic* for terminology.

Return only the markdown meta-summary, nothing else."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_includes_chunk_text() {
        let prompt = AnalysisPromptBuilder::new("the chunk body", Depth::Standard).build();
        assert!(prompt.contains("the chunk body"));
        assert!(prompt.contains("has_content"));
    }

    #[test]
    fn test_analysis_prompt_includes_context_when_given() {
        let prompt = AnalysisPromptBuilder::new("body", Depth::Standard)
            .with_prior_context(Some("previous tail".to_string()))
            .build();
        assert!(prompt.contains("previous tail"));
        assert!(prompt.contains("preceding passage"));
    }

    #[test]
    fn test_analysis_prompt_omits_empty_context() {
        let prompt = AnalysisPromptBuilder::new("body", Depth::Standard)
            .with_prior_context(Some(String::new()))
            .build();
        assert!(!prompt.contains("preceding passage"));
    }

    #[test]
    fn test_analysis_instructions_vary_by_depth() {
        let conceptual = AnalysisPromptBuilder::new("x", Depth::Conceptual).build();
        let detailed = AnalysisPromptBuilder::new("x", Depth::Detailed).build();
        assert!(conceptual.contains("central ideas"));
        assert!(detailed.contains("study notes"));
        assert_ne!(conceptual, detailed);
    }

    #[test]
    fn test_interval_prompt_carries_depth_and_body() {
        let prompt = interval_summary_prompt("- a point", Depth::Detailed);
        assert!(prompt.contains("comprehensive summary"));
        assert!(prompt.contains("detailed"));
        assert!(prompt.contains("- a point"));
    }

    #[test]
    fn test_meta_prompt_with_and_without_toc() {
        let with_toc = meta_summary_prompt(Some("- Chapter 1"), "summaries");
        assert!(with_toc.contains("Table of contents"));
        assert!(with_toc.contains("- Chapter 1"));

        let without_toc = meta_summary_prompt(None, "summaries");
        assert!(!without_toc.contains("Table of contents"));
        assert!(without_toc.contains("meta-summary"));
    }
}
