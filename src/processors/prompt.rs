//! Analysis prompt template

/// Fixed prompt sent to both backends. Low temperature plus this
/// instruction set biases replies toward a bare JSON object, but the
/// repair layer still has to tolerate prose and markdown wrappers.
pub const ANALYSIS_PROMPT: &str = "\
You are a text analysis system. Analyze the following text and provide the results in JSON format.

TEXT TO ANALYZE:
{text}

INSTRUCTIONS:
1. Return ONLY a valid JSON object
2. Include exactly these fields:
   - sentiment (string: \"positive\", \"negative\", or \"neutral\")
   - key_topics (array of strings, maximum 10)
   - summary (string, 2-3 sentences)
   - confidence_score (number between 0 and 1)
3. Do not include any explanations or additional text
4. Ensure the output is valid JSON

Example of expected format:
{\"sentiment\": \"positive\", \"key_topics\": [\"AI\", \"technology\"], \"summary\": \"Brief summary here\", \"confidence_score\": 0.85}
";

/// Substitute the input text into a prompt template.
pub fn render(template: &str, text: &str) -> String {
    template.replace("{text}", text)
}
