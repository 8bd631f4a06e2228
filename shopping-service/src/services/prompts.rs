//! Prompt construction for the language-model steps, plus the canned text
//! used when a step falls back.

use crate::models::SessionAnswer;

/// Number of follow-up questions every session asks.
pub const QUESTION_COUNT: usize = 5;

/// Generic questions used when the model cannot supply its own.
pub const FALLBACK_QUESTIONS: [&str; QUESTION_COUNT] = [
    "What's your budget range?",
    "What color do you prefer?",
    "Are you looking for male, female, or unisex items?",
    "What size do you need?",
    "Do you have any brand preferences?",
];

pub fn fallback_questions() -> Vec<String> {
    FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect()
}

/// Prompt asking for exactly five follow-up questions as a JSON array.
pub fn follow_up_questions(user_query: &str) -> String {
    format!(
        r#"You are an intelligent shopping assistant. The user has searched for: "{query}"

Analyze the product type and generate EXACTLY {count} highly relevant, specific follow-up questions that would help narrow down their search.

Make the questions specific to the product type mentioned. For example:
- For clothing: fabric type, occasion, season, fit preference
- For electronics: specifications, brand preference, usage purpose
- For shoes: type, size system, comfort level, activity
- For jewelry: metal type, stone preference, occasion

Cover the most important aspects:
- Budget range (prices the user gives are in Indian rupees)
- Specific preferences (color, style, material)
- Size/dimensions
- Brand preferences
- Usage/occasion

Respond with ONLY a valid JSON array of EXACTLY {count} question strings, with no other text or formatting.

Example response:
["What's your budget range?", "What specific style are you looking for?", "Do you have any brand preferences?", "What size do you need?", "What's the primary use/occasion?"]"#,
        query = user_query,
        count = QUESTION_COUNT,
    )
}

/// `- question: answer` lines in answer order.
pub fn answers_text(answers: &[SessionAnswer]) -> String {
    answers
        .iter()
        .map(|a| format!("- {}: {}", a.question, a.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking for a requirements summary.
pub fn summary(user_query: &str, answers: &[SessionAnswer]) -> String {
    format!(
        r#"Based on the following information, create a concise shopping summary:

Original Query: {query}

User's Answers:
{answers}

Create a well-formatted summary that includes:
1. Product category/type
2. Key specifications
3. Preferences
4. Budget considerations

Format it with clear sections."#,
        query = user_query,
        answers = answers_text(answers),
    )
}

/// Plain-text summary used when the model is unavailable.
pub fn fallback_summary(user_query: &str, answers: &[SessionAnswer]) -> String {
    format!(
        "Shopping Summary:\n===============\nOriginal Query: {}\n\nRequirements:\n{}\n\nThis summary can be used to search for products that match your criteria.\n",
        user_query,
        answers_text(answers),
    )
}

/// Prompt asking for a one-line, human-style video search phrase.
pub fn search_phrase(user_query: &str, summary: &str) -> String {
    format!(
        r#"Based on this shopping summary, create a natural YouTube search query that a human would type.

Original Query: {query}
Shopping Summary: {summary}

Keep it simple and conversational. Include the product and budget if mentioned.

Examples of good queries:
- "laptop under 1 lakh"
- "best gaming laptop"
- "iPhone 15 review"
- "shoes for running"

Return ONLY the search query in one line, nothing else."#,
        query = user_query,
        summary = summary,
    )
}

/// Search phrase used when the model is unavailable.
pub fn fallback_search_phrase(user_query: &str) -> String {
    format!("{} review unboxing", user_query)
}
