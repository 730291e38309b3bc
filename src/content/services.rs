use crate::completion::{CompletionClient, CompletionError};

const ALTERNATIVES_MAX_TOKENS: u32 = 100;
const TIPS_MAX_TOKENS: u32 = 200;
const TIPS_PROMPT: &str = "Provide tips for reducing food waste:";

pub async fn eco_alternatives(
    completion: &dyn CompletionClient,
    product: &str,
) -> Result<Vec<String>, CompletionError> {
    let prompt = format!("Find eco-friendly alternatives for {product}:");
    let text = completion
        .complete(&prompt, ALTERNATIVES_MAX_TOKENS, None)
        .await?;
    Ok(split_lines(&text))
}

pub async fn food_waste_tips(
    completion: &dyn CompletionClient,
) -> Result<Vec<String>, CompletionError> {
    let text = completion.complete(TIPS_PROMPT, TIPS_MAX_TOKENS, None).await?;
    Ok(split_lines(&text))
}

/// One item per line of the completion, each trimmed. Blank lines inside the text are kept.
pub fn split_lines(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    text.lines().map(|line| line.trim().to_string()).collect()
}
