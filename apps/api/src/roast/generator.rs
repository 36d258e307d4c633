use tracing::info;

use crate::llm_client::{ChatCompleter, CompletionParams, GenerationError};
use crate::roast::prompts::{build_user_prompt, ROAST_SYSTEM};

/// Generates the roast from retrieved context plus the head of the full resume text.
/// The model output is returned verbatim; section structure is not validated.
pub async fn generate_roast(
    completer: &dyn ChatCompleter,
    context: &str,
    full_text: &str,
    resume_prompt_chars: usize,
    params: &CompletionParams,
) -> Result<String, GenerationError> {
    let prompt = build_user_prompt(truncate_chars(full_text, resume_prompt_chars), context);

    info!("Generating roast with {}", completer.model_id());
    let roast = completer.complete(ROAST_SYSTEM, &prompt, params).await?;
    if roast.trim().is_empty() {
        return Err(GenerationError::EmptyContent);
    }

    info!("Generated roast ({} chars)", roast.chars().count());
    Ok(roast)
}

/// Returns at most the first `max_chars` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
