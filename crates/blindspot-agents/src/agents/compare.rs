//! Side-by-side comparison of two ideas.

use tracing::info;

use crate::completion::{CompletionClient, CompletionRequest};
use crate::errors::CritiqueError;
use crate::types::ModelId;

pub fn user_message(idea_a: &str, idea_b: &str) -> String {
    format!("IDEA A:\n{idea_a}\n\nIDEA B:\n{idea_b}")
}

/// One call with the comparison persona. Input validation is the caller's job.
pub async fn compare_ideas(
    client: &dyn CompletionClient,
    persona: &str,
    idea_a: &str,
    idea_b: &str,
    model: ModelId,
    temperature: f64,
) -> Result<String, CritiqueError> {
    let request = CompletionRequest::new(persona, user_message(idea_a, idea_b), model, temperature);
    let verdict = client.complete(&request).await?;
    info!(%model, temperature, chars = verdict.len(), "comparison complete");
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletionClient;

    #[tokio::test]
    async fn sends_both_ideas() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .withf(|req| req.user_content == "IDEA A:\ncoffee cart\n\nIDEA B:\nfood truck")
            .times(1)
            .returning(|_| Ok("B is more robust.".into()));

        let verdict = compare_ideas(&mock, "judge", "coffee cart", "food truck", ModelId::Gpt41, 0.4)
            .await
            .unwrap();
        assert_eq!(verdict, "B is more robust.");
    }
}
