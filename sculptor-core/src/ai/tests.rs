use crate::ai::{model::Model, provider::AiProvider, types::*};
use anyhow::Result;

/// Live smoke test shared by the network backends.
pub async fn test_hello_world<P: AiProvider>(provider: P, model: Model) -> Result<()> {
    let request = ConversationRequest {
        messages: vec![Message::user("Say hello in a friendly way.")],
        model: ModelSettings {
            model,
            max_tokens: Some(100),
            temperature: Some(0.1),
        },
        system_prompt: "You are a helpful AI assistant.".to_string(),
    };

    let response = provider.converse(request).await.map_err(|e| {
        tracing::error!(?e, "Provider conversation failed for model {}", model.name());
        anyhow::anyhow!(
            "Provider conversation failed for model {}: {:?}",
            model.name(),
            e
        )
    })?;

    assert!(
        !response.content.is_empty(),
        "Response content should not be empty for model {}",
        model.name()
    );
    assert!(
        response.usage.total_tokens >= response.usage.input_tokens,
        "Total tokens should be at least input tokens for model {}",
        model.name()
    );

    Ok(())
}
