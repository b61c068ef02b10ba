use aiaction::action_register::{ActionRegisterRepository, InMemoryActionRegisterRepository};
use aiaction::{
    ActionName, ActionResponse, AiApp, ContextId, NO_PROVIDERS_ERROR_CODE, Provider,
    ResponsePayload, SummariseText, TextResponse, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;

struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "aiprovider_p1"
    }

    fn supported_actions(&self) -> Vec<ActionName> {
        vec![ActionName::SummariseText]
    }

    async fn process_summarise_text(
        &self,
        _action: &SummariseText,
    ) -> aiaction_core::Result<ActionResponse> {
        Ok(ActionResponse::failure(
            ActionName::SummariseText,
            7,
            "quota exceeded",
        ))
    }
}

struct SucceedingProvider;

#[async_trait]
impl Provider for SucceedingProvider {
    fn name(&self) -> &str {
        "aiprovider_p2"
    }

    fn supported_actions(&self) -> Vec<ActionName> {
        vec![ActionName::SummariseText]
    }

    async fn process_summarise_text(
        &self,
        action: &SummariseText,
    ) -> aiaction_core::Result<ActionResponse> {
        Ok(ActionResponse::success(
            ActionName::SummariseText,
            ResponsePayload::Text(TextResponse {
                generated_content: Some(format!("summary of {}", action.prompt_text())),
                ..Default::default()
            }),
        ))
    }
}

fn create_app() -> (AiApp, InMemoryActionRegisterRepository) {
    let register = InMemoryActionRegisterRepository::new();
    let app = AiApp::builder()
        .action_register(Arc::new(register.clone()))
        .provider(Arc::new(FailingProvider))
        .provider(Arc::new(SucceedingProvider))
        .build()
        .unwrap();
    (app, register)
}

#[tokio::test]
async fn test_summarise_falls_back_to_second_provider() {
    let (app, register) = create_app();
    let action = SummariseText::configure(ContextId::new(1), UserId::new(1), "hi");

    let response = app.manager().process_action(action).await.unwrap();

    assert!(response.success);
    assert_eq!(
        response.payload.as_text().unwrap().generated_content.as_deref(),
        Some("summary of hi")
    );

    let records = register.list().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(!records[0].success);
    assert_eq!(records[0].error_code, 7);
    assert_eq!(records[0].provider, "aiprovider_p1");
    assert!(records[1].success);
    assert_eq!(records[1].provider, "aiprovider_p2");
}

#[tokio::test]
async fn test_dispatching_twice_records_twice() {
    let (app, register) = create_app();

    for _ in 0..2 {
        let action = SummariseText::configure(ContextId::new(1), UserId::new(1), "hi");
        app.manager().process_action(action).await.unwrap();
    }

    assert_eq!(register.list().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_disabling_every_provider_yields_no_providers_response() {
    let (app, register) = create_app();
    for plugin in ["aiprovider_p1", "aiprovider_p2"] {
        assert!(app.registry().enable_plugin(plugin, false).await.unwrap());
    }

    let action = SummariseText::configure(ContextId::new(1), UserId::new(1), "hi");
    let response = app.manager().process_action(action).await.unwrap();

    assert!(!response.success);
    assert_eq!(response.error_code, NO_PROVIDERS_ERROR_CODE);
    assert!(register.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_erasure_removes_dispatch_history_and_policy() {
    let (app, register) = create_app();
    let user = UserId::new(9);
    app.policy().set_policy(user, ContextId::new(3)).await.unwrap();
    let action = SummariseText::configure(ContextId::new(1), user, "hi");
    app.manager().process_action(action).await.unwrap();

    let deleted = app.privacy().delete_data_for_user(user).await.unwrap();

    assert_eq!(deleted, 3);
    assert!(register.list_for_user(user).await.unwrap().is_empty());
    assert!(!app.policy().get_policy(user).await.unwrap());
}
