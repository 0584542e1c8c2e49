//! Intent matching integration tests

use assert_matches::assert_matches;
use proptest::prelude::*;

use TicketBuddy::services::MessageOutcome;
use TicketBuddy::state::DialogueConfig;

use crate::helpers::TestContext;

const DIALOGUE: &str = r#"
default_answer = "Sorry, I did not get that."

[[intents]]
name = "price"
tokens = ["Price", "cost"]
answer = "Entry is free."

[[intents]]
name = "ticket"
tokens = ["ticket", "price"]
scenario = "quiz"

[scenarios.quiz]
first_step = "ask"

[scenarios.quiz.steps.ask]
text = "Tell me anything."
next_step = "done"

[scenarios.quiz.steps.done]
text = "Got it."
"#;

#[tokio::test]
async fn test_canned_answer_creates_no_state() {
    let ctx = TestContext::new().await.expect("Failed to create test context");

    let outcome = ctx.say("500001", "WHEN is it?").await.unwrap();
    assert_eq!(outcome, MessageOutcome::Answered { intent: "date".to_string() });
    assert_eq!(
        ctx.messenger.take_texts("500001"),
        vec!["The conference takes place on May 15th, registration opens at 10:00."]
    );
    assert!(ctx.storage.user_state("500001").is_none());
}

#[tokio::test]
async fn test_first_declared_intent_wins() {
    let dialogue = DialogueConfig::from_toml_str(DIALOGUE).unwrap();
    let ctx = TestContext::with_dialogue(dialogue).await.expect("Failed to create test context");

    // "price" triggers both intents; the answer is declared first
    let outcome = ctx.say("500002", "what is the ticket price?").await.unwrap();
    assert_matches!(outcome, MessageOutcome::Answered { intent } if intent == "price");

    let outcome = ctx.say("500002", "one ticket please").await.unwrap();
    assert_matches!(outcome, MessageOutcome::ScenarioStarted { scenario, .. } if scenario == "quiz");
}

#[tokio::test]
async fn test_step_without_handler_accepts_anything() {
    let dialogue = DialogueConfig::from_toml_str(DIALOGUE).unwrap();
    let ctx = TestContext::with_dialogue(dialogue).await.expect("Failed to create test context");

    ctx.say("500003", "ticket").await.unwrap();
    let outcome = ctx.say("500003", "").await.unwrap();

    assert_matches!(outcome, MessageOutcome::ScenarioCompleted { .. });
    assert_eq!(ctx.messenger.take_texts("500003"), vec!["Tell me anything.", "Got it."]);
    assert!(ctx.storage.registrations()[0].fields.is_empty());
}

#[tokio::test]
async fn test_stale_state_is_dropped_when_dialogue_changes() {
    let first = TestContext::new().await.expect("Failed to create test context");
    first.say("500004", "register").await.unwrap();

    // Same store, dialogue without the registration scenario
    let dialogue = DialogueConfig::from_toml_str(DIALOGUE).unwrap();
    let second = TestContext::with_dialogue(dialogue).await.expect("Failed to create test context");
    let state = first.storage.user_state("500004").unwrap();
    {
        use TicketBuddy::models::NewUserState;
        use TicketBuddy::state::{DialogueStorage, DialogueTransaction};

        let mut tx = second.storage.begin("500004").await.unwrap();
        tx.create_user_state(NewUserState {
            user_id: state.user_id,
            scenario_name: state.scenario_name,
            step_name: state.step_name,
            context: state.context,
        }).await.unwrap();
        tx.commit().await.unwrap();
    }

    let outcome = second.say("500004", "hello").await.unwrap();
    assert_eq!(outcome, MessageOutcome::Fallback);
    assert!(second.storage.user_state("500004").is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_text_without_tokens_gets_default_answer(text in "[xyz0-9 ]{0,40}") {
        tokio_test::block_on(async {
            let ctx = TestContext::new().await.expect("Failed to create test context");
            let outcome = ctx.say("600001", &text).await.unwrap();

            prop_assert_eq!(outcome, MessageOutcome::Fallback);
            prop_assert_eq!(
                ctx.messenger.take_texts("600001"),
                vec![ctx.settings.dialogue.default_answer.clone()]
            );
            prop_assert!(ctx.storage.user_state("600001").is_none());
            Ok(())
        })?;
    }
}
