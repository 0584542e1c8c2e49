//! Dialogue engine
//!
//! Decides what to do with each inbound message: continue the user's running
//! scenario, answer a matched intent, start a scenario, or fall back to the
//! default answer.
//!
//! Every message is handled inside one storage transaction. Replies are
//! collected while store writes are staged; they are delivered once the
//! message has been fully processed, and the transaction commits only after
//! every reply went out. Any error drops the transaction, leaving the stored
//! state exactly as it was before the message.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::handlers::artifacts::Artifact;
use crate::handlers::registry::HandlerRegistry;
use crate::models::{NewRegistration, NewUserState, UserState};
use crate::services::messenger::Messenger;
use crate::state::context::ConversationContext;
use crate::state::scenarios::{IntentAction, ScenarioManager, ScenarioStep};
use crate::state::storage::{DialogueStorage, DialogueTransaction};
use crate::utils::errors::{Result, TicketBuddyError};
use crate::utils::logging::{log_registration, log_scenario_event};

/// Reply produced while handling a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Image(Artifact),
}

/// What the engine did with a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// No state and no intent matched
    Fallback,
    /// A canned answer was sent
    Answered { intent: String },
    /// A scenario was started at its first step
    ScenarioStarted { scenario: String, step: String },
    /// Input was accepted and the user moved to the next step
    StepAdvanced { scenario: String, step: String },
    /// Input was rejected; the user stays on the step
    ValidationFailed { scenario: String, step: String },
    /// The terminal step was reached and a registration recorded
    ScenarioCompleted { scenario: String, registration_id: Uuid },
}

#[derive(Debug, Default)]
struct Outbox {
    replies: Vec<Reply>,
}

impl Outbox {
    fn text(&mut self, text: String) {
        self.replies.push(Reply::Text(text));
    }

    fn image(&mut self, artifact: Artifact) {
        self.replies.push(Reply::Image(artifact));
    }
}

pub struct DialogueEngine {
    scenarios: ScenarioManager,
    handlers: HandlerRegistry,
    storage: Arc<dyn DialogueStorage>,
    messenger: Arc<dyn Messenger>,
}

impl DialogueEngine {
    /// Build an engine; fails if the dialogue names an unregistered handler
    pub fn new(
        scenarios: ScenarioManager,
        handlers: HandlerRegistry,
        storage: Arc<dyn DialogueStorage>,
        messenger: Arc<dyn Messenger>,
    ) -> Result<Self> {
        handlers.verify(scenarios.config())?;

        Ok(Self {
            scenarios,
            handlers,
            storage,
            messenger,
        })
    }

    pub fn scenarios(&self) -> &ScenarioManager {
        &self.scenarios
    }

    /// Handle one inbound message from `user_id`
    #[instrument(skip(self, text), fields(user_id = %user_id))]
    pub async fn handle_message(&self, user_id: &str, text: &str) -> Result<MessageOutcome> {
        let mut tx = self.storage.begin(user_id).await?;
        let mut outbox = Outbox::default();

        let outcome = match self.process(tx.as_mut(), user_id, text, &mut outbox).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };

        if let Err(e) = self.deliver(user_id, &outbox).await {
            tx.rollback().await?;
            return Err(e);
        }

        tx.commit().await?;
        debug!(outcome = ?outcome, replies = outbox.replies.len(), "Message handled");
        Ok(outcome)
    }

    async fn process(
        &self,
        tx: &mut dyn DialogueTransaction,
        user_id: &str,
        text: &str,
        outbox: &mut Outbox,
    ) -> Result<MessageOutcome> {
        if let Some(state) = tx.get_user_state(user_id).await? {
            match self.scenarios.get_step(&state.scenario_name, &state.step_name) {
                Ok(step) => return self.continue_scenario(tx, state, step, text, outbox).await,
                Err(e @ (TicketBuddyError::UnknownScenario(_) | TicketBuddyError::UnknownStep { .. })) => {
                    // The dialogue changed under a running scenario; drop it and start over
                    warn!(
                        user_id = user_id,
                        scenario = %state.scenario_name,
                        step = %state.step_name,
                        error = %e,
                        "Discarding state that no longer matches the dialogue"
                    );
                    tx.delete_user_state(&state).await?;
                }
                Err(e) => return Err(e),
            }
        }

        self.match_intent(tx, user_id, text, outbox).await
    }

    async fn match_intent(
        &self,
        tx: &mut dyn DialogueTransaction,
        user_id: &str,
        text: &str,
        outbox: &mut Outbox,
    ) -> Result<MessageOutcome> {
        let Some(intent) = self.scenarios.match_intent(text) else {
            outbox.text(self.scenarios.default_answer().to_string());
            return Ok(MessageOutcome::Fallback);
        };

        match intent.action() {
            Some(IntentAction::Answer(answer)) => {
                debug!(user_id = user_id, intent = %intent.name, "Intent answered");
                outbox.text(answer.to_string());
                Ok(MessageOutcome::Answered { intent: intent.name.clone() })
            }
            Some(IntentAction::StartScenario(scenario)) => {
                self.start_scenario(tx, user_id, scenario, text, outbox).await
            }
            None => Err(TicketBuddyError::Config(
                format!("Intent '{}' has neither answer nor scenario", intent.name)
            )),
        }
    }

    async fn start_scenario(
        &self,
        tx: &mut dyn DialogueTransaction,
        user_id: &str,
        scenario: &str,
        text: &str,
        outbox: &mut Outbox,
    ) -> Result<MessageOutcome> {
        let (first_step_name, first_step) = self.scenarios.first_step(scenario)?;
        let context = ConversationContext::new();

        self.render_step(first_step, text, &context, outbox).await?;

        tx.create_user_state(NewUserState {
            user_id: user_id.to_string(),
            scenario_name: scenario.to_string(),
            step_name: first_step_name.to_string(),
            context,
        }).await?;

        log_scenario_event(user_id, scenario, first_step_name, "started");
        Ok(MessageOutcome::ScenarioStarted {
            scenario: scenario.to_string(),
            step: first_step_name.to_string(),
        })
    }

    async fn continue_scenario(
        &self,
        tx: &mut dyn DialogueTransaction,
        mut state: UserState,
        step: &ScenarioStep,
        text: &str,
        outbox: &mut Outbox,
    ) -> Result<MessageOutcome> {
        let accepted = match step.handler.as_deref() {
            Some(handler) => self.handlers.validator(handler)?.validate(text, &mut state.context),
            None => true,
        };

        if !accepted {
            if let Some(failure_text) = step.failure_text.as_deref() {
                outbox.text(state.context.render(failure_text)?);
            }
            log_scenario_event(&state.user_id, &state.scenario_name, &state.step_name, "validation_failed");
            return Ok(MessageOutcome::ValidationFailed {
                scenario: state.scenario_name,
                step: state.step_name,
            });
        }

        let next_step_name = step.next_step_name().ok_or_else(|| {
            TicketBuddyError::Config(format!(
                "User {} rests on terminal step '{}' of scenario '{}'",
                state.user_id, state.step_name, state.scenario_name
            ))
        })?;
        let next_step = self.scenarios.get_step(&state.scenario_name, next_step_name)?;

        // The next step is rendered before deciding whether it ends the scenario
        self.render_step(next_step, text, &state.context, outbox).await?;

        if next_step.is_terminal() {
            let fields = state.context.as_map().clone();
            let registration = tx.create_registration(NewRegistration {
                user_id: state.user_id.clone(),
                scenario_name: state.scenario_name.clone(),
                fields,
            }).await?;
            tx.delete_user_state(&state).await?;

            log_registration(&state.user_id, &state.scenario_name, &registration.fields);
            info!(
                user_id = %state.user_id,
                registration_id = %registration.id,
                "Scenario completed"
            );
            Ok(MessageOutcome::ScenarioCompleted {
                scenario: state.scenario_name,
                registration_id: registration.id,
            })
        } else {
            state.step_name = next_step_name.to_string();
            let state = tx.update_user_state(&state).await?;

            log_scenario_event(&state.user_id, &state.scenario_name, &state.step_name, "advanced");
            Ok(MessageOutcome::StepAdvanced {
                scenario: state.scenario_name,
                step: state.step_name,
            })
        }
    }

    /// Queue a step's message and artifact
    async fn render_step(
        &self,
        step: &ScenarioStep,
        text: &str,
        context: &ConversationContext,
        outbox: &mut Outbox,
    ) -> Result<()> {
        if let Some(template) = step.text.as_deref() {
            outbox.text(context.render(template)?);
        }

        if let Some(action) = step.action.as_deref() {
            let artifact = self.handlers.generator(action)?.generate(text, context).await?;
            outbox.image(artifact);
        }

        Ok(())
    }

    async fn deliver(&self, user_id: &str, outbox: &Outbox) -> Result<()> {
        for reply in &outbox.replies {
            match reply {
                Reply::Text(text) => self.messenger.send_text(user_id, text).await?,
                Reply::Image(artifact) => self.messenger.send_image(user_id, artifact).await?,
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for DialogueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueEngine")
            .field("scenarios", &self.scenarios)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}
