//! Dialogue scenarios and intents
//!
//! This module defines the static dialogue configuration: keyword intents that
//! either answer directly or start a scenario, and the scenarios themselves,
//! each a named graph of steps. Definitions are loaded once at startup and are
//! read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::utils::errors::{Result, TicketBuddyError};

/// A named multi-step dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Step the user is placed on when the scenario starts
    pub first_step: String,
    /// All steps of this scenario keyed by name
    pub steps: HashMap<String, ScenarioStep>,
}

/// One node of a scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Message sent when the step is entered, rendered against the context
    #[serde(default)]
    pub text: Option<String>,
    /// Message sent when the step's handler rejects the input
    #[serde(default)]
    pub failure_text: Option<String>,
    /// Validation handler gating the transition out of this step
    #[serde(default)]
    pub handler: Option<String>,
    /// Artifact action executed when the step is entered
    #[serde(default)]
    pub action: Option<String>,
    /// Step that follows; empty or absent marks this step as terminal
    #[serde(default)]
    pub next_step: Option<String>,
}

impl ScenarioStep {
    /// Name of the following step, if any
    pub fn next_step_name(&self) -> Option<&str> {
        self.next_step
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Whether reaching this step finishes the scenario
    pub fn is_terminal(&self) -> bool {
        self.next_step_name().is_none()
    }
}

/// Keyword rule mapping free text to a canned answer or a scenario start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Name used in logs
    pub name: String,
    /// Trigger substrings
    pub tokens: Vec<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
}

/// What a matched intent asks the engine to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentAction<'a> {
    Answer(&'a str),
    StartScenario(&'a str),
}

impl Intent {
    /// Whether any trigger token occurs in already-lowercased text
    pub fn matches(&self, lowered_text: &str) -> bool {
        self.tokens.iter().any(|token| lowered_text.contains(token.as_str()))
    }

    /// Resolve the intent's outcome. A non-empty answer wins over a scenario.
    pub fn action(&self) -> Option<IntentAction<'_>> {
        match (self.answer.as_deref(), self.scenario.as_deref()) {
            (Some(answer), _) if !answer.is_empty() => Some(IntentAction::Answer(answer)),
            (_, Some(scenario)) if !scenario.is_empty() => Some(IntentAction::StartScenario(scenario)),
            _ => None,
        }
    }
}

/// Complete dialogue definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Sent when no intent matches
    pub default_answer: String,
    /// Scanned in declaration order; first match wins
    #[serde(default)]
    pub intents: Vec<Intent>,
    #[serde(default)]
    pub scenarios: HashMap<String, Scenario>,
}

impl DialogueConfig {
    /// Parse a dialogue definition from TOML
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Check the dialogue graph for dangling references
    pub fn validate(&self) -> Result<()> {
        if self.default_answer.trim().is_empty() {
            return Err(TicketBuddyError::Config("Default answer is required".to_string()));
        }

        for intent in &self.intents {
            if intent.tokens.iter().all(|token| token.trim().is_empty()) {
                return Err(TicketBuddyError::Config(
                    format!("Intent '{}' has no trigger tokens", intent.name)
                ));
            }

            let has_answer = intent.answer.as_deref().is_some_and(|a| !a.is_empty());
            let has_scenario = intent.scenario.as_deref().is_some_and(|s| !s.is_empty());
            match (has_answer, has_scenario) {
                (true, true) | (false, false) => {
                    return Err(TicketBuddyError::Config(
                        format!("Intent '{}' must define exactly one of answer or scenario", intent.name)
                    ));
                }
                (false, true) => {
                    let scenario = intent.scenario.as_deref().unwrap_or_default();
                    if !self.scenarios.contains_key(scenario) {
                        return Err(TicketBuddyError::UnknownScenario(scenario.to_string()));
                    }
                }
                (true, false) => {}
            }
        }

        for (name, scenario) in &self.scenarios {
            let first = scenario.steps.get(&scenario.first_step).ok_or_else(|| {
                TicketBuddyError::UnknownStep {
                    scenario: name.clone(),
                    step: scenario.first_step.clone(),
                }
            })?;

            if first.is_terminal() {
                return Err(TicketBuddyError::Config(
                    format!("First step of scenario '{}' cannot be terminal", name)
                ));
            }

            for (step_name, step) in &scenario.steps {
                if let Some(next) = step.next_step_name() {
                    if !scenario.steps.contains_key(next) {
                        return Err(TicketBuddyError::UnknownStep {
                            scenario: name.clone(),
                            step: next.to_string(),
                        });
                    }
                }

                if step.handler.is_some() && step.failure_text.is_none() {
                    return Err(TicketBuddyError::Config(
                        format!("Step '{}' in scenario '{}' has a handler but no failure_text", step_name, name)
                    ));
                }
            }
        }

        Ok(())
    }

    /// Handler and action names referenced by any step
    pub fn referenced_handlers(&self) -> (Vec<&str>, Vec<&str>) {
        let steps = self.scenarios.values().flat_map(|s| s.steps.values());
        let mut validators = Vec::new();
        let mut actions = Vec::new();
        for step in steps {
            if let Some(handler) = step.handler.as_deref() {
                validators.push(handler);
            }
            if let Some(action) = step.action.as_deref() {
                actions.push(action);
            }
        }
        (validators, actions)
    }

    fn normalize(&mut self) {
        for intent in &mut self.intents {
            intent.tokens = intent
                .tokens
                .iter()
                .map(|token| token.trim().to_lowercase())
                .filter(|token| !token.is_empty())
                .collect();
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        let mut scenarios = HashMap::new();
        scenarios.insert("registration".to_string(), create_registration_scenario());

        Self {
            default_answer: "I don't know how to answer that yet. I can tell you when and where the \
                conference takes place, and I can register you for it."
                .to_string(),
            intents: vec![
                Intent {
                    name: "date".to_string(),
                    tokens: vec!["when".to_string(), "what time".to_string(), "date".to_string()],
                    answer: Some(
                        "The conference takes place on May 15th, registration opens at 10:00.".to_string()
                    ),
                    scenario: None,
                },
                Intent {
                    name: "venue".to_string(),
                    tokens: vec!["where".to_string(), "venue".to_string(), "location".to_string()],
                    answer: Some(
                        "The conference is held at the Expo Center, pavilion 18G.".to_string()
                    ),
                    scenario: None,
                },
                Intent {
                    name: "registration".to_string(),
                    tokens: vec!["register".to_string(), "sign up".to_string()],
                    answer: None,
                    scenario: Some("registration".to_string()),
                },
            ],
            scenarios,
        }
    }
}

/// Create the conference registration scenario
fn create_registration_scenario() -> Scenario {
    let mut steps = HashMap::new();

    steps.insert("step1".to_string(), ScenarioStep {
        text: Some("Enter your name to register. It will be printed on your badge.".to_string()),
        failure_text: Some(
            "A name is 3-30 characters: letters, digits, hyphens and spaces. Please try again.".to_string()
        ),
        handler: Some("handle_name".to_string()),
        action: None,
        next_step: Some("step2".to_string()),
    });

    steps.insert("step2".to_string(), ScenarioStep {
        text: Some("Enter your email. We will send the registration details to it.".to_string()),
        failure_text: Some("That email address does not look right, please enter it again.".to_string()),
        handler: Some("handle_email".to_string()),
        action: None,
        next_step: Some("step3".to_string()),
    });

    steps.insert("step3".to_string(), ScenarioStep {
        text: Some(
            "Thank you for registering, {name}! Your ticket is below, a copy goes to {email}.".to_string()
        ),
        failure_text: None,
        handler: None,
        action: Some("generate_ticket".to_string()),
        next_step: None,
    });

    Scenario {
        first_step: "step1".to_string(),
        steps,
    }
}

/// Read-only, validated view over the dialogue definition
#[derive(Debug, Clone)]
pub struct ScenarioManager {
    config: Arc<DialogueConfig>,
}

impl ScenarioManager {
    /// Validate and freeze a dialogue definition
    pub fn new(mut config: DialogueConfig) -> Result<Self> {
        config.normalize();
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Underlying definition
    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    pub fn default_answer(&self) -> &str {
        &self.config.default_answer
    }

    /// Get a scenario by name
    pub fn get_scenario(&self, name: &str) -> Result<&Scenario> {
        self.config
            .scenarios
            .get(name)
            .ok_or_else(|| TicketBuddyError::UnknownScenario(name.to_string()))
    }

    /// Resolve a step by name within a scenario
    pub fn get_step(&self, scenario: &str, step: &str) -> Result<&ScenarioStep> {
        self.get_scenario(scenario)?
            .steps
            .get(step)
            .ok_or_else(|| TicketBuddyError::UnknownStep {
                scenario: scenario.to_string(),
                step: step.to_string(),
            })
    }

    /// Resolve a scenario's entry point
    pub fn first_step(&self, scenario: &str) -> Result<(&str, &ScenarioStep)> {
        let definition = self.get_scenario(scenario)?;
        let step = self.get_step(scenario, &definition.first_step)?;
        Ok((definition.first_step.as_str(), step))
    }

    /// Find the first declared intent whose tokens occur in the text
    pub fn match_intent(&self, text: &str) -> Option<&Intent> {
        let lowered = text.to_lowercase();
        self.config.intents.iter().find(|intent| intent.matches(&lowered))
    }
}
