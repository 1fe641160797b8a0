//! Tools that let an agent hand work to its coworkers
//!
//! Coworkers are matched by name, case-insensitively. The agents handed in
//! as coworkers should themselves lack delegation tools so that delegated
//! work cannot bounce back and forth.

use async_trait::async_trait;
use crew_core::{Agent, Context, Error, Result};
use crew_llm::tools::schema;
use crew_tools::{Tool, parse_args};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Build the `delegate_work` and `ask_question` tools for `delegator`
///
/// The delegator itself is never offered as a coworker. Returns no tools
/// when nobody else is available.
pub fn delegation_tools(
    delegator: &str,
    coworkers: impl IntoIterator<Item = Arc<dyn Agent>>,
) -> Vec<Arc<dyn Tool>> {
    let coworkers: Vec<Arc<dyn Agent>> = coworkers
        .into_iter()
        .filter(|agent| !agent.name().eq_ignore_ascii_case(delegator))
        .collect();
    if coworkers.is_empty() {
        return Vec::new();
    }

    let coworkers = Coworkers {
        delegator: delegator.to_string(),
        agents: coworkers,
    };
    vec![
        Arc::new(DelegateWorkTool::new(coworkers.clone())) as Arc<dyn Tool>,
        Arc::new(AskQuestionTool::new(coworkers)) as Arc<dyn Tool>,
    ]
}

#[derive(Clone)]
struct Coworkers {
    delegator: String,
    agents: Vec<Arc<dyn Agent>>,
}

impl Coworkers {
    fn names(&self) -> String {
        self.agents
            .iter()
            .map(|agent| agent.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn find(&self, name: &str) -> Result<&Arc<dyn Agent>> {
        let wanted = name.trim().trim_matches('"');
        self.agents
            .iter()
            .find(|agent| agent.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::InvalidArguments(format!(
                    "coworker '{name}' not found, choose one of: {}",
                    self.names()
                ))
            })
    }

    async fn ask(&self, coworker: &str, request: &str, background: &str) -> Result<Value> {
        let agent = self.find(coworker)?;
        let mut prompt = request.to_string();
        if !background.trim().is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(background);
        }

        info!(from = %self.delegator, to = %agent.name(), "Delegating to coworker");
        let mut context = Context::new();
        context.set_delegated_by(&self.delegator);
        let answer = agent.process(prompt, &mut context).await?;
        Ok(Value::String(answer))
    }
}

#[derive(Debug, Deserialize)]
struct DelegateArgs {
    coworker: String,
    task: String,
    #[serde(default)]
    context: String,
}

/// Hands a complete piece of work to a coworker and returns their answer
pub struct DelegateWorkTool {
    coworkers: Coworkers,
    description: String,
}

impl DelegateWorkTool {
    fn new(coworkers: Coworkers) -> Self {
        let description = format!(
            "Delegate a specific task to one of the following coworkers: {}. \
             Give the coworker all the context they need, they know nothing about your task.",
            coworkers.names()
        );
        Self {
            coworkers,
            description,
        }
    }
}

#[async_trait]
impl Tool for DelegateWorkTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let args: DelegateArgs = parse_args(params)?;
        self.coworkers
            .ask(&args.coworker, &args.task, &args.context)
            .await
    }

    fn name(&self) -> &str {
        "delegate_work"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "coworker": schema::string("Role of the coworker to delegate to"),
                "task": schema::string("The task to delegate"),
                "context": schema::string("Everything the coworker needs to know to do the task"),
            }),
            &["coworker", "task"],
        )
    }
}

#[derive(Debug, Deserialize)]
struct QuestionArgs {
    coworker: String,
    question: String,
    #[serde(default)]
    context: String,
}

/// Asks a coworker a question and returns their answer
pub struct AskQuestionTool {
    coworkers: Coworkers,
    description: String,
}

impl AskQuestionTool {
    fn new(coworkers: Coworkers) -> Self {
        let description = format!(
            "Ask a specific question to one of the following coworkers: {}. \
             Give the coworker all the context they need, they know nothing about your question.",
            coworkers.names()
        );
        Self {
            coworkers,
            description,
        }
    }
}

#[async_trait]
impl Tool for AskQuestionTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let args: QuestionArgs = parse_args(params)?;
        self.coworkers
            .ask(&args.coworker, &args.question, &args.context)
            .await
    }

    fn name(&self) -> &str {
        "ask_question"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "coworker": schema::string("Role of the coworker to ask"),
                "question": schema::string("The question to ask"),
                "context": schema::string("Everything the coworker needs to know to answer"),
            }),
            &["coworker", "question"],
        )
    }
}
