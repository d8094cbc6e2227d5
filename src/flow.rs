//! Scripted multi-step conversations on top of a live session.
//!
//! A flow is an ordered list of [`ConversationStep`]s. The model moves
//! between them by calling the `transitionToStep` tool, which every step
//! exposes in addition to its own tools. Moving forward out of a step is
//! refused while the step's exit condition is false; moving backward is
//! always allowed.

mod instructions;
mod step;

pub use instructions::{DEFAULT_GLOBAL_INSTRUCTIONS, GOAL_GUIDANCE, GOAL_NOT_ACHIEVED, compose};
pub use step::{Callback, ConversationStep, ExitCondition, Instructions, StepContext};

use crate::error::{Result, SessionError};
use crate::session::{LiveSessionManager, SessionDetails, SessionInfo};
use crate::tools::{AiTool, ToolResponse, ToolSet, async_handler};
use crate::transport::AudioSink;
use apika_types::FunctionTool;
use futures::future::BoxFuture;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;

pub const TRANSITION_TOOL_NAME: &str = "transitionToStep";

pub const TRANSITION_IN_PROGRESS: &str = "A step transition is already in progress";

tokio::task_local! {
    /// Identity of the flow whose before-transition hook is running on this task.
    static IN_TRANSITION_HOOK: usize;
}

pub type BeforeTransitionHook = Arc<dyn Fn(ConversationStep) -> BoxFuture<'static, ()> + Send + Sync>;

pub struct FlowConfig {
    global_instructions: String,
    steps: Vec<ConversationStep>,
    on_before_step_transition: Option<BeforeTransitionHook>,
    on_complete: Option<Callback>,
}

impl FlowConfig {
    pub fn new(steps: Vec<ConversationStep>) -> Self {
        Self {
            global_instructions: DEFAULT_GLOBAL_INSTRUCTIONS.to_string(),
            steps,
            on_before_step_transition: None,
            on_complete: None,
        }
    }

    pub fn with_global_instructions(mut self, instructions: &str) -> Self {
        self.global_instructions = instructions.to_string();
        self
    }

    /// Awaited with the target step before every transition that passes the
    /// exit-condition check.
    ///
    /// The transition holds the flow's step lock while the hook runs. Calling
    /// `transition_to_step` or `reset_flow` on the same flow from inside the
    /// hook fails immediately; work spawned by the hook and awaited by it would
    /// wait for the lock forever.
    pub fn with_before_step_transition<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ConversationStep) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_before_step_transition = Some(Arc::new(move |step| Box::pin(f(step))));
        self
    }

    /// Runs every time the last step is entered.
    pub fn with_on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(SessionError::InvalidFlow("a flow needs at least one step".into()));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.label().to_lowercase()) {
                return Err(SessionError::InvalidFlow(format!(
                    "duplicate step label \"{}\"",
                    step.label()
                )));
            }
            if step.tools().contains(TRANSITION_TOOL_NAME) {
                return Err(SessionError::InvalidFlow(format!(
                    "step \"{}\" declares the reserved tool {}",
                    step.label(),
                    TRANSITION_TOOL_NAME
                )));
            }
        }
        Ok(())
    }
}

struct FlowInner {
    session: LiveSessionManager,
    global_instructions: String,
    steps: Vec<ConversationStep>,
    on_before_step_transition: Option<BeforeTransitionHook>,
    on_complete: Option<Callback>,
    /// Held for the whole of a transition.
    current: Mutex<usize>,
    /// Mirror of `current` for synchronous readers.
    index: AtomicUsize,
}

#[derive(Clone)]
pub struct FlowManager {
    inner: Arc<FlowInner>,
}

impl FlowManager {
    pub fn new(config: FlowConfig, session: LiveSessionManager) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(FlowInner {
                session,
                global_instructions: config.global_instructions,
                steps: config.steps,
                on_before_step_transition: config.on_before_step_transition,
                on_complete: config.on_complete,
                current: Mutex::new(0),
                index: AtomicUsize::new(0),
            }),
        })
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// True when called from inside this flow's own before-transition hook.
    fn in_own_hook(&self) -> bool {
        IN_TRANSITION_HOOK
            .try_with(|id| *id == self.id())
            .unwrap_or(false)
    }

    fn position(&self, label: &str) -> Option<usize> {
        let label = label.to_lowercase();
        self.inner
            .steps
            .iter()
            .position(|step| step.label().to_lowercase() == label)
    }

    /// Moves the flow to the step labelled `label` (case-insensitive).
    ///
    /// Never fails with an error: refusals come back as a failure response
    /// meant for the model.
    pub async fn transition_to_step(&self, label: &str) -> ToolResponse {
        if self.in_own_hook() {
            tracing::warn!("transition to \"{}\" requested from a before-transition hook", label);
            return ToolResponse::failure(TRANSITION_IN_PROGRESS);
        }
        let mut current = self.inner.current.lock().await;

        let Some(target) = self.position(label) else {
            tracing::error!("step with label \"{}\" not found", label);
            return ToolResponse::failure(format!("Step \"{}\" not found", label));
        };

        let from = &self.inner.steps[*current];
        if target > *current && !from.goal_achieved() {
            tracing::debug!("refusing to leave step \"{}\": goal not achieved", from.label());
            return ToolResponse::failure(GOAL_NOT_ACHIEVED).with("instructionsForAi", GOAL_GUIDANCE);
        }

        let to = &self.inner.steps[target];
        if let Some(hook) = &self.inner.on_before_step_transition {
            IN_TRANSITION_HOOK.scope(self.id(), hook(to.clone())).await;
        }

        from.exit();
        *current = target;
        self.inner.index.store(target, Ordering::SeqCst);
        to.enter();

        tracing::info!("transitioning from \"{}\" to \"{}\"", from.label(), to.label());
        self.push_step(target);

        if target == self.inner.steps.len() - 1 {
            if let Some(on_complete) = &self.inner.on_complete {
                on_complete();
            }
        }

        ToolResponse::ok(format!("Transitioned to step \"{}\"", to.label()))
    }

    /// Sends the step's instructions and tools to the session. A session
    /// without a channel keeps the tools for later.
    fn push_step(&self, index: usize) {
        let step = &self.inner.steps[index];
        let instructions = compose(&self.inner.global_instructions, &self.inner.steps, index);
        if let Err(e) = self.inner.session.reconfigure(&instructions, self.step_tools(step)) {
            tracing::warn!("failed to reconfigure session for step \"{}\": {}", step.label(), e);
        }
    }

    /// The transition tool followed by the step's own tools.
    pub fn step_tools(&self, step: &ConversationStep) -> ToolSet {
        let mut tools = ToolSet::new();
        for tool in std::iter::once(self.transition_tool()).chain(step.tools().iter().cloned()) {
            if let Err(e) = tools.insert(tool) {
                tracing::warn!("skipping tool for step \"{}\": {}", step.label(), e);
            }
        }
        tools
    }

    /// The `transitionToStep` tool for this flow. It holds the flow weakly.
    pub fn transition_tool(&self) -> AiTool {
        let labels = self
            .inner
            .steps
            .iter()
            .map(ConversationStep::label)
            .collect::<Vec<_>>()
            .join(", ");

        let definition = FunctionTool::new(
            TRANSITION_TOOL_NAME,
            "Transition to a different conversation step. Use this when you determine it's time to move to the next step in the conversation flow.",
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "stepLabel": {
                    "type": "string",
                    "description": format!("The label of the steps: {}", labels)
                }
            },
            "required": ["stepLabel"]
        }));

        let flow: Weak<FlowInner> = Arc::downgrade(&self.inner);
        let handler = async_handler(move |arguments: Value| {
            let flow = flow.clone();
            async move {
                let Some(inner) = flow.upgrade() else {
                    return Ok(ToolResponse::failure("The conversation flow is no longer active"));
                };
                let label = arguments
                    .get("stepLabel")
                    .and_then(Value::as_str)
                    .ok_or_else(|| anyhow::anyhow!("missing required argument stepLabel"))?;
                Ok(FlowManager { inner }.transition_to_step(label).await)
            }
        });

        AiTool::new(definition, handler)
    }

    /// Starts a session with the global instructions, then enters the first step.
    pub async fn initialize_flow(&self, sink: Option<Arc<dyn AudioSink>>) -> Result<SessionInfo> {
        let info = self
            .inner
            .session
            .create_session(
                SessionDetails::new(&self.inner.global_instructions),
                ToolSet::new(),
                sink,
            )
            .await?;

        let mut current = self.inner.current.lock().await;
        *current = 0;
        self.inner.index.store(0, Ordering::SeqCst);
        self.inner.steps[0].enter();
        self.push_step(0);

        Ok(info)
    }

    /// Leaves the current step and starts over with a new session.
    pub async fn reset_flow(&self, sink: Option<Arc<dyn AudioSink>>) -> Result<SessionInfo> {
        if self.in_own_hook() {
            return Err(SessionError::InvalidFlow(TRANSITION_IN_PROGRESS.to_string()));
        }
        {
            let mut current = self.inner.current.lock().await;
            self.inner.steps[*current].exit();
            *current = 0;
            self.inner.index.store(0, Ordering::SeqCst);
        }
        self.initialize_flow(sink).await
    }

    pub fn current_step_index(&self) -> usize {
        self.inner.index.load(Ordering::SeqCst)
    }

    pub fn current_step(&self) -> &ConversationStep {
        &self.inner.steps[self.current_step_index()]
    }

    pub fn steps(&self) -> &[ConversationStep] {
        &self.inner.steps
    }

    pub fn session(&self) -> &LiveSessionManager {
        &self.inner.session
    }
}
