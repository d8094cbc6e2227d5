use crate::tools::ToolSet;
use std::fmt;
use std::sync::Arc;

/// Where a step sits in its flow, for rendering its instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepContext {
    pub index: usize,
    pub label: String,
    pub total: usize,
}

/// A step's instructions. Static text is a closure that ignores its context.
#[derive(Clone)]
pub struct Instructions(Arc<dyn Fn(&StepContext) -> String + Send + Sync>);

impl Instructions {
    pub fn fixed(text: &str) -> Self {
        let text = text.to_string();
        Self(Arc::new(move |_| text.clone()))
    }

    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&StepContext) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn render(&self, context: &StepContext) -> String {
        (self.0)(context)
    }
}

impl From<&str> for Instructions {
    fn from(text: &str) -> Self {
        Self::fixed(text)
    }
}

impl From<String> for Instructions {
    fn from(text: String) -> Self {
        Self::fixed(&text)
    }
}

pub type Callback = Arc<dyn Fn() + Send + Sync>;
pub type ExitCondition = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Clone)]
pub struct ConversationStep {
    label: String,
    instructions: Instructions,
    tools: ToolSet,
    on_enter: Option<Callback>,
    on_exit: Option<Callback>,
    exit_condition: Option<ExitCondition>,
}

impl ConversationStep {
    pub fn new(label: &str, instructions: impl Into<Instructions>) -> Self {
        Self {
            label: label.to_string(),
            instructions: instructions.into(),
            tools: ToolSet::new(),
            on_enter: None,
            on_exit: None,
            exit_condition: None,
        }
    }

    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_on_enter(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_enter = Some(Arc::new(f));
        self
    }

    pub fn with_on_exit(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_exit = Some(Arc::new(f));
        self
    }

    /// Gates forward transitions out of this step. Backward moves ignore it.
    pub fn with_exit_condition(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.exit_condition = Some(Arc::new(f));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn instructions(&self) -> &Instructions {
        &self.instructions
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub(crate) fn enter(&self) {
        if let Some(on_enter) = &self.on_enter {
            on_enter();
        }
    }

    pub(crate) fn exit(&self) {
        if let Some(on_exit) = &self.on_exit {
            on_exit();
        }
    }

    /// `true` when the step has no exit condition.
    pub fn goal_achieved(&self) -> bool {
        self.exit_condition.as_ref().is_none_or(|condition| condition())
    }
}

impl fmt::Debug for ConversationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationStep")
            .field("label", &self.label)
            .field("tools", &self.tools.names())
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("exit_condition", &self.exit_condition.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_and_dynamic_instructions_render_alike() {
        let context = StepContext {
            index: 2,
            label: "Recommend".into(),
            total: 4,
        };
        assert_eq!(Instructions::from("Suggest a course").render(&context), "Suggest a course");
        let dynamic = Instructions::dynamic(|ctx| format!("Step {} of {}: {}", ctx.index + 1, ctx.total, ctx.label));
        assert_eq!(dynamic.render(&context), "Step 3 of 4: Recommend");
    }

    #[test]
    fn steps_without_condition_always_pass() {
        let open = ConversationStep::new("Greet", "Say hi");
        let closed = ConversationStep::new("Collect", "Ask").with_exit_condition(|| false);
        assert!(open.goal_achieved());
        assert!(!closed.goal_achieved());
    }
}
