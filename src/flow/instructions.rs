use crate::flow::step::{ConversationStep, StepContext};

pub const DEFAULT_GLOBAL_INSTRUCTIONS: &str = "You are a helpful AI assistant.";

pub const GOAL_NOT_ACHIEVED: &str = "The goal of the current step is not achieved.";

pub const GOAL_GUIDANCE: &str = "- Please try to achieve the goal of the current step.\n\
- If you are not sure how to achieve the goal, ask the user for clarification.\n\
- If you are not sure what the goal of the current step is, ask the user for clarification.";

fn labels(steps: &[ConversationStep]) -> String {
    steps
        .iter()
        .map(ConversationStep::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full instructions for the step at `index`: flow context, working rules,
/// the global instructions, then the step's own text.
pub fn compose(global: &str, steps: &[ConversationStep], index: usize) -> String {
    let total = steps.len();
    let step = &steps[index];

    let next = match labels(&steps[index + 1..]) {
        s if s.is_empty() => "None (this is the last step)".to_string(),
        s => s,
    };
    let previous = match labels(&steps[..index]) {
        s if s.is_empty() => "None (this is the first step)".to_string(),
        s => s,
    };

    let context = StepContext {
        index,
        label: step.label().to_string(),
        total,
    };

    format!(
        "You are part of a multi-step conversation flow. Here's the context:\n\
- Total steps: {total}\n\
- Current step: {label} (Step {position} of {total})\n\
- Next steps: {next}\n\
- Previous steps: {previous}\n\
\n\
Crucial instructions:\n\
1. Focus on the current step's instructions and context, try to achieve the goal of the current step as soon as possible.\n\
2. When you achieve the goal of the current step, use the transitionToStep function with the appropriate step label.\n\
3. Stay a bit descriptive about the current step, but don't be too verbose.\n\
\n\
General goal or instructions:\n\
{global}\n\
\n\
{own}",
        label = step.label(),
        position = index + 1,
        own = step.instructions().render(&context),
    )
}
