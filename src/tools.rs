use crate::error::{Result, SessionError};
use apika_types::{FunctionTool, Tool};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// What a tool hands back to the model.
///
/// `data` is flattened next to `success` and `message` on the wire, so
/// `ToolResponse::failure("x").with("instructionsForAi", "...")` serializes as
/// `{"success":false,"message":"x","instructionsForAi":"..."}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolResponse {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(flatten)]
    data: Map<String, Value>,
}

impl ToolResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            data: Map::new(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// A locally executed function the model may call.
///
/// Returning `Err` is fine: the dispatcher turns it into a failure response.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> anyhow::Result<ToolResponse>;
}

struct SyncFn<F>(F);

#[async_trait]
impl<F> ToolHandler for SyncFn<F>
where
    F: Fn(Value) -> anyhow::Result<ToolResponse> + Send + Sync,
{
    async fn call(&self, arguments: Value) -> anyhow::Result<ToolResponse> {
        (self.0)(arguments)
    }
}

struct AsyncFn<F>(F);

#[async_trait]
impl<F, Fut> ToolHandler for AsyncFn<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ToolResponse>> + Send + 'static,
{
    async fn call(&self, arguments: Value) -> anyhow::Result<ToolResponse> {
        (self.0)(arguments).await
    }
}

pub fn sync_handler<F>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(Value) -> anyhow::Result<ToolResponse> + Send + Sync + 'static,
{
    Arc::new(SyncFn(f))
}

pub fn async_handler<F, Fut>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<ToolResponse>> + Send + 'static,
{
    Arc::new(AsyncFn(f))
}

#[derive(Clone)]
pub struct AiTool {
    definition: FunctionTool,
    handler: Arc<dyn ToolHandler>,
}

impl AiTool {
    pub fn new(definition: FunctionTool, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            definition,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &FunctionTool {
        &self.definition
    }

    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        self.handler.clone()
    }
}

impl std::fmt::Debug for AiTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiTool")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Tools keyed by name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Vec<AiTool>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tools(tools: impl IntoIterator<Item = AiTool>) -> Result<Self> {
        let mut set = Self::new();
        for tool in tools {
            set.insert(tool)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, tool: AiTool) -> Result<()> {
        if self.contains(tool.name()) {
            return Err(SessionError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, tool: AiTool) -> Result<Self> {
        self.insert(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&AiTool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(AiTool::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AiTool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions as they appear in `session.update`.
    pub fn definitions(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| Tool::from(t.definition.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo(name: &str) -> AiTool {
        AiTool::new(
            FunctionTool::new(name, "echo"),
            sync_handler(|args| Ok(ToolResponse::success().with("echo", args))),
        )
    }

    #[test]
    fn failure_with_guidance_flattens_data() {
        let response = ToolResponse::failure("The goal of the current step is not achieved.")
            .with("instructionsForAi", "Ask the user.");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "message": "The goal of the current step is not achieved.",
                "instructionsForAi": "Ask the user."
            })
        );
    }

    #[test]
    fn bare_success_has_no_message() {
        assert_eq!(
            serde_json::to_value(ToolResponse::success()).unwrap(),
            json!({ "success": true })
        );
    }

    #[test]
    fn tool_names_are_unique() {
        let mut set = ToolSet::new();
        set.insert(echo("a")).unwrap();
        set.insert(echo("b")).unwrap();
        let err = set.insert(echo("a")).unwrap_err();
        assert!(matches!(err, SessionError::DuplicateTool(name) if name == "a"));
        assert_eq!(set.names(), vec!["a", "b"]);
    }

    #[test]
    fn definitions_keep_insertion_order() {
        let set = ToolSet::from_tools([echo("z"), echo("a")]).unwrap();
        let names: Vec<_> = set.definitions().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[tokio::test]
    async fn sync_and_async_handlers_are_awaited_alike() {
        let sync = sync_handler(|_| Ok(ToolResponse::ok("sync")));
        let asynchronous = async_handler(|args: Value| async move {
            tokio::task::yield_now().await;
            Ok(ToolResponse::ok("async").with("city", args["city"].clone()))
        });

        assert_eq!(sync.call(json!({})).await.unwrap().message(), Some("sync"));
        let response = asynchronous.call(json!({ "city": "Oslo" })).await.unwrap();
        assert_eq!(response.message(), Some("async"));
        assert_eq!(response.get("city"), Some(&json!("Oslo")));
    }
}
