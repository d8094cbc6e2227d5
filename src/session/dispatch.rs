use crate::session::Shared;
use crate::tools::{ToolResponse, ToolSet};
use apika_types::FunctionCallItem;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;

pub(crate) type CallTx = mpsc::UnboundedSender<FunctionCallItem>;

/// Starts the per-session worker that runs tool calls one at a time, in the
/// order the model issued them.
pub(crate) fn spawn(shared: Arc<Shared>, cancel: CancellationToken) -> CallTx {
    let (tx, mut rx) = mpsc::unbounded_channel::<FunctionCallItem>();

    tokio::spawn(async move {
        loop {
            let call = tokio::select! {
                _ = cancel.cancelled() => break,
                call = rx.recv() => match call {
                    Some(call) => call,
                    None => break,
                },
            };

            tracing::debug!("function call: {}, call_id={}", call.name(), call.call_id());
            // tools may be swapped while this call runs; it keeps the set it started with
            let tools = shared.tools();
            let response = tokio::select! {
                _ = cancel.cancelled() => break,
                response = execute(&tools, &call, shared.timeouts.tool) => response,
            };
            shared.send_function_output(call.call_id(), &response);
        }
        tracing::debug!("dispatcher stopped");
    });

    tx
}

/// Runs one call to completion. Every failure mode becomes a failure response.
pub async fn execute(tools: &ToolSet, call: &FunctionCallItem, limit: Duration) -> ToolResponse {
    let name = call.name();
    let Some(tool) = tools.get(name) else {
        tracing::error!("function {} not found in tools", name);
        return ToolResponse::failure(format!("Function {} not found", name));
    };

    let arguments = match parse_arguments(call.arguments()) {
        Ok(arguments) => arguments,
        Err(e) => {
            tracing::warn!("invalid arguments for {}: {}", name, e);
            return ToolResponse::failure(format!("Invalid arguments for {}: {}", name, e));
        }
    };

    // own task so a panicking handler cannot take the dispatcher down with it;
    // dropping this future (session teardown) aborts the handler
    let handler = tool.handler();
    let mut task = AbortOnDropHandle::new(tokio::spawn(async move { handler.call(arguments).await }));
    match tokio::time::timeout(limit, &mut task).await {
        Ok(Ok(Ok(response))) => response,
        Ok(Ok(Err(e))) => {
            tracing::error!("error calling function {}: {}", name, e);
            ToolResponse::failure(e.to_string())
        }
        Ok(Err(e)) if e.is_panic() => {
            let message = panic_message(e.into_panic().as_ref());
            tracing::error!("function {} panicked: {}", name, message);
            ToolResponse::failure(message)
        }
        Ok(Err(e)) => {
            tracing::error!("function {} was cancelled: {}", name, e);
            ToolResponse::failure(e.to_string())
        }
        Err(_) => {
            task.abort();
            tracing::error!("function {} timed out after {:?}", name, limit);
            ToolResponse::failure(format!("Function {} timed out", name))
        }
    }
}

fn parse_arguments(raw: &str) -> serde_json::Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool handler panicked".to_string()
    }
}
