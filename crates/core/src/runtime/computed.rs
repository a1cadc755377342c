//! Registry of the latest known runtime information per expression.

use crate::project::PathResolver;
use crate::suggestion::MethodPointer;
use dashmap::DashMap;
use futures::StreamExt;
use futures::stream::BoxStream;
use semscope_api::{ExpressionId, ExpressionUpdate, ExpressionUpdatePayload, ProfilingInfo};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallInfo {
    pub method_pointer: MethodPointer,
    pub not_applied_arguments: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionInfo {
    /// Most specific type, printed relative to the current project.
    pub typename: Option<String>,
    /// Most specific type as the server sent it.
    pub raw_typename: Option<String>,
    pub method_call: Option<MethodCallInfo>,
    pub payload: ExpressionUpdatePayload,
    pub profiling_info: Vec<ProfilingInfo>,
    pub from_cache: bool,
}

pub struct ComputedValueRegistry {
    resolver: Arc<PathResolver>,
    values: DashMap<ExpressionId, ExpressionInfo>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl ComputedValueRegistry {
    pub fn new(resolver: Arc<PathResolver>) -> Self {
        Self {
            resolver,
            values: DashMap::new(),
            cancel: Mutex::new(None),
        }
    }

    pub fn get_expression_info(&self, id: &str) -> Option<ExpressionInfo> {
        self.values.get(id).map(|info| info.clone())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge a batch of updates. A `Pending` update keeps the previously
    /// known type and method call.
    pub fn process_updates(&self, updates: Vec<ExpressionUpdate>) {
        for update in updates {
            let mut info = self.translate(&update);
            if update.payload.is_pending() {
                if let Some(previous) = self.values.get(&update.expression_id) {
                    if info.raw_typename.is_none() {
                        info.typename = previous.typename.clone();
                        info.raw_typename = previous.raw_typename.clone();
                    }
                    if info.method_call.is_none() {
                        info.method_call = previous.method_call.clone();
                    }
                }
            }
            tracing::trace!("Expression {} updated: {:?}", update.expression_id, info.typename);
            self.values.insert(update.expression_id, info);
        }
    }

    fn translate(&self, update: &ExpressionUpdate) -> ExpressionInfo {
        let raw_typename = update.types.first().cloned();
        let typename = raw_typename.as_deref().map(|raw| {
            self.resolver
                .parse_project_path_str(raw)
                .map(|path| self.resolver.print_project_path(&path).to_string())
                .unwrap_or_else(|_| raw.to_string())
        });
        let method_call = update.method_call.as_ref().and_then(|call| {
            match MethodPointer::from_wire(&call.method_pointer, &self.resolver) {
                Ok(method_pointer) => Some(MethodCallInfo {
                    method_pointer,
                    not_applied_arguments: call.not_applied_arguments.clone(),
                }),
                Err(e) => {
                    tracing::warn!(
                        "Dropping malformed method call of expression {}: {}",
                        update.expression_id,
                        e
                    );
                    None
                }
            }
        });
        ExpressionInfo {
            typename,
            raw_typename,
            method_call,
            payload: update.payload.clone(),
            profiling_info: update.profiling_info.clone(),
            from_cache: update.from_cache,
        }
    }

    /// Consume `updates` on a background task until the stream ends or
    /// [`dispose`](Self::dispose) is called. Replaces any running consumer.
    pub fn start(
        self: &Arc<Self>,
        mut updates: BoxStream<'static, Vec<ExpressionUpdate>>,
        parent: &CancellationToken,
    ) {
        let token = parent.child_token();
        if let Some(previous) = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone())
        {
            previous.cancel();
        }

        let registry = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    batch = updates.next() => {
                        let Some(batch) = batch else { break };
                        let Some(registry) = registry.upgrade() else { break };
                        registry.process_updates(batch);
                    }
                }
            }
            tracing::debug!("Expression update consumer stopped");
        });
    }

    pub fn dispose(&self) {
        if let Some(token) = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

impl Drop for ComputedValueRegistry {
    fn drop(&mut self) {
        self.dispose();
    }
}
