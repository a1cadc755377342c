use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub type ExpressionId = String;

/// Method reference as sent by the engine, with raw qualified names.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethodPointer {
    pub module: String,
    pub defined_on_type: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethodCall {
    pub method_pointer: MethodPointer,
    #[serde(default)]
    pub not_applied_arguments: Vec<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct Warnings {
    pub count: u32,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSchema {
    pub method_pointer: MethodPointer,
    #[serde(default)]
    pub not_applied_arguments: Vec<usize>,
}

/// Execution state of an expression.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(tag = "type")]
pub enum ExpressionUpdatePayload {
    #[serde(rename_all = "camelCase")]
    Value {
        #[serde(default)]
        warnings: Option<Warnings>,
        #[serde(default)]
        function_schema: Option<FunctionSchema>,
    },
    DataflowError {
        #[serde(default)]
        trace: Vec<ExpressionId>,
    },
    Panic {
        message: String,
        #[serde(default)]
        trace: Vec<ExpressionId>,
    },
    Pending {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        progress: Option<f64>,
    },
}

impl ExpressionUpdatePayload {
    pub fn is_pending(&self) -> bool {
        matches!(self, ExpressionUpdatePayload::Pending { .. })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum ProfilingInfo {
    #[serde(rename_all = "camelCase")]
    ExecutionTime { nano_time: u64 },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionUpdate {
    pub expression_id: ExpressionId,
    /// Type hierarchy of the value, most specific first.
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub method_call: Option<MethodCall>,
    #[serde(default)]
    pub profiling_info: Vec<ProfilingInfo>,
    #[serde(default)]
    pub from_cache: bool,
    pub payload: ExpressionUpdatePayload,
}
