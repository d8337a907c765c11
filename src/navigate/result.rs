//! Hook outcomes and navigation results.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Future returned by a filter hook or an action.
pub type HookFuture<'a> = BoxFuture<'a, Result<Outcome>>;

/// What a navigation produced.
///
/// Exactly one of `content` (a rendered body written verbatim) or `data`
/// (a structured value serialized as JSON/JSONP) is expected; a result with
/// neither is rejected when the response is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigateResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl NavigateResult {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            data: None,
        }
    }

    pub fn data(data: impl Into<Value>) -> Self {
        Self {
            content: None,
            data: Some(data.into()),
        }
    }

    /// Structured data, with a JSON `null` counted as absent.
    pub fn data_value(&self) -> Option<&Value> {
        self.data.as_ref().filter(|data| !data.is_null())
    }

    pub fn is_valid(&self) -> bool {
        self.content.is_some() || self.data_value().is_some()
    }
}

/// The value a hook hands back to the invoker.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not interested; ask the next item.
    Continue,
    /// Request handled; keep whatever response is already set.
    Halt,
    /// Request handled with this result.
    Result(NavigateResult),
}

impl Outcome {
    /// Whether this outcome claims the request and stops the iteration.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}

impl From<NavigateResult> for Outcome {
    fn from(result: NavigateResult) -> Self {
        Outcome::Result(result)
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Continue
    }
}

impl From<bool> for Outcome {
    /// `false` claims the request; `true` is just another primitive.
    fn from(value: bool) -> Self {
        if value {
            Outcome::Continue
        } else {
            Outcome::Halt
        }
    }
}

impl From<Option<NavigateResult>> for Outcome {
    fn from(result: Option<NavigateResult>) -> Self {
        result.map_or(Outcome::Continue, Outcome::Result)
    }
}

impl From<Value> for Outcome {
    /// Apply the success predicate to an untyped value: `false` and any
    /// object or array claim the request, everything else defers.
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(false) => Outcome::Halt,
            Value::Object(mut map) => {
                let content = match map.remove("content") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s),
                    Some(other) => Some(other.to_string()),
                };
                let data = map.remove("data").filter(|v| !v.is_null());
                Outcome::Result(NavigateResult { content, data })
            }
            Value::Array(_) => Outcome::Result(NavigateResult::default()),
            _ => Outcome::Continue,
        }
    }
}
