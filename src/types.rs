//! Core types: actions, the no-op sentinel and output routing.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reserved type tag meaning "this output intentionally does nothing".
///
/// An epic that has to emit something but means nothing emits
/// [`Action::noop()`]; the router discards it.
pub const NOOP: &str = "@@epic-bridge/NOOP";

/// An action flowing through the bridge.
///
/// `Named` is the bare form (a type name plus optional payload). `Rich` is the
/// structured form and carries the `is_action` marker that tells the router to
/// dispatch it rather than commit it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Value", try_from = "Value")]
pub enum Action {
    Named {
        action_type: String,
        payload: Option<Value>,
    },
    Rich {
        action_type: String,
        payload: Option<Value>,
        is_action: bool,
    },
}

impl Action {
    /// A bare action name without payload.
    pub fn named(action_type: impl Into<String>) -> Self {
        Action::Named {
            action_type: action_type.into(),
            payload: None,
        }
    }

    /// A bare action name with a payload.
    pub fn named_with(action_type: impl Into<String>, payload: Value) -> Self {
        Action::Named {
            action_type: action_type.into(),
            payload: Some(payload),
        }
    }

    /// A structured action the router forwards to `dispatch`.
    pub fn dispatch(action_type: impl Into<String>, payload: Value) -> Self {
        Action::Rich {
            action_type: action_type.into(),
            payload: Some(payload),
            is_action: true,
        }
    }

    /// A structured mutation the router forwards to `commit`.
    pub fn mutation(action_type: impl Into<String>, payload: Value) -> Self {
        Action::Rich {
            action_type: action_type.into(),
            payload: Some(payload),
            is_action: false,
        }
    }

    /// The no-op sentinel.
    pub fn noop() -> Self {
        Action::named(NOOP)
    }

    /// Effective type name.
    pub fn action_type(&self) -> &str {
        match self {
            Action::Named { action_type, .. } | Action::Rich { action_type, .. } => action_type,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Action::Named { payload, .. } | Action::Rich { payload, .. } => payload.as_ref(),
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Action::Rich { is_action: true, .. })
    }

    pub fn is_noop(&self) -> bool {
        self.action_type() == NOOP
    }

    /// Split into the `(type, payload)` pair a store expects.
    /// A missing payload becomes `Value::Null`.
    pub fn into_parts(self) -> (String, Value) {
        match self {
            Action::Named {
                action_type,
                payload,
            }
            | Action::Rich {
                action_type,
                payload,
                ..
            } => (action_type, payload.unwrap_or(Value::Null)),
        }
    }

    /// Normalize a JSON value into an action.
    ///
    /// A string is a bare name. An object must carry a string `type`; its
    /// `payload` is read when present. An object with a boolean `isAction` is
    /// structured, one without (or with `null`) is a bare name, and any other
    /// `isAction` is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(action_type) => Ok(Action::Named {
                action_type,
                payload: None,
            }),
            Value::Object(mut obj) => {
                let action_type = match obj.remove("type") {
                    Some(Value::String(t)) => t,
                    Some(other) => {
                        return Err(BridgeError::InvalidAction(format!(
                            "`type` must be a string, got {}",
                            other
                        )))
                    }
                    None => {
                        return Err(BridgeError::InvalidAction(
                            "object has no `type` field".to_string(),
                        ))
                    }
                };
                let payload = obj.remove("payload");
                match obj.remove("isAction") {
                    None | Some(Value::Null) => Ok(Action::Named {
                        action_type,
                        payload,
                    }),
                    Some(Value::Bool(is_action)) => Ok(Action::Rich {
                        action_type,
                        payload,
                        is_action,
                    }),
                    Some(other) => Err(BridgeError::InvalidAction(format!(
                        "`isAction` must be a boolean, got {}",
                        other
                    ))),
                }
            }
            other => Err(BridgeError::InvalidAction(format!(
                "expected a string or an object, got {}",
                other
            ))),
        }
    }

    /// JSON form of this action.
    pub fn to_value(&self) -> Value {
        match self {
            Action::Named {
                action_type,
                payload: None,
            } => Value::String(action_type.clone()),
            Action::Named {
                action_type,
                payload: Some(payload),
            } => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), Value::String(action_type.clone()));
                obj.insert("payload".to_string(), payload.clone());
                Value::Object(obj)
            }
            Action::Rich {
                action_type,
                payload,
                is_action,
            } => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), Value::String(action_type.clone()));
                if let Some(payload) = payload {
                    obj.insert("payload".to_string(), payload.clone());
                }
                obj.insert("isAction".to_string(), Value::Bool(*is_action));
                Value::Object(obj)
            }
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Named { action_type, payload } => match payload {
                Some(p) => write!(f, "Named({}, {})", action_type, p),
                None => write!(f, "Named({})", action_type),
            },
            Action::Rich {
                action_type,
                payload,
                is_action,
            } => {
                let kind = if *is_action { "Dispatch" } else { "Mutation" };
                match payload {
                    Some(p) => write!(f, "{}({}, {})", kind, action_type, p),
                    None => write!(f, "{}({})", kind, action_type),
                }
            }
        }
    }
}

impl From<&str> for Action {
    fn from(action_type: &str) -> Self {
        Action::named(action_type)
    }
}

impl From<String> for Action {
    fn from(action_type: String) -> Self {
        Action::named(action_type)
    }
}

impl From<(&str, Value)> for Action {
    fn from((action_type, payload): (&str, Value)) -> Self {
        Action::named_with(action_type, payload)
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        action.to_value()
    }
}

impl TryFrom<Value> for Action {
    type Error = BridgeError;

    fn try_from(value: Value) -> Result<Self> {
        Action::from_value(value)
    }
}

/// Where an output item goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// The no-op sentinel; dropped.
    Ignore,
    /// Forwarded to the store's `dispatch`.
    Dispatch,
    /// Forwarded to the store's `commit`.
    Commit,
}

/// Classify an item emitted by an epic.
pub fn route(action: &Action) -> Route {
    if action.is_noop() {
        Route::Ignore
    } else if action.is_action() {
        Route::Dispatch
    } else {
        Route::Commit
    }
}
