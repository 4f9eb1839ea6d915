//! Epics: long-lived processes turning actions and state into outputs.

use crate::channels::{ActionView, StateView};
use crate::error::{BridgeError, Result};
use crate::stream::Stream;
use crate::types::Action;
use std::fmt;
use std::sync::Arc;

type EpicFn<S, D> =
    dyn Fn(&ActionView, &StateView<S>, Option<&D>) -> Option<Stream<Action>> + Send + Sync;

/// A registered epic.
///
/// Returning `None` from the function is a configuration error reported at
/// registration.
pub struct Epic<S, D = ()> {
    name: Option<String>,
    f: Arc<EpicFn<S, D>>,
}

impl<S, D> Clone for Epic<S, D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            f: Arc::clone(&self.f),
        }
    }
}

impl<S, D> fmt::Debug for Epic<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epic({})", self.name())
    }
}

impl<S: 'static, D: 'static> Epic<S, D> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ActionView, &StateView<S>, Option<&D>) -> Option<Stream<Action>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: None,
            f: Arc::new(f),
        }
    }

    pub fn named<F>(name: &str, f: F) -> Self
    where
        F: Fn(&ActionView, &StateView<S>, Option<&D>) -> Option<Stream<Action>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: Some(name.to_string()),
            f: Arc::new(f),
        }
    }
}

impl<S, D> Epic<S, D> {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    /// Run the epic function and require an output stream.
    pub(crate) fn invoke(
        &self,
        actions: &ActionView,
        states: &StateView<S>,
        dependencies: Option<&D>,
    ) -> Result<Stream<Action>> {
        (self.f)(actions, states, dependencies).ok_or_else(|| BridgeError::MissingOutput {
            epic: self.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::DualChannel;
    use crate::scheduler::QueueScheduler;

    #[test]
    fn test_missing_output_names_epic() {
        let channel = DualChannel::new((), QueueScheduler::new());
        let epic: Epic<(), ()> = Epic::named("forgetful", |_, _, _| None);

        let err = epic
            .invoke(&channel.action_view(), &channel.state_view(), None)
            .err()
            .unwrap();
        assert_eq!(
            err,
            BridgeError::MissingOutput {
                epic: "forgetful".to_string()
            }
        );
    }

    #[test]
    fn test_anonymous_name() {
        let epic: Epic<(), ()> = Epic::new(|actions, _, _| Some(actions.stream()));
        assert_eq!(epic.name(), "<anonymous>");
        assert_eq!(format!("{:?}", epic), "Epic(<anonymous>)");
    }

    #[test]
    fn test_dependencies_are_passed_through() {
        let channel = DualChannel::new((), QueueScheduler::new());
        let epic: Epic<(), String> = Epic::new(|_, _, deps| {
            deps.filter(|d: &&String| d.as_str() == "api").map(|_| Stream::empty())
        });

        let deps = "api".to_string();
        let views = (channel.action_view(), channel.state_view());
        assert!(epic.invoke(&views.0, &views.1, Some(&deps)).is_ok());
        assert!(epic.invoke(&views.0, &views.1, None).is_err());
    }
}
