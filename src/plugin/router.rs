//! Output router: sends each aggregated epic output to dispatch or commit.

use super::intercept::Intercepted;
use crate::error::BridgeError;
use crate::store::Store;
use crate::stream::{Notification, Observer};
use crate::types::{route, Action, Route};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, error};

pub(crate) struct Router<St: Store> {
    target: Weak<Intercepted<St>>,
    failure: Arc<Mutex<Option<BridgeError>>>,
}

impl<St: Store> Router<St> {
    pub(crate) fn new(
        target: Weak<Intercepted<St>>,
        failure: Arc<Mutex<Option<BridgeError>>>,
    ) -> Self {
        Self { target, failure }
    }

    fn deliver(&self, action: Action) {
        let decision = route(&action);
        if decision == Route::Ignore {
            debug!("noop output ignored");
            return;
        }

        let Some(target) = self.target.upgrade() else {
            debug!(action = action.action_type(), "store dropped; output discarded");
            return;
        };

        let action_type = action.action_type().to_string();
        let result = match decision {
            Route::Dispatch => target.dispatch_action(action),
            Route::Commit => target.commit_action(action),
            Route::Ignore => Ok(()),
        };
        if let Err(e) = result {
            error!(action = %action_type, error = %e, "store rejected epic output");
        }
    }

    pub(crate) fn into_observer(self) -> Observer<Action> {
        Observer::new(move |notification| match notification {
            Notification::Next(action) => self.deliver(action),
            Notification::Error(e) => {
                error!(error = %e, "epic output stream failed; aggregation stopped");
                *self.failure.lock() = Some(e);
            }
            Notification::Complete => debug!("aggregated epic output completed"),
        })
    }
}
