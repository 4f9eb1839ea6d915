//! Plugin configuration.

use super::epic::Epic;

/// Plugin configuration.
#[derive(Clone, Debug)]
pub struct PluginConfig<D> {
    /// Injected into every epic as its third argument. When `None`, epics
    /// receive `None` there.
    pub dependencies: Option<D>,

    /// Log protocol warnings (binding twice, running before install).
    /// Default: true
    pub protocol_warnings: bool,
}

impl<D> Default for PluginConfig<D> {
    fn default() -> Self {
        Self {
            dependencies: None,
            protocol_warnings: true,
        }
    }
}

impl<D> PluginConfig<D> {
    /// Configuration injecting `dependencies` into every epic.
    pub fn with_dependencies(dependencies: D) -> Self {
        Self {
            dependencies: Some(dependencies),
            ..Default::default()
        }
    }
}

/// What a plugin may be constructed from.
///
/// Only `Config` is accepted. Passing the root epic in place of the
/// configuration is rejected; epics are registered through `run`.
pub enum PluginOptions<S, D> {
    Config(PluginConfig<D>),
    RootEpic(Epic<S, D>),
}

impl<S, D> From<PluginConfig<D>> for PluginOptions<S, D> {
    fn from(config: PluginConfig<D>) -> Self {
        PluginOptions::Config(config)
    }
}

impl<S, D> From<Epic<S, D>> for PluginOptions<S, D> {
    fn from(epic: Epic<S, D>) -> Self {
        PluginOptions::RootEpic(epic)
    }
}
