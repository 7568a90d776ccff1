use std::fmt;

use tessel_template::PatchError;
use thiserror::Error;

/// Lifecycle step that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BeforeUpdate,
    Render,
    AfterUpdate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::BeforeUpdate => "before_update",
            Phase::Render => "render",
            Phase::AfterUpdate => "after_update",
        })
    }
}

/// Error that aborted a flush.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("<{component}> {phase} failed")]
    Lifecycle {
        component: &'static str,
        phase: Phase,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("patching the rendered output failed")]
    Render(#[from] PatchError),
}

impl UpdateError {
    pub(crate) fn lifecycle(component: &'static str, phase: Phase, err: anyhow::Error) -> Self {
        UpdateError::Lifecycle {
            component,
            phase,
            source: err.into(),
        }
    }

    /// Phase of a lifecycle error; `None` for patch failures.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            UpdateError::Lifecycle { phase, .. } => Some(*phase),
            UpdateError::Render(_) => None,
        }
    }
}

/// Write to a name the component type does not declare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("<{component}> has no property `{name}`")]
    UnknownProperty {
        component: &'static str,
        name: String,
    },
}
