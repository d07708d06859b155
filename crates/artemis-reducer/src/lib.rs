//! Pure, replayable state reduction for an ActiveMQ Artemis deployment
//! editor.
//!
//! The editing UI issues [`Action`]s; [`reduce`] turns the current
//! [`ConfigurationState`] and one action into the next state. The reducer
//! performs no I/O and never blocks: watching cluster secrets, creating
//! certificates and talking to the Kubernetes API all live in external
//! collaborators that feed actions in after their own work completes.

pub mod action;
pub mod ingress;
pub mod properties;
pub mod reducer;
pub mod state;

mod allocator;

pub use action::{
    Action, ConsoleAction, EndpointAction, GlobalAction, RestrictedAction, V1Action, V2Action,
};
pub use reducer::reduce;
pub use state::{ConfigurationState, EditorMode, SchemaVersion, WatchedSecret};

// External re-exports
pub use artemis_crd;
