//! Local view-state for an editable remote users table.
//!
//! [`CollectionController`] holds the canonical collection and the single
//! open draft, turns user intents into calls on a [`UsersRemote`], and
//! publishes a [`Snapshot`] after every intent for a renderer to project.

pub mod controller;
pub mod diagnostics;
pub mod draft;
pub mod error;
pub mod policy;
pub mod remote;

pub use controller::{CollectionController, Snapshot};
pub use diagnostics::{Diagnostic, DiagnosticKind, Operation};
pub use draft::DraftState;
pub use error::{ControllerError, Intent};
pub use policy::{ReconcilePolicy, SyncPolicy, UnknownPolicy};
pub use remote::{HttpUsersRemote, UsersRemote};
