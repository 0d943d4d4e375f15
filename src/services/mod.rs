pub mod project_service;
pub mod reconcile;

pub use project_service::{NewProject, ProjectChanges, ProjectError, ProjectService};
pub use reconcile::{ReconcileError, ReconcileReport, Reconciler};
