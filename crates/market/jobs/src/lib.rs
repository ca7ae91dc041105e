//! Job lifecycle control against the remote market-side job store.
//!
//! The store owns job state. [`JobController`] creates jobs, requests
//! transitions and exposes the read side ([`JobTracker`](orca_api::JobTracker))
//! that transfer sessions consult at every chunk boundary.

mod controller;
mod wire;

pub use controller::JobController;
pub use wire::{AddJobRequest, AddJobResponse, JobCostRequest, JobRef, JobStatusResponse};
