//! The hostwatch alert cycle.
//!
//! A cycle samples the host, evaluates thresholds, resolves who to notify,
//! dispatches the alert and records the result. Each external dependency sits
//! behind a trait so the orchestrator can be driven by fakes in tests:
//!
//! - [`MetricsSampler`]: where snapshots come from.
//! - [`RecipientResolver`]: who a session token belongs to.
//! - [`AlertStore`]: where samples, logs, alerts and notification history
//!   are appended.
//!
//! The same pipeline also sends status reports and manual alerts on demand.

pub mod messaging;
pub mod orchestrator;
pub mod recorder;
pub mod resolver;
pub mod sampler;
pub mod store;

pub use messaging::{ManualAlertRequest, MessageReport, MessageState, StatusRequest};
pub use orchestrator::{
    CycleError, CycleReport, CycleRequest, CycleState, Pipeline, DEFAULT_STEP_TIMEOUT,
};
pub use recorder::{AlertRecorder, RecordedBatch};
pub use resolver::{JwtRecipientResolver, RecipientResolver, ResolveError};
pub use sampler::{MetricsSampler, SamplingError, SysinfoSampler};
pub use store::{AlertStore, PgAlertStore, StoreError};
