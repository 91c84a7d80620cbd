pub mod params;
pub mod payload;
pub mod planner;

pub use params::{ListParams, ListQuery};
pub use payload::{MemberDraft, MutationBatch, RowValidation};
pub use planner::{MutationOutcome, Planner};
