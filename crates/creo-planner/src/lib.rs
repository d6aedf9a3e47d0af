mod plan;
mod subsumption;
mod types;

pub use plan::{needs_install, plan, plan_with_table};
pub use subsumption::{SubsumptionTable, CONTENT_CATEGORIES};
pub use types::{PlanStep, UpdatePlan};

#[cfg(test)]
mod tests;
