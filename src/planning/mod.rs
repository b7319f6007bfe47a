//! Financial plans and interest projections.

pub mod interest;
pub mod plan;

pub use interest::{InterestType, ANNUALLY, DAILY, MONTHLY, QUARTERLY};
pub use plan::{CategoryVariance, FinancialPlan, GoalProgress, ProjectionPoint};
