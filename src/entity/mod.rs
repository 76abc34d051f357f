//! Budgeted items and the recency records that gate their pairing.

pub mod budget;
pub mod novelty;
pub mod task_link;

pub use budget::BudgetValue;
pub use novelty::{LinkNoveltyTracker, Recording};
pub use task_link::{LinkTemplate, LinkType, TaskLink};
