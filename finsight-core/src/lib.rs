//! finsight-core: shared transaction types and the category table for the
//! statement-analysis pipeline.

pub mod category;
pub mod transaction;

pub use category::{CATEGORY_RULES, Category, categorize};
pub use transaction::{CategorizedTransaction, EnrichedTransaction, RawCandidate};
