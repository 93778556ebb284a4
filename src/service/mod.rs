pub mod pagination;
pub mod transaction_service;

pub use pagination::PageRequest;
pub use transaction_service::{lookup_target, Found, LookupTarget, TransactionService};
