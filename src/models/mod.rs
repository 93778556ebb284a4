pub mod chain;
pub mod classification;

pub use chain::{Block, Log, Receipt, Transaction};
pub use classification::{BlockWithTypes, ClassifiedTransaction, TransactionType};
