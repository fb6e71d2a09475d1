pub mod translation;
pub mod wallet;

pub use translation::{
    Direction, InputType, OutputType, ProcessingMode, TranslationRecord, TranslationStatus,
};
pub use wallet::{CreditTransaction, SubscriptionPlan, TransactionKind, Wallet};
