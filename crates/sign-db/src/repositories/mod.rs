mod sqlite_translation_repository;
mod sqlite_wallet_repository;

pub use sqlite_translation_repository::SqliteTranslationRepository;
pub use sqlite_wallet_repository::SqliteWalletRepository;
