//! Composition utilities for building repository trait objects from a pool.
//! Construction only — no domain logic lives here.

use std::sync::Arc;

use sqlx::SqlitePool;

use sign_core::ports::{TranslationRepository, WalletPort};

use crate::repositories::{SqliteTranslationRepository, SqliteWalletRepository};

/// Bundles the trait-object-wrapped repositories the composition root wires
/// into the services that depend on them.
#[derive(Clone)]
pub struct Repos {
    pub wallet: Arc<dyn WalletPort>,
    pub translations: Arc<dyn TranslationRepository>,
}

pub struct RepoFactory;

impl RepoFactory {
    #[must_use]
    pub fn build(pool: SqlitePool) -> Repos {
        Repos {
            wallet: Arc::new(SqliteWalletRepository::new(pool.clone())),
            translations: Arc::new(SqliteTranslationRepository::new(pool)),
        }
    }
}
