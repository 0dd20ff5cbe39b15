//! Services module for invoicing-service.

pub mod bootstrap;
pub mod credentials;
pub mod database;
pub mod metrics;
pub mod page_cache;
pub mod password;

pub use bootstrap::{ensure_bootstrap_user, BootstrapOutcome};
pub use credentials::{
    AuthErrorKind, AuthenticatedUser, CredentialVerifier, CredentialsProvider, SignInOutcome,
    UserDirectory, CREDENTIALS_STRATEGY,
};
pub use database::{Database, InvoiceStore};
pub use metrics::{get_metrics, init_metrics};
pub use page_cache::{MemoryPageCache, PageCache};
