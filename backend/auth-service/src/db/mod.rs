pub mod token_repo;
pub mod user_repo;

pub use token_repo::PgRefreshTokenStore;
pub use user_repo::PgCredentialStore;
