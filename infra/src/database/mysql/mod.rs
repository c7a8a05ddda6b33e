//! MySQL implementations of the core repository traits

pub mod principal_directory_impl;
pub mod token_repository_impl;

pub use principal_directory_impl::MySqlPrincipalDirectory;
pub use token_repository_impl::MySqlTokenRepository;
