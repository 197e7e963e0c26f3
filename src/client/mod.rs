pub mod api;
pub mod error;
pub mod session;
pub mod token_store;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, AuthApi};
pub use error::ClientError;
pub use session::{Navigator, Session, SessionHolder, View};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use wizard::{Field, RegistrationWizard, Step, WizardError};
