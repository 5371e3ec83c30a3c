//! Application Layer
//!
//! Use cases and application services.

pub mod account;
pub mod config;
pub mod current_user;
pub mod oauth_sign_in;
pub mod refresh;
pub mod sign_in;
pub mod sign_up;
pub mod tokens;

// Re-exports
pub use account::{DeleteAccountUseCase, UpdateProfileInput, UpdateProfileUseCase};
pub use config::AuthConfig;
pub use current_user::CurrentUserUseCase;
pub use oauth_sign_in::{OAuthSignInInput, OAuthSignInUseCase};
pub use refresh::RefreshUseCase;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use tokens::{SignedInSession, TokenIssuer, TokenPair};
