//! Identity Provider Verification
//!
//! The seam between sign-in and an external OpenID provider. An
//! implementation checks an id-token's signature, audience, issuer and
//! expiry, and returns the identity it vouches for.

use crate::error::AuthResult;

/// Identity asserted by a verified provider id-token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Provider-assigned subject (`sub`)
    pub subject: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Verifies id-tokens issued by one provider
///
/// Errors: `InvalidToken` when the token does not verify,
/// `ProviderUnavailable` when the provider's keys cannot be fetched.
#[trait_variant::make(IdentityVerifier: Send)]
pub trait LocalIdentityVerifier {
    /// Lower-case provider name this verifier answers for
    fn provider(&self) -> &str;

    async fn verify(&self, id_token: &str) -> AuthResult<VerifiedIdentity>;
}
