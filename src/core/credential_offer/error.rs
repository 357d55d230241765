use crate::core::metadata::CredentialIssuerIdError;

use super::matcher::CredentialMatchError;

/// Failure to resolve a Credential Offer.
///
/// Each variant names the resolution stage that failed and wraps its cause.
#[derive(Debug, thiserror::Error)]
pub enum CredentialOfferRequestError {
    /// The offer passed by reference could not be retrieved.
    #[error("unable to fetch credential offer: {0:#}")]
    UnableToFetchCredentialOffer(#[source] anyhow::Error),

    /// The offer is not valid JSON or does not have the shape of a Credential Offer.
    #[error("credential offer could not be parsed: {0:#}")]
    NonParseableCredentialOffer(#[source] anyhow::Error),

    /// `credential_issuer` is not a valid Credential Issuer Identifier.
    #[error("invalid credential issuer id: {0}")]
    InvalidCredentialIssuerId(#[source] CredentialIssuerIdError),

    #[error("unable to resolve credential issuer metadata: {0:#}")]
    UnableToResolveCredentialIssuerMetadata(#[source] anyhow::Error),

    #[error("unable to resolve authorization server metadata: {0:#}")]
    UnableToResolveAuthorizationServerMetadata(#[source] anyhow::Error),

    /// An offered credential does not match the issuer's catalog, or none was offered.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(#[source] CredentialMatchError),

    #[error("invalid grants: {0}")]
    InvalidGrants(#[source] serde_json::Error),
}
