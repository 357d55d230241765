//! This library provides the wallet side of [OpenID4VCI] credential offer resolution.
//!
//! [OpenID4VCI]: <https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html>
//!
//! # Usage
//!
//! A [`CredentialOfferResolver`] turns a credential offer, passed by value or by reference,
//! into a validated [`CredentialOffer`]:
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use openid4vci::core::util::ReqwestClient;
//! use openid4vci::resolver::CredentialOfferResolver;
//!
//! let resolver = CredentialOfferResolver::builder()
//!     .with_http_client(Arc::new(ReqwestClient::new()?))
//!     .build()?;
//!
//! // Typically scanned from a QR code or received through a deep link.
//! let url = "openid-credential-offer://?credential_offer_uri=https%3A%2F%2Fissuer.example%2Foffer%2F1".parse()?;
//! let offer = resolver.resolve_url(&url).await?;
//!
//! for credential in offer.credentials().iter() {
//!     println!("{:?} (scope: {:?})", credential.format(), credential.scope());
//! }
//! ```
//!
//! The Credential Issuer and Authorization Server metadata are fetched from their well-known
//! locations unless custom [`CredentialIssuerMetadataResolver`] and
//! [`AuthorizationServerMetadataResolver`] implementations are given to the builder.
//!
//! [`CredentialOfferResolver`]: crate::resolver::CredentialOfferResolver
//! [`CredentialOffer`]: crate::core::credential_offer::CredentialOffer
//! [`CredentialIssuerMetadataResolver`]: crate::core::metadata::resolver::CredentialIssuerMetadataResolver
//! [`AuthorizationServerMetadataResolver`]: crate::core::metadata::resolver::AuthorizationServerMetadataResolver
//!
//! # Resolution
//!
//! 1. *Fetch*: an offer passed by reference (`credential_offer_uri`) is retrieved with the
//!    [`AsyncHttpClient`].
//! 2. *Parse*: the offer is decoded and its `credential_issuer` validated.
//! 3. *Metadata*: the Credential Issuer metadata is resolved, then the metadata of the
//!    Authorization Server it names.
//! 4. *Match*: each offered credential is matched against the issuer's `credentials_supported`,
//!    either by scope or through the [`FormatRegistry`] entry for its `format`.
//! 5. *Grants*: the `authorization_code` and `pre-authorized_code` grants are normalized.
//!
//! Every stage reports its own [`CredentialOfferRequestError`] variant, and no offer is
//! produced unless all of them succeed.
//!
//! [`AsyncHttpClient`]: crate::core::util::AsyncHttpClient
//! [`FormatRegistry`]: crate::core::credential_format::FormatRegistry
//! [`CredentialOfferRequestError`]: crate::core::credential_offer::CredentialOfferRequestError
//!
//! # Credential Formats
//!
//! - **mso_mdoc** (`mso_mdoc`): ISO/IEC 18013-5 mobile documents, identified by `doctype`
//! - **JWT VC** (`jwt_vc_json`): W3C Verifiable Credentials secured with JWT
//! - **JWT VC JSON-LD** (`jwt_vc_json-ld`): JSON-LD W3C Verifiable Credentials secured with JWT
//! - **LDP VC** (`ldp_vc`): JSON-LD W3C Verifiable Credentials with Data Integrity proofs

pub mod config;
pub mod core;
pub mod resolver;
pub mod utils;
