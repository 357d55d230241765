use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;
use url::Url;

use self::grants::{AuthorizationCode, Grants};
use super::{
    credential_format::CredentialFormat,
    metadata::{
        credential_supported::{ContextUri, CredentialSupported},
        AuthorizationServerMetadata, CredentialIssuerId, CredentialIssuerMetadata,
    },
    util::{get_text, AsyncHttpClient},
};
use crate::utils::NonEmptyVec;

pub mod error;
pub mod grants;
pub mod matcher;

pub use error::CredentialOfferRequestError;

/// A Credential Offer, passed by value or by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialOfferRequest {
    #[serde(rename = "credential_offer")]
    PassByValue(String),
    #[serde(rename = "credential_offer_uri")]
    PassByReference(Url),
}

/// Query parameters of a credential offer URL.
#[derive(Serialize, Deserialize)]
struct CredentialOfferQuery {
    #[serde(flatten)]
    request: CredentialOfferRequest,
}

impl CredentialOfferRequest {
    /// Parse from a credential offer [Url], e.g. `openid-credential-offer://?credential_offer=...`.
    /// ```
    /// # use openid4vci::core::credential_offer::CredentialOfferRequest;
    /// # use url::Url;
    /// let url: Url = "openid-credential-offer://?credential_offer_uri=https%3A%2F%2Fissuer.example%2Foffer%2F1"
    ///     .parse()
    ///     .unwrap();
    ///
    /// let request = CredentialOfferRequest::from_url(&url).unwrap();
    ///
    /// let CredentialOfferRequest::PassByReference(uri) = request else {
    ///     panic!("expected credential offer by reference")
    /// };
    /// assert_eq!(uri.as_str(), "https://issuer.example/offer/1");
    /// ```
    pub fn from_url(url: &Url) -> Result<Self, CredentialOfferRequestError> {
        let query = url.query().ok_or_else(|| {
            CredentialOfferRequestError::NonParseableCredentialOffer(anyhow!(
                "missing query params in credential offer url"
            ))
        })?;
        Self::from_query_params(query)
    }

    /// Parse from urlencoded query parameters.
    /// ```
    /// # use openid4vci::core::credential_offer::CredentialOfferRequest;
    /// let request = CredentialOfferRequest::from_query_params("credential_offer=%7B%7D").unwrap();
    ///
    /// assert_eq!(request, CredentialOfferRequest::PassByValue("{}".into()));
    /// ```
    pub fn from_query_params(query_params: &str) -> Result<Self, CredentialOfferRequestError> {
        serde_urlencoded::from_str::<CredentialOfferQuery>(query_params)
            .map(|query| query.request)
            .context("unable to parse credential offer from query params")
            .map_err(CredentialOfferRequestError::NonParseableCredentialOffer)
    }

    /// Encode as [Url], using `base` (e.g. `openid-credential-offer://`) as a base.
    pub fn to_url(self, mut base: Url) -> anyhow::Result<Url> {
        let query = serde_urlencoded::to_string(CredentialOfferQuery { request: self })?;
        base.set_query(Some(&query));
        Ok(base)
    }

    /// The offer payload, fetched when passed by reference.
    pub async fn fetch<H: AsyncHttpClient + Sync + ?Sized>(
        self,
        http_client: &H,
        max_size: usize,
    ) -> Result<String, CredentialOfferRequestError> {
        match self {
            Self::PassByValue(offer) => Ok(offer),
            Self::PassByReference(uri) => {
                debug!("fetching credential offer from {uri}");
                get_text(http_client, &uri, Some(max_size))
                    .await
                    .context("failed to fetch credential offer")
                    .map_err(CredentialOfferRequestError::UnableToFetchCredentialOffer)
            }
        }
    }
}

/// Wire representation of a Credential Offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialOfferObject {
    pub credential_issuer: String,
    pub credentials: Vec<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grants: Option<Json>,
}

impl CredentialOfferObject {
    pub fn from_json_str(offer: &str) -> Result<Self, CredentialOfferRequestError> {
        serde_json::from_str(offer)
            .context("credential offer is not a valid JSON credential offer object")
            .map_err(CredentialOfferRequestError::NonParseableCredentialOffer)
    }

    pub fn credential_issuer_id(&self) -> Result<CredentialIssuerId, CredentialOfferRequestError> {
        self.credential_issuer
            .parse()
            .map_err(CredentialOfferRequestError::InvalidCredentialIssuerId)
    }
}

/// Credential definition of an offered `jwt_vc_json` credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedJwtDefinition {
    #[serde(rename = "type")]
    pub r#type: Vec<String>,
}

/// Credential definition of an offered JSON-LD credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonLdDefinition {
    #[serde(rename = "@context")]
    pub context: Vec<ContextUri>,
    #[serde(rename = "type")]
    pub r#type: Vec<String>,
}

/// An offered credential, resolved against the Credential Issuer's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialMetadata {
    /// Offered by scope; the catalog entry is looked up again when requesting the credential.
    ByScope(String),
    MsoMdoc {
        doctype: String,
        scope: Option<String>,
    },
    SignedJwt {
        credential_definition: SignedJwtDefinition,
        scope: Option<String>,
    },
    JsonLdSignedJwt {
        credential_definition: JsonLdDefinition,
        scope: Option<String>,
    },
    JsonLdDataIntegrity {
        credential_definition: JsonLdDefinition,
        scope: Option<String>,
    },
}

impl CredentialMetadata {
    /// The credential format, unknown until request time for [CredentialMetadata::ByScope].
    pub fn format(&self) -> Option<CredentialFormat> {
        match self {
            Self::ByScope(_) => None,
            Self::MsoMdoc { .. } => Some(CredentialFormat::MsoMdoc),
            Self::SignedJwt { .. } => Some(CredentialFormat::JwtVcJson),
            Self::JsonLdSignedJwt { .. } => Some(CredentialFormat::JwtVcJsonLd),
            Self::JsonLdDataIntegrity { .. } => Some(CredentialFormat::LdpVc),
        }
    }

    pub fn scope(&self) -> Option<&str> {
        match self {
            Self::ByScope(scope) => Some(scope),
            Self::MsoMdoc { scope, .. }
            | Self::SignedJwt { scope, .. }
            | Self::JsonLdSignedJwt { scope, .. }
            | Self::JsonLdDataIntegrity { scope, .. } => scope.as_deref(),
        }
    }

    /// First catalog entry this credential refers to.
    pub fn credential_supported<'a>(
        &self,
        catalog: &'a [CredentialSupported],
    ) -> Option<&'a CredentialSupported> {
        catalog.iter().find(|supported| self.identifies(supported))
    }

    /// Whether `supported` has the same format and identity as this credential.
    pub(crate) fn identifies(&self, supported: &CredentialSupported) -> bool {
        match (self, supported) {
            (Self::ByScope(scope), supported) => supported.scope() == Some(scope.as_str()),
            (Self::MsoMdoc { doctype, .. }, CredentialSupported::MsoMdoc(entry)) => {
                &entry.doctype == doctype
            }
            (
                Self::SignedJwt {
                    credential_definition,
                    ..
                },
                CredentialSupported::SignedJwt(entry),
            ) => entry.credential_definition.r#type == credential_definition.r#type,
            (
                Self::JsonLdSignedJwt {
                    credential_definition,
                    ..
                },
                CredentialSupported::JsonLdSignedJwt(entry),
            )
            | (
                Self::JsonLdDataIntegrity {
                    credential_definition,
                    ..
                },
                CredentialSupported::JsonLdDataIntegrity(entry),
            ) => {
                entry.credential_definition.r#type == credential_definition.r#type
                    && entry.credential_definition.context == credential_definition.context
            }
            _ => false,
        }
    }

    /// Human readable identity, used in diagnostics.
    pub(crate) fn definition(&self) -> String {
        match self {
            Self::ByScope(scope) => scope.clone(),
            Self::MsoMdoc { doctype, .. } => doctype.clone(),
            Self::SignedJwt {
                credential_definition,
                ..
            } => serde_json::to_string(credential_definition).unwrap_or_default(),
            Self::JsonLdSignedJwt {
                credential_definition,
                ..
            }
            | Self::JsonLdDataIntegrity {
                credential_definition,
                ..
            } => serde_json::to_string(credential_definition).unwrap_or_default(),
        }
    }

    pub(crate) fn with_scope(self, scope: Option<String>) -> Self {
        match self {
            Self::ByScope(_) => self,
            Self::MsoMdoc { doctype, .. } => Self::MsoMdoc { doctype, scope },
            Self::SignedJwt {
                credential_definition,
                ..
            } => Self::SignedJwt {
                credential_definition,
                scope,
            },
            Self::JsonLdSignedJwt {
                credential_definition,
                ..
            } => Self::JsonLdSignedJwt {
                credential_definition,
                scope,
            },
            Self::JsonLdDataIntegrity {
                credential_definition,
                ..
            } => Self::JsonLdDataIntegrity {
                credential_definition,
                scope,
            },
        }
    }
}

/// A resolved and validated Credential Offer.
///
/// Only produced by [CredentialOfferResolver](crate::resolver::CredentialOfferResolver).
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialOffer {
    credential_issuer: CredentialIssuerId,
    credential_issuer_metadata: CredentialIssuerMetadata,
    authorization_server_metadata: AuthorizationServerMetadata,
    credentials: NonEmptyVec<CredentialMetadata>,
    grants: Option<Grants>,
}

impl CredentialOffer {
    pub(crate) fn new(
        credential_issuer: CredentialIssuerId,
        credential_issuer_metadata: CredentialIssuerMetadata,
        authorization_server_metadata: AuthorizationServerMetadata,
        credentials: NonEmptyVec<CredentialMetadata>,
        grants: Option<Grants>,
    ) -> Self {
        Self {
            credential_issuer,
            credential_issuer_metadata,
            authorization_server_metadata,
            credentials,
            grants,
        }
    }

    pub fn credential_issuer(&self) -> &CredentialIssuerId {
        &self.credential_issuer
    }

    pub fn credential_issuer_metadata(&self) -> &CredentialIssuerMetadata {
        &self.credential_issuer_metadata
    }

    pub fn authorization_server_metadata(&self) -> &AuthorizationServerMetadata {
        &self.authorization_server_metadata
    }

    pub fn credentials(&self) -> &NonEmptyVec<CredentialMetadata> {
        &self.credentials
    }

    pub fn grants(&self) -> Option<&Grants> {
        self.grants.as_ref()
    }

    /// The offered grants, or the `authorization_code` grant without issuer state when the offer
    /// specified none.
    pub fn grants_or_default(&self) -> Grants {
        self.grants
            .clone()
            .unwrap_or_else(|| Grants::AuthorizationCode(AuthorizationCode::default()))
    }
}
