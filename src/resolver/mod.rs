use std::{fmt::Debug, sync::Arc};

use anyhow::{bail, Result};
use tracing::debug;
use url::Url;

use crate::{
    config::Config,
    core::{
        credential_format::FormatRegistry,
        credential_offer::{
            grants::Grants, matcher::match_credentials, CredentialOffer, CredentialOfferObject,
            CredentialOfferRequest, CredentialOfferRequestError,
        },
        metadata::resolver::{
            AuthorizationServerMetadataResolver, CredentialIssuerMetadataResolver,
            HttpMetadataResolver,
        },
        util::AsyncHttpClient,
    },
};

/// Resolves Credential Offers into validated [CredentialOffer]s.
///
/// Holds no per-offer state: a single resolver can serve concurrent resolutions.
#[derive(Clone)]
pub struct CredentialOfferResolver {
    http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
    credential_issuer_metadata_resolver: Arc<dyn CredentialIssuerMetadataResolver + Send + Sync>,
    authorization_server_metadata_resolver:
        Arc<dyn AuthorizationServerMetadataResolver + Send + Sync>,
    formats: FormatRegistry,
    config: Config,
}

impl Debug for CredentialOfferResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialOfferResolver")
            .field("formats", &self.formats)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CredentialOfferResolver {
    /// Build a new resolver.
    pub fn builder() -> CredentialOfferResolverBuilder {
        CredentialOfferResolverBuilder::default()
    }

    /// Resolve a credential offer URL, e.g. `openid-credential-offer://?credential_offer_uri=...`.
    pub async fn resolve_url(
        &self,
        url: &Url,
    ) -> Result<CredentialOffer, CredentialOfferRequestError> {
        self.resolve(CredentialOfferRequest::from_url(url)?).await
    }

    /// Resolve a Credential Offer.
    ///
    /// The offer is fetched (if passed by reference) and parsed, the Credential Issuer and
    /// Authorization Server metadata are resolved, then every offered credential is matched
    /// against the issuer's catalog and the grants are normalized. The first failing stage aborts
    /// the resolution.
    pub async fn resolve(
        &self,
        request: CredentialOfferRequest,
    ) -> Result<CredentialOffer, CredentialOfferRequestError> {
        let offer = request
            .fetch(self.http_client.as_ref(), self.config.max_offer_size)
            .await?;
        let offer = CredentialOfferObject::from_json_str(&offer)?;
        let credential_issuer = offer.credential_issuer_id()?;
        let CredentialOfferObject {
            credentials,
            grants,
            ..
        } = offer;

        let credential_issuer_metadata = self
            .credential_issuer_metadata_resolver
            .resolve_credential_issuer_metadata(&credential_issuer)
            .await
            .map_err(CredentialOfferRequestError::UnableToResolveCredentialIssuerMetadata)?;
        debug!("resolved credential issuer metadata for {credential_issuer}");

        let authorization_server = credential_issuer_metadata.authorization_server();
        let authorization_server_metadata = self
            .authorization_server_metadata_resolver
            .resolve_authorization_server_metadata(authorization_server)
            .await
            .map_err(CredentialOfferRequestError::UnableToResolveAuthorizationServerMetadata)?;
        debug!("resolved authorization server metadata for {authorization_server}");

        let credentials = match_credentials(
            &credentials,
            &credential_issuer_metadata.credentials_supported,
            &self.formats,
        )
        .map_err(CredentialOfferRequestError::InvalidCredentials)?;

        let grants =
            Grants::from_json(grants).map_err(CredentialOfferRequestError::InvalidGrants)?;

        Ok(CredentialOffer::new(
            credential_issuer,
            credential_issuer_metadata,
            authorization_server_metadata,
            credentials,
            grants,
        ))
    }
}

/// Builder struct for [CredentialOfferResolver].
#[derive(Clone, Default)]
pub struct CredentialOfferResolverBuilder {
    http_client: Option<Arc<dyn AsyncHttpClient + Send + Sync>>,
    credential_issuer_metadata_resolver:
        Option<Arc<dyn CredentialIssuerMetadataResolver + Send + Sync>>,
    authorization_server_metadata_resolver:
        Option<Arc<dyn AuthorizationServerMetadataResolver + Send + Sync>>,
    formats: Option<FormatRegistry>,
    config: Config,
}

impl CredentialOfferResolverBuilder {
    /// Build the resolver.
    ///
    /// Metadata resolvers that were not set fetch metadata from the well-known locations using
    /// the HTTP client.
    pub fn build(self) -> Result<CredentialOfferResolver> {
        let Self {
            http_client,
            credential_issuer_metadata_resolver,
            authorization_server_metadata_resolver,
            formats,
            config,
        } = self;

        let Some(http_client) = http_client else {
            bail!("http client is required, see `with_http_client`")
        };

        let http_metadata_resolver = Arc::new(HttpMetadataResolver::new(
            http_client.clone(),
            config.clone(),
        ));

        let credential_issuer_metadata_resolver: Arc<
            dyn CredentialIssuerMetadataResolver + Send + Sync,
        > = match credential_issuer_metadata_resolver {
            Some(resolver) => resolver,
            None => http_metadata_resolver.clone(),
        };

        let authorization_server_metadata_resolver: Arc<
            dyn AuthorizationServerMetadataResolver + Send + Sync,
        > = match authorization_server_metadata_resolver {
            Some(resolver) => resolver,
            None => http_metadata_resolver,
        };

        Ok(CredentialOfferResolver {
            credential_issuer_metadata_resolver,
            authorization_server_metadata_resolver,
            http_client,
            formats: formats.unwrap_or_default(),
            config,
        })
    }

    /// Set the HTTP client used to fetch offers passed by reference.
    pub fn with_http_client(
        mut self,
        http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
    ) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_credential_issuer_metadata_resolver(
        mut self,
        resolver: Arc<dyn CredentialIssuerMetadataResolver + Send + Sync>,
    ) -> Self {
        self.credential_issuer_metadata_resolver = Some(resolver);
        self
    }

    pub fn with_authorization_server_metadata_resolver(
        mut self,
        resolver: Arc<dyn AuthorizationServerMetadataResolver + Send + Sync>,
    ) -> Self {
        self.authorization_server_metadata_resolver = Some(resolver);
        self
    }

    /// Replace the [FormatRegistry] used to match offered credentials.
    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = Some(formats);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;
    use http::{Request, Response};

    use super::*;

    struct NoHttp;

    #[async_trait]
    impl AsyncHttpClient for NoHttp {
        async fn execute(&self, _: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
            bail!("network access is disabled")
        }
    }

    #[test]
    fn http_client_is_required() {
        assert!(CredentialOfferResolver::builder().build().is_err());
        assert!(CredentialOfferResolver::builder()
            .with_http_client(Arc::new(NoHttp))
            .build()
            .is_ok());
    }

    #[tokio::test]
    async fn invalid_issuer_id_fails_before_network() {
        let resolver = CredentialOfferResolver::builder()
            .with_http_client(Arc::new(NoHttp))
            .build()
            .unwrap();
        let err = resolver
            .resolve(CredentialOfferRequest::PassByValue(
                r#"{"credential_issuer":"not a url","credentials":["PID_mso_mdoc"]}"#.into(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CredentialOfferRequestError::InvalidCredentialIssuerId(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_offer_uri() {
        let resolver = CredentialOfferResolver::builder()
            .with_http_client(Arc::new(NoHttp))
            .build()
            .unwrap();
        let err = resolver
            .resolve(CredentialOfferRequest::PassByReference(
                "https://issuer.example/offer/1".parse().unwrap(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CredentialOfferRequestError::UnableToFetchCredentialOffer(_)
        ));
        assert!(format!("{err}").contains("network access is disabled"));
    }
}
