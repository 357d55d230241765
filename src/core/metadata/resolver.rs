use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{AuthorizationServerMetadata, CredentialIssuerId, CredentialIssuerMetadata};
use crate::{
    config::{BaseUrl, Config},
    core::util::{get_text, AsyncHttpClient},
};

/// Source of Credential Issuer metadata.
#[async_trait]
pub trait CredentialIssuerMetadataResolver {
    async fn resolve_credential_issuer_metadata(
        &self,
        credential_issuer: &CredentialIssuerId,
    ) -> Result<CredentialIssuerMetadata>;
}

/// Source of OAuth 2.0 Authorization Server metadata.
#[async_trait]
pub trait AuthorizationServerMetadataResolver {
    async fn resolve_authorization_server_metadata(
        &self,
        authorization_server: &Url,
    ) -> Result<AuthorizationServerMetadata>;
}

/// Resolves both kinds of metadata from their well-known locations.
#[derive(Clone)]
pub struct HttpMetadataResolver {
    http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
    config: Config,
}

impl std::fmt::Debug for HttpMetadataResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetadataResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpMetadataResolver {
    pub fn new(http_client: Arc<dyn AsyncHttpClient + Send + Sync>, config: Config) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// `<credential_issuer>/<credential_issuer_metadata_path>`
    pub fn credential_issuer_metadata_url(
        &self,
        credential_issuer: &CredentialIssuerId,
    ) -> Result<Url> {
        BaseUrl::from(credential_issuer.as_url())
            .join(&self.config.credential_issuer_metadata_path)
            .context("unable to build credential issuer metadata url")
    }

    /// Candidate metadata locations, with each configured well-known path inserted between the
    /// host and the path of `authorization_server`.
    pub fn authorization_server_metadata_urls(&self, authorization_server: &Url) -> Vec<Url> {
        let path = authorization_server.path().trim_matches('/');
        self.config
            .authorization_server_metadata_paths
            .iter()
            .map(|well_known| {
                let mut url = authorization_server.clone();
                let well_known = well_known.trim_matches('/');
                if path.is_empty() {
                    url.set_path(well_known);
                } else {
                    url.set_path(&format!("{well_known}/{path}"));
                }
                url
            })
            .collect()
    }
}

#[async_trait]
impl CredentialIssuerMetadataResolver for HttpMetadataResolver {
    async fn resolve_credential_issuer_metadata(
        &self,
        credential_issuer: &CredentialIssuerId,
    ) -> Result<CredentialIssuerMetadata> {
        let url = self.credential_issuer_metadata_url(credential_issuer)?;
        debug!("fetching credential issuer metadata from {url}");

        let body = get_text(self.http_client.as_ref(), &url, None).await?;
        let metadata: CredentialIssuerMetadata = serde_json::from_str(&body)
            .context(format!("failed to parse credential issuer metadata from {url}"))?;

        if &metadata.credential_issuer != credential_issuer {
            bail!(
                "credential issuer metadata is for a different issuer: expected '{credential_issuer}', received '{}'",
                metadata.credential_issuer
            )
        }

        Ok(metadata)
    }
}

#[async_trait]
impl AuthorizationServerMetadataResolver for HttpMetadataResolver {
    async fn resolve_authorization_server_metadata(
        &self,
        authorization_server: &Url,
    ) -> Result<AuthorizationServerMetadata> {
        let mut failure = None;

        for url in self.authorization_server_metadata_urls(authorization_server) {
            debug!("fetching authorization server metadata from {url}");

            let attempt = async {
                let body = get_text(self.http_client.as_ref(), &url, None).await?;
                serde_json::from_str::<AuthorizationServerMetadata>(&body).context(format!(
                    "failed to parse authorization server metadata from {url}"
                ))
            };

            match attempt.await {
                Ok(metadata) => {
                    if metadata.issuer() != authorization_server {
                        bail!(
                            "authorization server metadata is for a different issuer: expected '{authorization_server}', received '{}'",
                            metadata.issuer()
                        )
                    }
                    return Ok(metadata);
                }
                Err(e) => {
                    debug!("no authorization server metadata at {url}: {e:#}");
                    failure = Some(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => bail!("no authorization server metadata location is configured"),
        }
    }
}
