use serde::Deserialize;
use url::Url;

/// Settings for [CredentialOfferResolver](crate::resolver::CredentialOfferResolver) and the
/// HTTP metadata resolver.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Path appended to the Credential Issuer Identifier to locate its metadata.
    pub credential_issuer_metadata_path: String,
    /// Well-known paths tried, in order, to locate Authorization Server metadata.
    ///
    /// Each path is inserted between the host and the path of the server identifier (RFC 8414).
    pub authorization_server_metadata_paths: Vec<String>,
    /// Upper bound, in bytes, for a Credential Offer passed by reference.
    ///
    /// Enforced once the HTTP client has returned the body, so it rejects oversized offers but
    /// does not stop them from being downloaded.
    pub max_offer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credential_issuer_metadata_path: ".well-known/openid-credential-issuer".into(),
            authorization_server_metadata_paths: vec![
                ".well-known/oauth-authorization-server".into(),
                ".well-known/openid-configuration".into(),
            ],
            max_offer_size: 64 * 1024,
        }
    }
}

/// A url that is always a base (can be safely join()'ed with further path elements without
/// mangling).
#[derive(Deserialize, Debug, Clone, Hash, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct BaseUrl(Url);

impl std::ops::Deref for BaseUrl {
    type Target = Url;

    fn deref(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = url::ParseError;

    fn try_from(mut url: String) -> Result<Self, Self::Error> {
        // Make URL a base.
        if !url.ends_with('/') {
            url += "/"
        }
        url.parse().map(Self)
    }
}

impl From<&Url> for BaseUrl {
    fn from(url: &Url) -> Self {
        let mut url = url.clone();
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Self(url)
    }
}
