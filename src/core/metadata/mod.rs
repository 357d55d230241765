use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use url::Url;

use self::credential_supported::CredentialSupported;

pub mod authorization_server;
pub mod credential_supported;
pub mod parameters;
pub mod resolver;

pub use authorization_server::AuthorizationServerMetadata;

/// The Credential Issuer Identifier.
///
/// An absolute `https` URL without query or fragment components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialIssuerId(Url);

#[derive(Debug, thiserror::Error)]
pub enum CredentialIssuerIdError {
    #[error("not an absolute URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("scheme must be https, found `{0}`")]
    NotHttps(String),

    #[error("must not contain a query component")]
    HasQuery,

    #[error("must not contain a fragment component")]
    HasFragment,
}

impl CredentialIssuerId {
    pub fn new(url: Url) -> Result<Self, CredentialIssuerIdError> {
        if url.scheme() != "https" {
            return Err(CredentialIssuerIdError::NotHttps(url.scheme().to_owned()));
        }
        if url.query().is_some() {
            return Err(CredentialIssuerIdError::HasQuery);
        }
        if url.fragment().is_some() {
            return Err(CredentialIssuerIdError::HasFragment);
        }
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for CredentialIssuerId {
    type Err = CredentialIssuerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(Url::parse(s)?)
    }
}

impl TryFrom<String> for CredentialIssuerId {
    type Error = CredentialIssuerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CredentialIssuerId> for String {
    fn from(value: CredentialIssuerId) -> Self {
        value.0.into()
    }
}

impl fmt::Display for CredentialIssuerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Credential Issuer metadata, as published at its well-known location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialIssuerMetadata {
    pub credential_issuer: CredentialIssuerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_servers: Option<Vec<Url>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_server: Option<Url>,
    pub credential_endpoint: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_credential_endpoint: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deferred_credential_endpoint: Option<Url>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credential_response_encryption_alg_values_supported: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credential_response_encryption_enc_values_supported: Vec<String>,
    #[serde(default)]
    pub require_credential_response_encryption: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub display: Vec<IssuerDisplay>,
    pub credentials_supported: Vec<CredentialSupported>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerDisplay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl CredentialIssuerMetadata {
    /// Identifier of the Authorization Server that issues access tokens for this issuer.
    ///
    /// When the metadata names no Authorization Server the Credential Issuer acts as one.
    pub fn authorization_server(&self) -> &Url {
        self.authorization_servers
            .as_ref()
            .and_then(|servers| servers.first())
            .or(self.authorization_server.as_ref())
            .unwrap_or(self.credential_issuer.as_url())
    }

    /// First catalog entry with the given `scope`.
    pub fn credential_supported_by_scope(&self, scope: &str) -> Option<&CredentialSupported> {
        self.credentials_supported
            .iter()
            .find(|supported| supported.scope() == Some(scope))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn issuer_id_rules() {
        assert!("https://issuer.example".parse::<CredentialIssuerId>().is_ok());
        assert!("https://issuer.example/tenant/1"
            .parse::<CredentialIssuerId>()
            .is_ok());
        assert!(matches!(
            "not a url".parse::<CredentialIssuerId>(),
            Err(CredentialIssuerIdError::Parse(_))
        ));
        assert!(matches!(
            "http://issuer.example".parse::<CredentialIssuerId>(),
            Err(CredentialIssuerIdError::NotHttps(scheme)) if scheme == "http"
        ));
        assert!(matches!(
            "https://issuer.example?tenant=1".parse::<CredentialIssuerId>(),
            Err(CredentialIssuerIdError::HasQuery)
        ));
        assert!(matches!(
            "https://issuer.example#x".parse::<CredentialIssuerId>(),
            Err(CredentialIssuerIdError::HasFragment)
        ));
    }

    fn metadata(extra: serde_json::Value) -> CredentialIssuerMetadata {
        let mut value = json!({
            "credential_issuer": "https://issuer.example",
            "credential_endpoint": "https://issuer.example/credential",
            "credentials_supported": [
                { "format": "mso_mdoc", "scope": "PID_mso_mdoc", "doctype": "eu.europa.ec.eudiw.pid.1" },
                { "format": "mso_mdoc", "scope": "PID_mso_mdoc", "doctype": "second" }
            ]
        });
        value
            .as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn authorization_server_selection() {
        assert_eq!(
            metadata(json!({})).authorization_server().as_str(),
            "https://issuer.example/"
        );
        assert_eq!(
            metadata(json!({ "authorization_server": "https://as.example" }))
                .authorization_server()
                .as_str(),
            "https://as.example/"
        );
        assert_eq!(
            metadata(json!({
                "authorization_server": "https://as.example",
                "authorization_servers": ["https://first.example", "https://second.example"]
            }))
            .authorization_server()
            .as_str(),
            "https://first.example/"
        );
    }

    #[test]
    fn scope_lookup_takes_first_entry() {
        let metadata = metadata(json!({}));
        let Some(CredentialSupported::MsoMdoc(mdoc)) =
            metadata.credential_supported_by_scope("PID_mso_mdoc")
        else {
            panic!("expected mso_mdoc entry")
        };
        assert_eq!(mdoc.doctype, "eu.europa.ec.eudiw.pid.1");
        assert!(metadata.credential_supported_by_scope("unknown").is_none());
    }
}
