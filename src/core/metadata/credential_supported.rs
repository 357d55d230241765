use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as Json};
use url::Url;

use crate::core::credential_format::CredentialFormat;

/// An entry of the Credential Issuer's `credentials_supported` catalog.
///
/// The `format` member selects the variant. Entries with a format this library does not know
/// are kept as [CredentialSupported::Unknown], with their common members (notably `scope`), so
/// they can still be offered by scope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Json")]
pub enum CredentialSupported {
    MsoMdoc(MsoMdocCredentialSupported),
    SignedJwt(SignedJwtCredentialSupported),
    JsonLdSignedJwt(JsonLdCredentialSupported),
    JsonLdDataIntegrity(JsonLdCredentialSupported),
    Unknown(UnknownCredentialSupported),
}

impl CredentialSupported {
    pub fn format(&self) -> Option<CredentialFormat> {
        match self {
            Self::MsoMdoc(_) => Some(CredentialFormat::MsoMdoc),
            Self::SignedJwt(_) => Some(CredentialFormat::JwtVcJson),
            Self::JsonLdSignedJwt(_) => Some(CredentialFormat::JwtVcJsonLd),
            Self::JsonLdDataIntegrity(_) => Some(CredentialFormat::LdpVc),
            Self::Unknown(_) => None,
        }
    }

    /// Fields shared by every format.
    pub fn common(&self) -> &CredentialSupportedCommon {
        match self {
            Self::MsoMdoc(c) => &c.common,
            Self::SignedJwt(c) => &c.common,
            Self::JsonLdSignedJwt(c) | Self::JsonLdDataIntegrity(c) => &c.common,
            Self::Unknown(c) => &c.common,
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.common().scope.as_deref()
    }
}

/// Entries of the formats in [CredentialFormat], tagged by `format`.
#[derive(Deserialize)]
#[serde(tag = "format")]
enum KnownCredentialSupported {
    #[serde(rename = "mso_mdoc")]
    MsoMdoc(MsoMdocCredentialSupported),
    #[serde(rename = "jwt_vc_json")]
    SignedJwt(SignedJwtCredentialSupported),
    #[serde(rename = "jwt_vc_json-ld")]
    JsonLdSignedJwt(JsonLdCredentialSupported),
    #[serde(rename = "ldp_vc")]
    JsonLdDataIntegrity(JsonLdCredentialSupported),
}

#[derive(Serialize)]
#[serde(tag = "format")]
enum KnownCredentialSupportedRef<'a> {
    #[serde(rename = "mso_mdoc")]
    MsoMdoc(&'a MsoMdocCredentialSupported),
    #[serde(rename = "jwt_vc_json")]
    SignedJwt(&'a SignedJwtCredentialSupported),
    #[serde(rename = "jwt_vc_json-ld")]
    JsonLdSignedJwt(&'a JsonLdCredentialSupported),
    #[serde(rename = "ldp_vc")]
    JsonLdDataIntegrity(&'a JsonLdCredentialSupported),
}

impl TryFrom<Json> for CredentialSupported {
    type Error = serde_json::Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        let known = value
            .get("format")
            .and_then(Json::as_str)
            .is_some_and(|format| format.parse::<CredentialFormat>().is_ok());

        if !known {
            return serde_json::from_value(value).map(Self::Unknown);
        }

        Ok(match serde_json::from_value(value)? {
            KnownCredentialSupported::MsoMdoc(c) => Self::MsoMdoc(c),
            KnownCredentialSupported::SignedJwt(c) => Self::SignedJwt(c),
            KnownCredentialSupported::JsonLdSignedJwt(c) => Self::JsonLdSignedJwt(c),
            KnownCredentialSupported::JsonLdDataIntegrity(c) => Self::JsonLdDataIntegrity(c),
        })
    }
}

impl Serialize for CredentialSupported {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::MsoMdoc(c) => KnownCredentialSupportedRef::MsoMdoc(c).serialize(serializer),
            Self::SignedJwt(c) => KnownCredentialSupportedRef::SignedJwt(c).serialize(serializer),
            Self::JsonLdSignedJwt(c) => {
                KnownCredentialSupportedRef::JsonLdSignedJwt(c).serialize(serializer)
            }
            Self::JsonLdDataIntegrity(c) => {
                KnownCredentialSupportedRef::JsonLdDataIntegrity(c).serialize(serializer)
            }
            Self::Unknown(c) => c.serialize(serializer),
        }
    }
}

/// Catalog entry of a format without a matching strategy, e.g. `vc+sd-jwt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownCredentialSupported {
    pub format: String,
    #[serde(flatten)]
    pub common: CredentialSupportedCommon,
    /// Format specific members.
    #[serde(flatten)]
    pub other: Map<String, Json>,
}

/// Fields common to all catalog entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialSupportedCommon {
    /// OAuth 2.0 scope value that can be used to request this credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// How the credential can be bound to a key or identifier, e.g. `jwk`, `cose_key`, `did:key`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cryptographic_binding_methods_supported: Vec<String>,
    /// Algorithms or suites the issuer uses to secure the credential.
    #[serde(
        default,
        alias = "credential_signing_alg_values_supported",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cryptographic_suites_supported: Vec<String>,
    /// Key proof types the issuer accepts, e.g. `jwt`, `cwt`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proof_types_supported: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub display: Vec<CredentialDisplay>,
}

/// Display properties of a supported credential for a given locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialDisplay {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    #[serde(alias = "uri")]
    pub url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsoMdocCredentialSupported {
    #[serde(flatten)]
    pub common: CredentialSupportedCommon,
    #[serde(alias = "docType")]
    pub doctype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Json>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedJwtCredentialSupported {
    #[serde(flatten)]
    pub common: CredentialSupportedCommon,
    pub credential_definition: CredentialDefinition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
}

/// Catalog entry for the JSON-LD formats, `jwt_vc_json-ld` and `ldp_vc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonLdCredentialSupported {
    #[serde(flatten)]
    pub common: CredentialSupportedCommon,
    pub credential_definition: JsonLdCredentialDefinition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
}

/// Credential definition of a `jwt_vc_json` credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDefinition {
    #[serde(rename = "type")]
    pub r#type: Vec<String>,
    #[serde(
        default,
        rename = "credentialSubject",
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_subject: Option<Json>,
}

/// Credential definition of a JSON-LD credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonLdCredentialDefinition {
    #[serde(rename = "@context")]
    pub context: Vec<ContextUri>,
    #[serde(rename = "type")]
    pub r#type: Vec<String>,
    #[serde(
        default,
        rename = "credentialSubject",
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_subject: Option<Json>,
}

/// An `@context` entry.
///
/// Must parse as a URL, but is kept verbatim: entries are compared as strings, so
/// `https://example.com` and `https://example.com/` are different contexts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContextUri(String);

impl ContextUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContextUri {
    type Error = url::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Url::parse(&value)?;
        Ok(Self(value))
    }
}

impl From<ContextUri> for String {
    fn from(value: ContextUri) -> Self {
        value.0
    }
}
