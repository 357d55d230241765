use core::fmt;
use std::{collections::HashMap, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::{
    credential_offer::{
        matcher::{
            CredentialMatchError, JsonLdDataIntegrityMatcher, JsonLdSignedJwtMatcher,
            MsoMdocMatcher, SignedJwtMatcher,
        },
        CredentialMetadata,
    },
    metadata::credential_supported::CredentialSupported,
};

pub const FORMAT_MSO_MDOC: &str = "mso_mdoc";
pub const FORMAT_JWT_VC_JSON: &str = "jwt_vc_json";
pub const FORMAT_JWT_VC_JSON_LD: &str = "jwt_vc_json-ld";
pub const FORMAT_LDP_VC: &str = "ldp_vc";

/// The credential formats understood by this library.
///
/// Each format identifies credentials differently:
/// - `mso_mdoc` by `doctype`,
/// - `jwt_vc_json` by the `type` of its `credential_definition`,
/// - `jwt_vc_json-ld` and `ldp_vc` by the `type` and `@context` of its `credential_definition`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CredentialFormat {
    /// ISO/IEC 18013-5 mobile document.
    MsoMdoc,
    /// W3C Verifiable Credential signed as a JWT, not using JSON-LD.
    JwtVcJson,
    /// W3C Verifiable Credential signed as a JWT, using JSON-LD.
    JwtVcJsonLd,
    /// W3C Verifiable Credential secured with Data Integrity, using JSON-LD.
    LdpVc,
}

impl CredentialFormat {
    pub const ALL: [CredentialFormat; 4] = [
        Self::MsoMdoc,
        Self::JwtVcJson,
        Self::JwtVcJsonLd,
        Self::LdpVc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MsoMdoc => FORMAT_MSO_MDOC,
            Self::JwtVcJson => FORMAT_JWT_VC_JSON,
            Self::JwtVcJsonLd => FORMAT_JWT_VC_JSON_LD,
            Self::LdpVc => FORMAT_LDP_VC,
        }
    }
}

impl fmt::Display for CredentialFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| format!("unknown credential format: {s}"))
    }
}

impl TryFrom<String> for CredentialFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CredentialFormat> for String {
    fn from(value: CredentialFormat) -> Self {
        value.as_str().to_owned()
    }
}

/// Strategy resolving one offered credential object of a given format against an issuer's
/// catalog.
pub trait FormatMatcher: fmt::Debug + Send + Sync {
    /// The `format` value this strategy handles.
    fn format(&self) -> &str;

    /// Match the offered credential object (including its `format` member) against the catalog.
    ///
    /// The first catalog entry that matches wins.
    fn match_credential(
        &self,
        offered: &Json,
        catalog: &[CredentialSupported],
    ) -> Result<CredentialMetadata, CredentialMatchError>;
}

/// Mapping from a `format` value to the [FormatMatcher] handling it.
///
/// The [Default] registry handles every [CredentialFormat].
#[derive(Debug, Clone)]
pub struct FormatRegistry(HashMap<String, Arc<dyn FormatMatcher>>);

impl FormatRegistry {
    /// A registry without any format.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Register a strategy, replacing any strategy previously registered for the same format.
    pub fn register(&mut self, matcher: impl FormatMatcher + 'static) -> &mut Self {
        self.0.insert(matcher.format().to_owned(), Arc::new(matcher));
        self
    }

    pub fn get(&self, format: &str) -> Option<&dyn FormatMatcher> {
        self.0.get(format).map(|matcher| &**matcher)
    }

    pub fn supports(&self, format: &str) -> bool {
        self.0.contains_key(format)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(MsoMdocMatcher)
            .register(SignedJwtMatcher)
            .register(JsonLdSignedJwtMatcher)
            .register(JsonLdDataIntegrityMatcher);
        registry
    }
}
