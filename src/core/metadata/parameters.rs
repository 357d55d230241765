//! Typed members of OAuth 2.0 Authorization Server metadata ([RFC 8414]).
//!
//! [RFC 8414]: <https://www.rfc-editor.org/rfc/rfc8414#section-2>

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::object::TypedParameter;

/// `issuer`: the Authorization Server identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Issuer(pub Url);

impl TypedParameter for Issuer {
    const KEY: &'static str = "issuer";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenEndpoint(pub Url);

impl TypedParameter for TokenEndpoint {
    const KEY: &'static str = "token_endpoint";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationEndpoint(pub Url);

impl TypedParameter for AuthorizationEndpoint {
    const KEY: &'static str = "authorization_endpoint";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushedAuthorizationRequestEndpoint(pub Url);

impl TypedParameter for PushedAuthorizationRequestEndpoint {
    const KEY: &'static str = "pushed_authorization_request_endpoint";
}

/// `grant_types_supported`, defaulting to `authorization_code` and `implicit` per RFC 8414.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantTypesSupported(pub Vec<String>);

impl Default for GrantTypesSupported {
    fn default() -> Self {
        Self(vec!["authorization_code".into(), "implicit".into()])
    }
}

impl TypedParameter for GrantTypesSupported {
    const KEY: &'static str = "grant_types_supported";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeChallengeMethodsSupported(pub Vec<String>);

impl TypedParameter for CodeChallengeMethodsSupported {
    const KEY: &'static str = "code_challenge_methods_supported";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreAuthorizedGrantAnonymousAccessSupported(pub bool);

impl TypedParameter for PreAuthorizedGrantAnonymousAccessSupported {
    const KEY: &'static str = "pre-authorized_grant_anonymous_access_supported";
}
