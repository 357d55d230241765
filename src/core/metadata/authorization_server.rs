use std::ops::Deref;

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use url::Url;

use super::parameters::{
    AuthorizationEndpoint, CodeChallengeMethodsSupported, GrantTypesSupported, Issuer,
    PreAuthorizedGrantAnonymousAccessSupported, PushedAuthorizationRequestEndpoint,
    TokenEndpoint,
};
use crate::core::object::{ParsingErrorContext, TypedParameter, UntypedObject};

pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_TYPE_PRE_AUTHORIZED_CODE: &str = "urn:ietf:params:oauth:grant-type:pre-authorized_code";

/// OAuth 2.0 Authorization Server metadata.
///
/// Only `issuer` and `token_endpoint` are required; all other members are kept untyped and
/// parsed on access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UntypedObject", into = "UntypedObject")]
pub struct AuthorizationServerMetadata(UntypedObject, Issuer, TokenEndpoint);

impl AuthorizationServerMetadata {
    pub fn issuer(&self) -> &Url {
        &self.1 .0
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.2 .0
    }

    pub fn authorization_endpoint(&self) -> Option<Result<Url>> {
        Some(self.0.get::<AuthorizationEndpoint>()?.map(|e| e.0))
    }

    pub fn pushed_authorization_request_endpoint(&self) -> Option<Result<Url>> {
        Some(
            self.0
                .get::<PushedAuthorizationRequestEndpoint>()?
                .map(|e| e.0),
        )
    }

    pub fn grant_types_supported(&self) -> Result<GrantTypesSupported> {
        self.0.get_or_default().parsing_error()
    }

    pub fn code_challenge_methods_supported(&self) -> Result<CodeChallengeMethodsSupported> {
        self.0.get_or_default().parsing_error()
    }

    pub fn pre_authorized_grant_anonymous_access_supported(&self) -> Result<bool> {
        self.0
            .get_or_default::<PreAuthorizedGrantAnonymousAccessSupported>()
            .parsing_error()
            .map(|supported| supported.0)
    }

    pub fn supports_grant_type(&self, grant_type: &str) -> Result<bool> {
        Ok(self
            .grant_types_supported()?
            .0
            .iter()
            .any(|supported| supported == grant_type))
    }
}

impl From<AuthorizationServerMetadata> for UntypedObject {
    fn from(value: AuthorizationServerMetadata) -> Self {
        let mut inner = value.0;
        inner
            .0
            .insert(Issuer::KEY.to_owned(), Json::String(value.1 .0.into()));
        inner
            .0
            .insert(TokenEndpoint::KEY.to_owned(), Json::String(value.2 .0.into()));
        inner
    }
}

impl TryFrom<UntypedObject> for AuthorizationServerMetadata {
    type Error = Error;

    fn try_from(value: UntypedObject) -> Result<Self, Self::Error> {
        let issuer = value.get().parsing_error()?;
        let token_endpoint = value.get().parsing_error()?;
        Ok(Self(value, issuer, token_endpoint))
    }
}

impl Deref for AuthorizationServerMetadata {
    type Target = UntypedObject;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
