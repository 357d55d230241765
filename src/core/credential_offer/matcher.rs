//! Matching of offered credentials against the Credential Issuer's catalog.
//!
//! An offered credential is either a scope string, which must be the `scope` of some catalog
//! entry, or an object whose `format` member selects a [FormatMatcher] from the
//! [FormatRegistry]. Type and context lists are compared as ordered sequences.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value as Json;
use tracing::{debug, warn};

use super::{CredentialMetadata, JsonLdDefinition, SignedJwtDefinition};
use crate::{
    core::{
        credential_format::{
            FormatMatcher, FormatRegistry, FORMAT_JWT_VC_JSON, FORMAT_JWT_VC_JSON_LD,
            FORMAT_LDP_VC, FORMAT_MSO_MDOC,
        },
        metadata::credential_supported::CredentialSupported,
    },
    utils::NonEmptyVec,
};

#[derive(Debug, thiserror::Error)]
pub enum CredentialMatchError {
    #[error("unknown scope `{0}`")]
    UnknownScope(String),

    #[error("unknown credential format `{0}`")]
    UnknownFormat(String),

    #[error("credential object has no string `format` member")]
    MissingFormat,

    #[error("credential must be a scope string or an object, found `{0}`")]
    InvalidEntry(String),

    #[error("invalid {format} credential object: {source}")]
    Malformed {
        format: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported {format} credential with definition {definition}")]
    Unsupported { format: String, definition: String },

    #[error("credential offer contains no credentials")]
    Empty,
}

/// Match every offered credential against `catalog`, preserving order.
///
/// Fails on the first credential that cannot be matched.
pub fn match_credentials(
    credentials: &[Json],
    catalog: &[CredentialSupported],
    formats: &FormatRegistry,
) -> Result<NonEmptyVec<CredentialMetadata>, CredentialMatchError> {
    let matched = credentials
        .iter()
        .map(|offered| match_credential(offered, catalog, formats))
        .collect::<Result<Vec<_>, _>>()?;

    NonEmptyVec::maybe_new(matched).ok_or(CredentialMatchError::Empty)
}

fn match_credential(
    offered: &Json,
    catalog: &[CredentialSupported],
    formats: &FormatRegistry,
) -> Result<CredentialMetadata, CredentialMatchError> {
    let matched = match offered {
        Json::String(scope) => {
            if !catalog
                .iter()
                .any(|supported| supported.scope() == Some(scope.as_str()))
            {
                return Err(CredentialMatchError::UnknownScope(scope.clone()));
            }
            CredentialMetadata::ByScope(scope.clone())
        }
        Json::Object(object) => {
            let Some(Json::String(format)) = object.get("format") else {
                return Err(CredentialMatchError::MissingFormat);
            };
            formats
                .get(format)
                .ok_or_else(|| CredentialMatchError::UnknownFormat(format.clone()))?
                .match_credential(offered, catalog)?
        }
        other => return Err(CredentialMatchError::InvalidEntry(other.to_string())),
    };

    debug!("matched offered credential {offered} as {matched:?}");
    Ok(matched)
}

fn decode<T: DeserializeOwned>(format: &str, offered: &Json) -> Result<T, CredentialMatchError> {
    T::deserialize(offered).map_err(|source| CredentialMatchError::Malformed {
        format: format.to_owned(),
        source,
    })
}

/// Find the first catalog entry identified by `candidate` and carry over its scope.
fn find_in_catalog(
    format: &str,
    candidate: CredentialMetadata,
    catalog: &[CredentialSupported],
) -> Result<CredentialMetadata, CredentialMatchError> {
    let mut entries = catalog
        .iter()
        .filter(|supported| candidate.identifies(supported));

    let Some(entry) = entries.next() else {
        return Err(CredentialMatchError::Unsupported {
            format: format.to_owned(),
            definition: candidate.definition(),
        });
    };

    if entries.next().is_some() {
        warn!(
            "several {format} catalog entries match {}, using the first one",
            candidate.definition()
        );
    }

    Ok(candidate.with_scope(entry.scope().map(ToOwned::to_owned)))
}

#[derive(Deserialize)]
struct MsoMdocObject {
    #[serde(alias = "docType")]
    doctype: String,
}

#[derive(Deserialize)]
struct SignedJwtObject {
    credential_definition: SignedJwtDefinition,
}

#[derive(Deserialize)]
struct JsonLdObject {
    credential_definition: JsonLdDefinition,
}

#[derive(Debug, Clone, Copy)]
pub struct MsoMdocMatcher;

impl FormatMatcher for MsoMdocMatcher {
    fn format(&self) -> &str {
        FORMAT_MSO_MDOC
    }

    fn match_credential(
        &self,
        offered: &Json,
        catalog: &[CredentialSupported],
    ) -> Result<CredentialMetadata, CredentialMatchError> {
        let MsoMdocObject { doctype } = decode(self.format(), offered)?;
        let candidate = CredentialMetadata::MsoMdoc {
            doctype,
            scope: None,
        };
        find_in_catalog(self.format(), candidate, catalog)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SignedJwtMatcher;

impl FormatMatcher for SignedJwtMatcher {
    fn format(&self) -> &str {
        FORMAT_JWT_VC_JSON
    }

    fn match_credential(
        &self,
        offered: &Json,
        catalog: &[CredentialSupported],
    ) -> Result<CredentialMetadata, CredentialMatchError> {
        let SignedJwtObject {
            credential_definition,
        } = decode(self.format(), offered)?;
        let candidate = CredentialMetadata::SignedJwt {
            credential_definition,
            scope: None,
        };
        find_in_catalog(self.format(), candidate, catalog)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JsonLdSignedJwtMatcher;

impl FormatMatcher for JsonLdSignedJwtMatcher {
    fn format(&self) -> &str {
        FORMAT_JWT_VC_JSON_LD
    }

    fn match_credential(
        &self,
        offered: &Json,
        catalog: &[CredentialSupported],
    ) -> Result<CredentialMetadata, CredentialMatchError> {
        let JsonLdObject {
            credential_definition,
        } = decode(self.format(), offered)?;
        let candidate = CredentialMetadata::JsonLdSignedJwt {
            credential_definition,
            scope: None,
        };
        find_in_catalog(self.format(), candidate, catalog)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JsonLdDataIntegrityMatcher;

impl FormatMatcher for JsonLdDataIntegrityMatcher {
    fn format(&self) -> &str {
        FORMAT_LDP_VC
    }

    fn match_credential(
        &self,
        offered: &Json,
        catalog: &[CredentialSupported],
    ) -> Result<CredentialMetadata, CredentialMatchError> {
        let JsonLdObject {
            credential_definition,
        } = decode(self.format(), offered)?;
        let candidate = CredentialMetadata::JsonLdDataIntegrity {
            credential_definition,
            scope: None,
        };
        find_in_catalog(self.format(), candidate, catalog)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::core::credential_format::CredentialFormat;

    fn catalog() -> Vec<CredentialSupported> {
        serde_json::from_value(json!([
            {
                "format": "mso_mdoc",
                "scope": "PID_mso_mdoc",
                "doctype": "eu.europa.ec.eudiw.pid.1"
            },
            {
                "format": "jwt_vc_json",
                "scope": "UniversityDegree_jwt_vc_json",
                "credential_definition": {
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                }
            },
            {
                "format": "jwt_vc_json-ld",
                "credential_definition": {
                    "@context": ["https://www.w3.org/2018/credentials/v1", "https://www.w3.org/2018/credentials/examples/v1"],
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                }
            },
            {
                "format": "ldp_vc",
                "scope": "Degree_ldp_vc",
                "credential_definition": {
                    "@context": ["https://example.com/b", "https://example.com/a"],
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                }
            },
            {
                "format": "mso_mdoc",
                "scope": "second_PID",
                "doctype": "eu.europa.ec.eudiw.pid.1"
            }
        ]))
        .unwrap()
    }

    fn resolve(credentials: Json) -> Result<NonEmptyVec<CredentialMetadata>, CredentialMatchError> {
        let credentials: Vec<Json> = serde_json::from_value(credentials).unwrap();
        match_credentials(&credentials, &catalog(), &FormatRegistry::default())
    }

    #[test]
    fn scope() {
        let matched = resolve(json!(["PID_mso_mdoc"])).unwrap();
        assert_eq!(
            matched.into_inner(),
            vec![CredentialMetadata::ByScope("PID_mso_mdoc".into())]
        );

        assert!(matches!(
            resolve(json!(["nope"])),
            Err(CredentialMatchError::UnknownScope(scope)) if scope == "nope"
        ));
    }

    #[test]
    fn every_format_in_order() {
        let matched = resolve(json!([
            {
                "format": "ldp_vc",
                "credential_definition": {
                    "@context": ["https://example.com/b", "https://example.com/a"],
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                }
            },
            { "format": "mso_mdoc", "doctype": "eu.europa.ec.eudiw.pid.1" },
            "UniversityDegree_jwt_vc_json",
            {
                "format": "jwt_vc_json",
                "credential_definition": {
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                }
            },
            {
                "format": "jwt_vc_json-ld",
                "credential_definition": {
                    "@context": ["https://www.w3.org/2018/credentials/v1", "https://www.w3.org/2018/credentials/examples/v1"],
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                }
            }
        ]))
        .unwrap();

        let formats: Vec<_> = matched.iter().map(CredentialMetadata::format).collect();
        assert_eq!(
            formats,
            vec![
                Some(CredentialFormat::LdpVc),
                Some(CredentialFormat::MsoMdoc),
                None,
                Some(CredentialFormat::JwtVcJson),
                Some(CredentialFormat::JwtVcJsonLd),
            ]
        );
        assert_eq!(matched[0].scope(), Some("Degree_ldp_vc"));
        // The first of two identical mso_mdoc entries wins.
        assert_eq!(matched[1].scope(), Some("PID_mso_mdoc"));
        assert_eq!(matched[4].scope(), None);
    }

    #[test]
    fn unsupported_doctype() {
        let err = resolve(json!([
            { "format": "mso_mdoc", "doctype": "org.iso.18013.5.1.mDL" }
        ]))
        .unwrap_err();
        assert!(matches!(
            &err,
            CredentialMatchError::Unsupported { format, definition }
                if format == "mso_mdoc" && definition == "org.iso.18013.5.1.mDL"
        ));
        assert_eq!(
            err.to_string(),
            "unsupported mso_mdoc credential with definition org.iso.18013.5.1.mDL"
        );
    }

    #[test]
    fn context_order_matters() {
        let err = resolve(json!([
            {
                "format": "ldp_vc",
                "credential_definition": {
                    "@context": ["https://example.com/a", "https://example.com/b"],
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                }
            }
        ]))
        .unwrap_err();
        assert!(matches!(err, CredentialMatchError::Unsupported { .. }));
    }

    #[test]
    fn contexts_compare_as_written() {
        let catalog: Vec<CredentialSupported> = serde_json::from_value(json!([{
            "format": "ldp_vc",
            "credential_definition": {
                "@context": ["https://example.com"],
                "type": ["VerifiableCredential"]
            }
        }]))
        .unwrap();
        let offered = |context: &str| {
            vec![json!({
                "format": "ldp_vc",
                "credential_definition": {
                    "@context": [context],
                    "type": ["VerifiableCredential"]
                }
            })]
        };
        let formats = FormatRegistry::default();

        assert!(match_credentials(&offered("https://example.com"), &catalog, &formats).is_ok());
        for context in ["https://example.com/", "HTTPS://Example.COM"] {
            assert!(matches!(
                match_credentials(&offered(context), &catalog, &formats),
                Err(CredentialMatchError::Unsupported { .. })
            ));
        }
        assert!(matches!(
            match_credentials(&offered("example.com"), &catalog, &formats),
            Err(CredentialMatchError::Malformed { .. })
        ));
    }

    #[test]
    fn scope_of_unknown_catalog_format() {
        let catalog: Vec<CredentialSupported> = serde_json::from_value(json!([
            { "format": "vc+sd-jwt", "scope": "SdJwt", "vct": "x" }
        ]))
        .unwrap();
        let formats = FormatRegistry::default();

        let matched = match_credentials(&[json!("SdJwt")], &catalog, &formats).unwrap();
        assert_eq!(matched[0], CredentialMetadata::ByScope("SdJwt".into()));
        assert_eq!(matched[0].credential_supported(&catalog), Some(&catalog[0]));

        assert!(matches!(
            match_credentials(&[json!({ "format": "vc+sd-jwt", "vct": "x" })], &catalog, &formats),
            Err(CredentialMatchError::UnknownFormat(_))
        ));
    }

    #[test]
    fn type_order_matters() {
        let err = resolve(json!([
            {
                "format": "jwt_vc_json",
                "credential_definition": {
                    "type": ["UniversityDegreeCredential", "VerifiableCredential"]
                }
            }
        ]))
        .unwrap_err();
        assert!(matches!(err, CredentialMatchError::Unsupported { .. }));
    }

    #[test]
    fn format_must_match_entry_kind() {
        // Same definition as the jwt_vc_json-ld entry, but offered as ldp_vc.
        let err = resolve(json!([
            {
                "format": "ldp_vc",
                "credential_definition": {
                    "@context": ["https://www.w3.org/2018/credentials/v1", "https://www.w3.org/2018/credentials/examples/v1"],
                    "type": ["VerifiableCredential", "UniversityDegreeCredential"]
                }
            }
        ]))
        .unwrap_err();
        assert!(matches!(err, CredentialMatchError::Unsupported { .. }));
    }

    #[test]
    fn malformed_entries() {
        assert!(matches!(
            resolve(json!([{ "doctype": "x" }])),
            Err(CredentialMatchError::MissingFormat)
        ));
        assert!(matches!(
            resolve(json!([{ "format": 7 }])),
            Err(CredentialMatchError::MissingFormat)
        ));
        assert!(matches!(
            resolve(json!([{ "format": "vc+sd-jwt", "vct": "x" }])),
            Err(CredentialMatchError::UnknownFormat(format)) if format == "vc+sd-jwt"
        ));
        assert!(matches!(
            resolve(json!([{ "format": "mso_mdoc" }])),
            Err(CredentialMatchError::Malformed { .. })
        ));
        assert!(matches!(
            resolve(json!([42])),
            Err(CredentialMatchError::InvalidEntry(_))
        ));
    }

    #[test]
    fn first_failure_wins() {
        assert!(matches!(
            resolve(json!(["PID_mso_mdoc", "missing", { "format": "unknown" }])),
            Err(CredentialMatchError::UnknownScope(scope)) if scope == "missing"
        ));
    }

    #[test]
    fn empty() {
        assert!(matches!(
            resolve(json!([])),
            Err(CredentialMatchError::Empty)
        ));
    }

    #[test]
    fn unregistered_format() {
        let credentials = vec![json!({ "format": "mso_mdoc", "doctype": "eu.europa.ec.eudiw.pid.1" })];
        let mut formats = FormatRegistry::empty();
        formats.register(SignedJwtMatcher);
        assert!(matches!(
            match_credentials(&credentials, &catalog(), &formats),
            Err(CredentialMatchError::UnknownFormat(_))
        ));
    }
}
