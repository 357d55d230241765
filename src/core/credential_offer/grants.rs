use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Default polling interval for the token endpoint, in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// The grant types a Credential Offer allows the wallet to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "GrantsObject")]
pub enum Grants {
    AuthorizationCode(AuthorizationCode),
    PreAuthorizedCode(PreAuthorizedCode),
    Both(AuthorizationCode, PreAuthorizedCode),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// Binds the subsequent authorization request to this offer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAuthorizedCode {
    #[serde(rename = "pre-authorized_code")]
    pub pre_authorized_code: String,
    #[serde(default, alias = "user_pin_required")]
    pub pin_required: bool,
    /// Minimum wait between token endpoint polls.
    #[serde(default = "default_interval", with = "interval_seconds")]
    pub interval: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(DEFAULT_INTERVAL_SECS)
}

mod interval_seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(interval: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(interval.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Wire representation of the `grants` member of a Credential Offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantsObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<AuthorizationCode>,
    #[serde(
        default,
        rename = "pre-authorized_code",
        skip_serializing_if = "Option::is_none"
    )]
    pub pre_authorized_code: Option<PreAuthorizedCode>,
}

impl From<Grants> for GrantsObject {
    fn from(value: Grants) -> Self {
        match value {
            Grants::AuthorizationCode(authorization_code) => Self {
                authorization_code: Some(authorization_code),
                pre_authorized_code: None,
            },
            Grants::PreAuthorizedCode(pre_authorized_code) => Self {
                authorization_code: None,
                pre_authorized_code: Some(pre_authorized_code),
            },
            Grants::Both(authorization_code, pre_authorized_code) => Self {
                authorization_code: Some(authorization_code),
                pre_authorized_code: Some(pre_authorized_code),
            },
        }
    }
}

impl Grants {
    /// Normalize the raw `grants` member of an offer.
    ///
    /// Returns `None` when the member is absent or names neither grant type.
    pub fn from_json(grants: Option<Json>) -> Result<Option<Self>, serde_json::Error> {
        let Some(grants) = grants else {
            return Ok(None);
        };
        let GrantsObject {
            authorization_code,
            pre_authorized_code,
        } = serde_json::from_value(grants)?;

        Ok(match (authorization_code, pre_authorized_code) {
            (Some(a), Some(p)) => Some(Self::Both(a, p)),
            (Some(a), None) => Some(Self::AuthorizationCode(a)),
            (None, Some(p)) => Some(Self::PreAuthorizedCode(p)),
            (None, None) => None,
        })
    }

    pub fn authorization_code(&self) -> Option<&AuthorizationCode> {
        match self {
            Self::AuthorizationCode(a) | Self::Both(a, _) => Some(a),
            Self::PreAuthorizedCode(_) => None,
        }
    }

    pub fn pre_authorized_code(&self) -> Option<&PreAuthorizedCode> {
        match self {
            Self::PreAuthorizedCode(p) | Self::Both(_, p) => Some(p),
            Self::AuthorizationCode(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn absent() {
        assert_eq!(Grants::from_json(None).unwrap(), None);
        assert_eq!(Grants::from_json(Some(json!({}))).unwrap(), None);
    }

    #[test]
    fn pre_authorized_code_defaults() {
        let grants = Grants::from_json(Some(json!({
            "pre-authorized_code": { "pre-authorized_code": "adhjhdjajkdkhjhdj" }
        })))
        .unwrap()
        .unwrap();

        let Grants::PreAuthorizedCode(code) = &grants else {
            panic!("expected pre-authorized_code grant")
        };
        assert_eq!(code.pre_authorized_code, "adhjhdjajkdkhjhdj");
        assert!(!code.pin_required);
        assert_eq!(code.interval, Duration::from_secs(5));
        assert!(grants.authorization_code().is_none());
    }

    #[test]
    fn both() {
        let grants = Grants::from_json(Some(json!({
            "authorization_code": { "issuer_state": "eyJhbGciOiJSU0Et...FYUaBy" },
            "pre-authorized_code": {
                "pre-authorized_code": "adhjhdjajkdkhjhdj",
                "user_pin_required": true,
                "interval": 10
            }
        })))
        .unwrap()
        .unwrap();

        assert_eq!(
            grants.authorization_code().unwrap().issuer_state.as_deref(),
            Some("eyJhbGciOiJSU0Et...FYUaBy")
        );
        let code = grants.pre_authorized_code().unwrap();
        assert!(code.pin_required);
        assert_eq!(code.interval, Duration::from_secs(10));
    }

    #[test]
    fn authorization_code_without_issuer_state() {
        assert_eq!(
            Grants::from_json(Some(json!({ "authorization_code": {} }))).unwrap(),
            Some(Grants::AuthorizationCode(AuthorizationCode::default()))
        );
    }

    #[test]
    fn malformed() {
        assert!(Grants::from_json(Some(json!({ "pre-authorized_code": {} }))).is_err());
        assert!(Grants::from_json(Some(json!({
            "pre-authorized_code": { "pre-authorized_code": "x", "interval": "soon" }
        })))
        .is_err());
        assert!(Grants::from_json(Some(json!(["authorization_code"]))).is_err());
    }

    #[test]
    fn serializes_to_wire_shape() {
        let grants = Grants::PreAuthorizedCode(PreAuthorizedCode {
            pre_authorized_code: "code".into(),
            pin_required: false,
            interval: Duration::from_secs(5),
        });
        assert_eq!(
            serde_json::to_value(grants).unwrap(),
            json!({
                "pre-authorized_code": {
                    "pre-authorized_code": "code",
                    "pin_required": false,
                    "interval": 5
                }
            })
        );
    }
}
