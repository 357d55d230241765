use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// An untyped (JSON) Object from which [TypedParameters](TypedParameter) can be parsed.
///
/// Used for metadata documents whose unknown members must be preserved.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UntypedObject(pub(crate) Map<String, Json>);

/// A strongly typed metadata member, stored in an [UntypedObject] under [KEY](Self::KEY).
pub trait TypedParameter: DeserializeOwned + Serialize + Clone + std::fmt::Debug {
    const KEY: &'static str;
}

impl UntypedObject {
    /// Get a [TypedParameter] from the Object or return the default value.
    ///
    /// Note that this method clones the underlying data.
    pub fn get_or_default<T: TypedParameter + Default>(&self) -> Result<T> {
        Ok(self.get().transpose()?.unwrap_or_default())
    }

    /// Get a [TypedParameter] from the Object.
    ///
    /// Note that this method clones the underlying data.
    pub fn get<T: TypedParameter>(&self) -> Option<Result<T>> {
        let value = self.0.get(T::KEY)?.clone();
        Some(serde_json::from_value(value).map_err(Into::into))
    }

    /// Insert a [TypedParameter], returning the raw value it replaced.
    pub fn insert<T: TypedParameter>(&mut self, t: T) -> Result<Option<Json>> {
        let value = serde_json::to_value(t)
            .context(format!("'{}' could not be serialized", T::KEY))?;
        Ok(self.0.insert(T::KEY.to_owned(), value))
    }
}

impl From<UntypedObject> for Json {
    fn from(value: UntypedObject) -> Self {
        value.0.into()
    }
}

pub trait ParsingErrorContext {
    type T: TypedParameter;

    fn parsing_error(self) -> Result<Self::T>;
}

impl<T: TypedParameter> ParsingErrorContext for Option<Result<T>> {
    type T = T;

    fn parsing_error(self) -> Result<T> {
        self.context(format!("'{}' is missing", T::KEY))?
            .context(format!("'{}' could not be parsed", T::KEY))
    }
}

impl<T: TypedParameter> ParsingErrorContext for Result<T> {
    type T = T;

    fn parsing_error(self) -> Result<T> {
        self.context(format!("'{}' could not be parsed", T::KEY))
    }
}
