use std::path::Path;

use schemars::{JsonSchema, Schema, schema_for};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// A JSON configuration document with a schema and post-parse validation.
pub trait ConfigDocument: Sized + Serialize + DeserializeOwned + JsonSchema {
    /// JSON Schema of the whole document.
    fn schema() -> Schema {
        schema_for!(Self)
    }

    /// Checks on the raw JSON that serde cannot express.
    fn check_raw(_value: &Value) -> Result<()> {
        Ok(())
    }

    /// Checks on the parsed document.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_value(value: Value) -> Result<Self> {
        Self::check_raw(&value)?;
        let document: Self = serde_json::from_value(value)?;
        document.validate()?;
        Ok(document)
    }

    fn from_json_str(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// JSON Schema for any configuration type.
pub fn json_schema<T: JsonSchema>() -> Schema {
    schema_for!(T)
}
