//! Lookup catalogs used to fill form selectors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A software package known to the repositories.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<Value>,
}

/// A mobile broadband service provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceProvider {
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
}

/// A printer model of the printer catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PrinterModel {
    pub manufacturer: String,
    pub model: String,
}
