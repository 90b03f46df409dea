//! Extension property definitions with defaults from extension.json
//!
//! extension.json is embedded at compile time and is the single source for property
//! kinds, defaults, allowed enum values and numeric bounds. The property panel values
//! the host sends in `layout.props` are read through [`PropertyReader`], which falls
//! back to these defaults (with a warning) whenever a value is missing or unusable.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// extension.json embedded at compile time
const EXTENSION_JSON: &str = include_str!("../../extension.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringListProperty")]
    StringList,
    #[serde(rename = "IntegerProperty")]
    Integer,
    #[serde(rename = "NumberProperty")]
    Number,
    #[serde(rename = "BooleanProperty")]
    Boolean,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
}

/// Property definition from extension.json
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(rename = "defaultValue")]
    pub default_value: serde_json::Value,
    #[serde(default)]
    pub description: String,
    /// For EnumeratedProperty, the valid values
    #[serde(default)]
    pub values: Option<Vec<String>>,
    /// For Integer/Number properties, the smallest accepted value
    #[serde(default)]
    pub min: Option<f64>,
    /// For Integer/Number properties, the largest accepted value
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ExtensionManifest {
    properties: Vec<PropertyDef>,
}

/// Registry of all extension properties
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let manifest: ExtensionManifest = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse extension.json: {}", e))?;

        let properties = manifest
            .properties
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();

        Ok(Self { properties })
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    pub fn get_default(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name).map(|p| &p.default_value)
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }

    /// Check a numeric value against the property's `min` and `max`
    fn in_range(&self, name: &str, value: f64) -> bool {
        match self.properties.get(name) {
            Some(def) => {
                def.min.map_or(true, |min| value >= min) && def.max.map_or(true, |max| value <= max)
            }
            None => true,
        }
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(EXTENSION_JSON).unwrap_or_else(|e| {
            log::error!("{}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed reader over the host's `layout.props` object
pub struct PropertyReader<'a> {
    props: &'a serde_json::Value,
}

impl<'a> PropertyReader<'a> {
    pub fn new(props: &'a serde_json::Value) -> Self {
        Self { props }
    }

    fn user_value(&self, name: &str) -> Option<&'a serde_json::Value> {
        self.props.get(name).filter(|v| !v.is_null())
    }

    pub fn get_bool(&self, name: &str) -> bool {
        let default = registry()
            .get_default(name)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        match self.user_value(name) {
            None => default,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) if s == "true" => true,
            Some(serde_json::Value::String(s)) if s == "false" => false,
            Some(other) => {
                log::warn!(
                    "Invalid boolean value {} for property '{}'. Using default: {}",
                    other,
                    name,
                    default
                );
                default
            }
        }
    }

    /// Get a number, enforcing the bounds from extension.json
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = registry()
            .get_default(name)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        let value = match self.user_value(name) {
            None => return default,
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };

        match value {
            Some(v) if v.is_finite() && registry().in_range(name, v) => v,
            _ => {
                log::warn!(
                    "Invalid numeric value {:?} for property '{}'. Using default: {}",
                    self.user_value(name),
                    name,
                    default
                );
                default
            }
        }
    }

    /// Get an integer, enforcing the bounds from extension.json
    ///
    /// Whole-valued floats (`12.0`) are accepted; fractional ones fall back.
    pub fn get_i64(&self, name: &str) -> i64 {
        let default = registry()
            .get_default(name)
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        let value = match self.user_value(name) {
            None => return default,
            Some(serde_json::Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
            Some(_) => None,
        };

        match value {
            Some(v) if registry().in_range(name, v as f64) => v,
            _ => {
                log::warn!(
                    "Invalid integer value {:?} for property '{}'. Using default: {}",
                    self.user_value(name),
                    name,
                    default
                );
                default
            }
        }
    }

    /// Get enumerated property with validation
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg
            .get_default(name)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        match self.user_value(name).and_then(|v| v.as_str()) {
            Some(value) if reg.is_valid_enum_value(name, value) => value.to_string(),
            Some(value) => {
                let valid_values = reg
                    .get_property(name)
                    .and_then(|p| p.values.as_ref())
                    .map(|v| v.join(", "))
                    .unwrap_or_default();
                log::warn!(
                    "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                    value,
                    name,
                    valid_values,
                    default
                );
                default
            }
            None => default,
        }
    }

    /// Get a list of strings; non-string entries are skipped
    pub fn get_string_list(&self, name: &str) -> Vec<String> {
        let value = self
            .user_value(name)
            .or_else(|| registry().get_default(name));

        value
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("frequency").is_some());
        assert!(reg.get_property("decomposeInFourCharts").is_some());
        assert_eq!(
            reg.get_property("line").map(|p| p.kind),
            Some(PropertyKind::Enumerated)
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("frequency"), Some(&json!(12)));
        assert_eq!(reg.get_default("line"), Some(&json!("none")));
        assert_eq!(reg.get_default("showLegend"), Some(&json!(true)));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("line", "tozeroy"));
        assert!(reg.is_valid_enum_value("line", "ToNextY"));
        assert!(!reg.is_valid_enum_value("line", "spline"));
    }

    #[test]
    fn test_reader_defaults_on_empty_props() {
        let props = json!({});
        let reader = PropertyReader::new(&props);
        assert_eq!(reader.get_i64("frequency"), 12);
        assert_eq!(reader.get_enum("line"), "none");
        assert!(reader.get_bool("colors"));
        assert!(!reader.get_bool("datapoints"));
        assert_eq!(reader.get_f64("pointRadius"), 4.0);
        assert!(reader.get_string_list("dimensions").is_empty());
    }

    #[test]
    fn test_reader_user_values() {
        let props = json!({
            "frequency": 4,
            "line": "tozeroy",
            "colors": false,
            "borderWidth": "2.5",
            "dimensions": ["Month", 7, "Year"]
        });
        let reader = PropertyReader::new(&props);
        assert_eq!(reader.get_i64("frequency"), 4);
        assert_eq!(reader.get_enum("line"), "tozeroy");
        assert!(!reader.get_bool("colors"));
        assert_eq!(reader.get_f64("borderWidth"), 2.5);
        assert_eq!(reader.get_string_list("dimensions"), vec!["Month", "Year"]);
    }

    #[test]
    fn test_reader_rejects_out_of_range() {
        let props = json!({
            "frequency": 0,
            "colorForMain": -1,
            "pointRadius": -3,
            "line": "spline",
            "showLegend": 1
        });
        let reader = PropertyReader::new(&props);
        assert_eq!(reader.get_i64("frequency"), 12);
        assert_eq!(reader.get_i64("colorForMain"), 0);
        assert_eq!(reader.get_f64("pointRadius"), 4.0);
        assert_eq!(reader.get_enum("line"), "none");
        assert!(reader.get_bool("showLegend"));
    }

    #[test]
    fn test_reader_rejects_above_max() {
        let props = json!({ "frequency": 5_000_000_000_i64, "colorForMain": 1000, "pointRadius": 500 });
        let reader = PropertyReader::new(&props);
        assert_eq!(reader.get_i64("frequency"), 12);
        assert_eq!(reader.get_i64("colorForMain"), 0);
        assert_eq!(reader.get_f64("pointRadius"), 4.0);

        let props = json!({ "frequency": 1500 });
        assert_eq!(PropertyReader::new(&props).get_i64("frequency"), 1500);
    }

    #[test]
    fn test_reader_whole_float_integer() {
        let props = json!({ "frequency": 7.0, "colorForMain": 2.5 });
        let reader = PropertyReader::new(&props);
        assert_eq!(reader.get_i64("frequency"), 7);
        assert_eq!(reader.get_i64("colorForMain"), 0);
    }
}
