//! Query configurator
//!
//! Turns the field selection into a hypercube definition whose measures are
//! `[base, trend, seasonal, random, blank]` and submits it to the host's live object
//! as a single patch-set. Trend, seasonal and random are R script expressions evaluated
//! by the host's script engine; the measure order is relied on by the renderer.

use crate::config::{ExtensionConfig, FieldSelection};
use crate::host::{PatchOperation, QueryClient, Result};
use serde::Serialize;

pub const DIMENSIONS_PATH: &str = "/qHyperCubeDef/qDimensions";
pub const MEASURES_PATH: &str = "/qHyperCubeDef/qMeasures";

/// R decomposition script. `{frequency}` and `{component}` are substituted inside the
/// quoted R source, `{measure}` outside it as the script's `Measure` argument.
const DECOMPOSE_TEMPLATE: &str = "R.ScriptEval('library(dplyr);data<-ts(q$Measure,frequency={frequency});(decompose(data)${component});', {measure} as Measure)";

/// Label of the trailing placeholder measure
const BLANK_LABEL: &str = "-";

/// Component of `decompose()` output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Trend,
    Seasonal,
    Random,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Trend, Component::Seasonal, Component::Random];

    /// Field name on the R `decomposed.ts` object
    pub fn r_field(&self) -> &'static str {
        match self {
            Component::Trend => "trend",
            Component::Seasonal => "seasonal",
            Component::Random => "random",
        }
    }
}

/// Build the script-engine expression for one component
pub fn decomposition_script(component: Component, measure: &str, frequency: u32) -> String {
    DECOMPOSE_TEMPLATE
        .replace("{frequency}", &frequency.to_string())
        .replace("{component}", component.r_field())
        .replace("{measure}", measure)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionDef {
    #[serde(rename = "qDef")]
    pub def: FieldDefs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefs {
    #[serde(rename = "qFieldDefs")]
    pub field_defs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureDef {
    #[serde(rename = "qDef")]
    pub def: MeasureExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureExpr {
    #[serde(rename = "qLabel", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "qDef")]
    pub expression: String,
}

impl MeasureDef {
    fn expression(expression: String) -> Self {
        Self {
            def: MeasureExpr {
                label: None,
                expression,
            },
        }
    }

    fn blank() -> Self {
        Self {
            def: MeasureExpr {
                label: Some(BLANK_LABEL.to_string()),
                expression: String::new(),
            },
        }
    }
}

pub fn dimension_defs(dimension: &str) -> Vec<DimensionDef> {
    vec![DimensionDef {
        def: FieldDefs {
            field_defs: vec![dimension.to_string()],
        },
    }]
}

/// The five measures in renderer order: base, trend, seasonal, random, blank
pub fn derived_measures(measure: &str, frequency: u32) -> Vec<MeasureDef> {
    let mut measures = Vec::with_capacity(5);
    measures.push(MeasureDef::expression(measure.to_string()));
    measures.extend(
        Component::ALL
            .iter()
            .map(|c| MeasureDef::expression(decomposition_script(*c, measure, frequency))),
    );
    measures.push(MeasureDef::blank());
    measures
}

/// Replace operations for the dimension and measure lists
pub fn build_patches(fields: &FieldSelection, frequency: u32) -> Result<Vec<PatchOperation>> {
    let dimensions = serde_json::to_string(&dimension_defs(&fields.dimension))?;
    let measures = serde_json::to_string(&derived_measures(&fields.measure, frequency))?;

    Ok(vec![
        PatchOperation::replace(DIMENSIONS_PATH, dimensions),
        PatchOperation::replace(MEASURES_PATH, measures),
    ])
}

/// Applies the decomposition hypercube definition to the host object
#[derive(Debug, Default)]
pub struct QueryConfigurator {
    patch_applied: bool,
}

impl QueryConfigurator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a patch-set has been applied by this configurator
    pub fn patch_applied(&self) -> bool {
        self.patch_applied
    }

    /// Build the patch-set from the configuration and submit it in one call
    pub async fn create_cube<C>(&mut self, client: &C, config: &ExtensionConfig) -> Result<()>
    where
        C: QueryClient + ?Sized,
    {
        let patches = build_patches(&config.fields, config.frequency)?;

        log::info!(
            "Applying decomposition cube: dimension='{}', measure='{}', frequency={}",
            config.fields.dimension,
            config.fields.measure,
            config.frequency
        );
        client.apply_patches(&patches, false).await?;

        self.patch_applied = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FixtureClient, Layout, PatchOp};
    use serde_json::json;

    fn fields() -> FieldSelection {
        FieldSelection {
            dimension: "Month".to_string(),
            measure: "Sum(Sales)".to_string(),
        }
    }

    #[test]
    fn test_decomposition_script() {
        let script = decomposition_script(Component::Seasonal, "Sum(Sales)", 12);
        assert_eq!(
            script,
            "R.ScriptEval('library(dplyr);data<-ts(q$Measure,frequency=12);(decompose(data)$seasonal);', Sum(Sales) as Measure)"
        );
    }

    #[test]
    fn test_derived_measures_order() {
        let measures = derived_measures("Sum(Sales)", 7);
        assert_eq!(measures.len(), 5);
        assert_eq!(measures[0].def.expression, "Sum(Sales)");
        assert!(measures[1].def.expression.contains("$trend"));
        assert!(measures[2].def.expression.contains("$seasonal"));
        assert!(measures[3].def.expression.contains("$random"));
        for m in &measures[1..4] {
            assert!(m.def.expression.contains("frequency=7"));
            assert!(m.def.expression.contains("Sum(Sales) as Measure"));
        }
        assert_eq!(measures[4].def.label.as_deref(), Some("-"));
        assert_eq!(measures[4].def.expression, "");
    }

    #[test]
    fn test_patch_shape() {
        let patches = build_patches(&fields(), 4).unwrap();
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0].path, DIMENSIONS_PATH);
        assert_eq!(patches[1].path, MEASURES_PATH);
        assert!(patches.iter().all(|p| p.op == PatchOp::Replace));

        let dims: serde_json::Value = serde_json::from_str(&patches[0].value).unwrap();
        assert_eq!(dims, json!([{ "qDef": { "qFieldDefs": ["Month"] } }]));

        let measures: serde_json::Value = serde_json::from_str(&patches[1].value).unwrap();
        let measures = measures.as_array().unwrap();
        assert_eq!(measures.len(), 5);
        assert_eq!(measures[0], json!({ "qDef": { "qDef": "Sum(Sales)" } }));
        assert!(measures[0]["qDef"].get("qLabel").is_none());
        assert_eq!(measures[4], json!({ "qDef": { "qLabel": "-", "qDef": "" } }));
    }

    #[tokio::test]
    async fn test_create_cube_applies_once() {
        let layout = Layout {
            props: json!({
                "dimensions": ["Month"],
                "measures": ["Sum(Sales)"],
                "frequency": 3
            }),
            ..Default::default()
        };
        let config = ExtensionConfig::from_layout(&layout).unwrap();
        let client = FixtureClient::default();
        let mut configurator = QueryConfigurator::new();
        assert!(!configurator.patch_applied());

        configurator.create_cube(&client, &config).await.unwrap();

        assert!(configurator.patch_applied());
        let applied = client.applied_patches().await;
        assert_eq!(applied.len(), 1);
        let (patches, soft) = &applied[0];
        assert!(!soft);
        assert_eq!(patches.len(), 2);
        assert!(patches[1].value.contains("frequency=3"));
    }
}
