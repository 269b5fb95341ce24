//! Chart.js configurations for the results step and the backend seam that
//! turns them into live chart instances.
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::catalog::{Parameter, ParameterValues};
use crate::error::WizardError;

pub const PIE_PALETTE: [&str; 5] = ["#ff6f61", "#6b5b95", "#88b04b", "#f7cac9", "#92a8d1"];
pub const BAR_COLOR: &str = "#ffeb3b";
pub const SCATTER_COLOR: &str = "#ff6f61";
pub const GAUGE_ACIDIC_COLOR: &str = "#ff0d00";
pub const GAUGE_NEUTRAL_COLOR: &str = "#00ffcc";
pub const GAUGE_TRACK_COLOR: &str = "#b0bec5";
pub const RIBBON_FILL: &str = "rgba(255, 235, 59, 0.3)";
pub const PH_SCALE: f64 = 14.0;
pub const PH_NEUTRAL: f64 = 7.0;

/// The five result views, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    Pie,
    Bar,
    Scatter,
    Gauge,
    Ribbon,
}

pub const ALL_CHARTS: [ChartKind; 5] = [
    ChartKind::Pie,
    ChartKind::Bar,
    ChartKind::Scatter,
    ChartKind::Gauge,
    ChartKind::Ribbon,
];

impl ChartKind {
    /// Id of the canvas the chart draws into.
    pub fn canvas_id(self) -> &'static str {
        match self {
            ChartKind::Pie => "pieChart",
            ChartKind::Bar => "barGraph",
            ChartKind::Scatter => "scatterGraph",
            ChartKind::Gauge => "gaugeGraph",
            ChartKind::Ribbon => "ribbonChart",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub config: Value,
}

/// Reading shown on the pH gauge. Falls back to neutral when pH is missing,
/// zero or NaN.
pub fn gauge_reading(values: &ParameterValues) -> f64 {
    match values.get(&Parameter::Ph) {
        Some(v) if *v != 0.0 && !v.is_nan() => *v,
        _ => PH_NEUTRAL,
    }
}

pub fn gauge_color(ph: f64) -> &'static str {
    if ph < PH_NEUTRAL {
        GAUGE_ACIDIC_COLOR
    } else {
        GAUGE_NEUTRAL_COLOR
    }
}

/// Builds every chart the selection calls for, in render order. The gauge is
/// only present when pH is selected.
pub fn build_charts(selected: &[Parameter], values: &ParameterValues) -> Vec<ChartSpec> {
    let labels: Vec<String> = selected.iter().map(|p| p.display_name()).collect();
    let data: Vec<Option<f64>> = selected.iter().map(|p| values.get(p).copied()).collect();

    let mut charts = vec![
        ChartSpec {
            kind: ChartKind::Pie,
            config: pie_config(&labels, &data),
        },
        ChartSpec {
            kind: ChartKind::Bar,
            config: bar_config(&labels, &data),
        },
        ChartSpec {
            kind: ChartKind::Scatter,
            config: scatter_config(&data),
        },
    ];
    if selected.contains(&Parameter::Ph) {
        charts.push(ChartSpec {
            kind: ChartKind::Gauge,
            config: gauge_config(gauge_reading(values)),
        });
    }
    charts.push(ChartSpec {
        kind: ChartKind::Ribbon,
        config: ribbon_config(&labels, &data),
    });
    charts
}

fn base_options() -> Value {
    json!({
        "responsive": true,
        "maintainAspectRatio": false
    })
}

fn with_zero_based_y(mut options: Value) -> Value {
    options["scales"]["y"] = json!({ "beginAtZero": true });
    options
}

fn pie_config(labels: &[String], data: &[Option<f64>]) -> Value {
    let colors: Vec<&str> = PIE_PALETTE.iter().copied().cycle().take(data.len()).collect();
    json!({
        "type": "pie",
        "data": {
            "labels": labels,
            "datasets": [{
                "data": data,
                "backgroundColor": colors,
                "borderWidth": 1
            }]
        },
        "options": base_options()
    })
}

fn bar_config(labels: &[String], data: &[Option<f64>]) -> Value {
    json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Values",
                "data": data,
                "backgroundColor": BAR_COLOR,
                "borderWidth": 1
            }]
        },
        "options": with_zero_based_y(base_options())
    })
}

fn scatter_config(data: &[Option<f64>]) -> Value {
    let points: Vec<Value> = data
        .iter()
        .enumerate()
        .map(|(idx, val)| json!({ "x": idx, "y": val }))
        .collect();
    let mut options = with_zero_based_y(base_options());
    options["scales"]["x"] = json!({ "type": "linear", "position": "bottom" });
    json!({
        "type": "scatter",
        "data": {
            "datasets": [{
                "label": "Values",
                "data": points,
                "backgroundColor": SCATTER_COLOR,
                "borderWidth": 1
            }]
        },
        "options": options
    })
}

fn gauge_config(ph: f64) -> Value {
    let mut options = base_options();
    options["circumference"] = json!(180);
    options["rotation"] = json!(-90);
    options["cutout"] = json!("80%");
    options["plugins"] = json!({ "legend": { "display": false } });
    json!({
        "type": "doughnut",
        "data": {
            "datasets": [{
                "data": [ph, PH_SCALE - ph],
                "backgroundColor": [gauge_color(ph), GAUGE_TRACK_COLOR],
                "borderWidth": 0
            }]
        },
        "options": options
    })
}

fn ribbon_config(labels: &[String], data: &[Option<f64>]) -> Value {
    json!({
        "type": "line",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Trend",
                "data": data,
                "fill": true,
                "backgroundColor": RIBBON_FILL,
                "borderColor": BAR_COLOR,
                "tension": 0.4,
                "borderWidth": 2
            }]
        },
        "options": with_zero_based_y(base_options())
    })
}

/// Where chart instances live. Creating into a target that still holds an
/// instance is an error in Chart.js, so callers destroy first.
pub trait ChartBackend {
    type Handle;

    fn create(&mut self, kind: ChartKind, config: &Value) -> Result<Self::Handle, WizardError>;
    fn destroy(&mut self, handle: Self::Handle);
}

/// Owns the live chart handles, at most one per chart kind.
pub struct Visualizer<B: ChartBackend> {
    backend: B,
    live: BTreeMap<ChartKind, B::Handle>,
}

impl<B: ChartBackend> Visualizer<B> {
    pub fn new(backend: B) -> Self {
        Visualizer {
            backend,
            live: BTreeMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, kind: ChartKind) -> bool {
        self.live.contains_key(&kind)
    }

    /// Destroys every live instance.
    pub fn clear(&mut self) {
        let live = std::mem::take(&mut self.live);
        for (_, handle) in live {
            self.backend.destroy(handle);
        }
    }

    /// Destroys previous instances, then creates one per chart in `build_charts`.
    pub fn render(&mut self, selected: &[Parameter], values: &ParameterValues) -> Result<(), WizardError> {
        self.clear();
        for spec in build_charts(selected, values) {
            let handle = self.backend.create(spec.kind, &spec.config)?;
            debug!(chart = spec.kind.canvas_id(), "chart created");
            self.live.insert(spec.kind, handle);
        }
        Ok(())
    }
}

/// Emits the Chart.js calls into a page script. Handles are the chart kinds,
/// registered in the page-global `chartInstances` object.
#[derive(Debug, Default)]
pub struct ScriptBackend {
    script: String,
}

impl ScriptBackend {
    pub fn script(&self) -> &str {
        &self.script
    }
}

impl ChartBackend for ScriptBackend {
    type Handle = ChartKind;

    fn create(&mut self, kind: ChartKind, config: &Value) -> Result<ChartKind, WizardError> {
        let config = serde_json::to_string(config).map_err(|e| WizardError::Chart(e.to_string()))?;
        // keep "</script>" out of the inline script
        let config = config.replace("</", "<\\/");
        let id = kind.canvas_id();
        self.script.push_str(&format!(
            "chartInstances.{id} = new Chart(document.getElementById('{id}').getContext('2d'), {config});\n"
        ));
        Ok(kind)
    }

    fn destroy(&mut self, handle: ChartKind) {
        let id = handle.canvas_id();
        self.script.push_str(&format!(
            "if (chartInstances.{id}) {{ chartInstances.{id}.destroy(); delete chartInstances.{id}; }}\n"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ALL_PARAMETERS;

    fn values(pairs: &[(Parameter, f64)]) -> ParameterValues {
        pairs.iter().copied().collect()
    }

    fn kinds(charts: &[ChartSpec]) -> Vec<ChartKind> {
        charts.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn acidic_ph_renders_low_color_gauge() {
        let selected = [Parameter::Ph, Parameter::Bod];
        let charts = build_charts(&selected, &values(&[(Parameter::Ph, 6.2), (Parameter::Bod, 3.4)]));
        assert_eq!(kinds(&charts), ALL_CHARTS);
        let gauge = &charts[3].config;
        assert_eq!(gauge["type"], "doughnut");
        assert_eq!(gauge["data"]["datasets"][0]["backgroundColor"][0], GAUGE_ACIDIC_COLOR);
        let data = gauge["data"]["datasets"][0]["data"].as_array().unwrap();
        assert!((data[0].as_f64().unwrap() - 6.2).abs() < 1e-9);
        assert!((data[1].as_f64().unwrap() - 7.8).abs() < 1e-9);
        assert_eq!(gauge["options"]["circumference"], 180);
        assert_eq!(gauge["options"]["rotation"], -90);
        assert_eq!(gauge["options"]["cutout"], "80%");
        assert_eq!(gauge["options"]["plugins"]["legend"]["display"], false);
    }

    #[test]
    fn no_gauge_without_ph() {
        let charts = build_charts(&[Parameter::Bod], &values(&[(Parameter::Bod, 3.4)]));
        assert_eq!(
            kinds(&charts),
            [ChartKind::Pie, ChartKind::Bar, ChartKind::Scatter, ChartKind::Ribbon]
        );
    }

    #[test]
    fn gauge_threshold_and_fallback() {
        assert_eq!(gauge_color(6.99), GAUGE_ACIDIC_COLOR);
        assert_eq!(gauge_color(7.0), GAUGE_NEUTRAL_COLOR);
        assert_eq!(gauge_reading(&ParameterValues::new()), PH_NEUTRAL);
        assert_eq!(gauge_reading(&values(&[(Parameter::Ph, 0.0)])), PH_NEUTRAL);
        assert_eq!(gauge_reading(&values(&[(Parameter::Ph, 9.5)])), 9.5);
    }

    #[test]
    fn pie_palette_cycles_past_five_slices() {
        let all: ParameterValues = ALL_PARAMETERS.iter().map(|p| (*p, 1.0)).collect();
        let charts = build_charts(&ALL_PARAMETERS, &all);
        let colors = charts[0].config["data"]["datasets"][0]["backgroundColor"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(colors.len(), 9);
        assert_eq!(colors[5], PIE_PALETTE[0]);
        assert_eq!(colors[8], PIE_PALETTE[3]);
    }

    #[test]
    fn scatter_plots_index_against_value() {
        let selected = [Parameter::Turbidity, Parameter::Nitrates];
        let charts = build_charts(
            &selected,
            &values(&[(Parameter::Turbidity, 4.0), (Parameter::Nitrates, 9.0)]),
        );
        let scatter = &charts[2].config;
        assert_eq!(scatter["data"]["datasets"][0]["data"][1], json!({ "x": 1, "y": 9.0 }));
        assert_eq!(scatter["options"]["scales"]["x"]["type"], "linear");
        assert_eq!(scatter["options"]["scales"]["x"]["position"], "bottom");
        assert_eq!(scatter["options"]["scales"]["y"]["beginAtZero"], true);
    }

    #[test]
    fn labels_and_sizing_are_shared() {
        let selected = [Parameter::Ph, Parameter::DissolvedOxygen];
        let charts = build_charts(&selected, &ParameterValues::new());
        for chart in &charts {
            assert_eq!(chart.config["options"]["responsive"], true);
            assert_eq!(chart.config["options"]["maintainAspectRatio"], false);
        }
        let ribbon = &charts[4].config;
        assert_eq!(ribbon["data"]["labels"], json!(["pH", "Dissolved Oxygen"]));
        assert_eq!(ribbon["data"]["datasets"][0]["data"], json!([null, null]));
        assert_eq!(ribbon["data"]["datasets"][0]["tension"], 0.4);
        assert_eq!(ribbon["data"]["datasets"][0]["fill"], true);
    }

    #[test]
    fn script_backend_destroys_before_recreating() {
        let mut viz = Visualizer::new(ScriptBackend::default());
        let vals = values(&[(Parameter::Ph, 8.0)]);
        viz.render(&[Parameter::Ph], &vals).unwrap();
        viz.render(&[Parameter::Ph], &vals).unwrap();
        assert_eq!(viz.live_count(), 5);
        let script = viz.backend().script();
        let destroy = script.find("chartInstances.pieChart.destroy()").unwrap();
        let second_create = script.rfind("chartInstances.pieChart = new Chart").unwrap();
        assert!(destroy < second_create);
        assert_eq!(script.matches("new Chart").count(), 10);
    }

    #[test]
    fn clear_drops_every_instance() {
        let mut viz = Visualizer::new(ScriptBackend::default());
        viz.render(&[Parameter::Bod], &values(&[(Parameter::Bod, 1.0)])).unwrap();
        assert!(viz.is_live(ChartKind::Ribbon));
        viz.clear();
        assert_eq!(viz.live_count(), 0);
    }
}
