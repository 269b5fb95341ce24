use askama::Template;

use crate::catalog::ALL_PARAMETERS;
use crate::charts::ScriptBackend;
use crate::error::WizardError;
use crate::hydrate::{self, Hydration, Prediction};
use crate::inputs::{InputField, INPUT_STEP};
use crate::view::ViewBindings;
use crate::wizard::{Step, WizardState};

struct ParameterOption {
    id: &'static str,
    label: String,
    description: &'static str,
    checked: bool,
}

struct PredictionView<'a> {
    label: &'a str,
    odds: Option<String>,
}

impl<'a> PredictionView<'a> {
    fn new(prediction: &'a Prediction) -> Self {
        let odds = match (prediction.prob_organic, prediction.prob_inorganic) {
            (Some(organic), Some(inorganic)) => Some(format!(
                "organic {:.1}%, inorganic {:.1}%",
                organic * 100.0,
                inorganic * 100.0
            )),
            _ => None,
        };
        PredictionView {
            label: &prediction.label,
            odds,
        }
    }
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    step1_class: &'static str,
    step2_class: &'static str,
    step3_class: &'static str,
    options: Vec<ParameterOption>,
    inputs: &'a [InputField],
    input_step: &'static str,
    prediction: Option<PredictionView<'a>>,
    /// Already-escaped `chartData` element.
    chart_data: String,
    gauge_class: &'static str,
    chart_script: &'a str,
    alert_script: String,
}

fn active_class(state: &WizardState<ScriptBackend>, step: Step) -> &'static str {
    if state.step() == step {
        " active"
    } else {
        ""
    }
}

/// JSON string literal safe to place inside an inline script.
fn script_literal(s: &str) -> Result<String, WizardError> {
    Ok(serde_json::to_string(s)?.replace("</", "<\\/"))
}

/// Renders the whole wizard document for `state`.
pub fn render_page(state: &WizardState<ScriptBackend>) -> Result<String, WizardError> {
    let chart_data = if state.step() == Step::Results {
        hydrate::render_element(&Hydration {
            selected: state.selected().to_vec(),
            values: state.values().clone(),
            prediction: state.prediction().cloned(),
        })?
    } else {
        String::new()
    };
    let alert_script = match state.alert() {
        Some(msg) => format!("alert({});", script_literal(msg)?),
        None => String::new(),
    };
    let options = ALL_PARAMETERS
        .iter()
        .map(|p| ParameterOption {
            id: p.id(),
            label: p.label(),
            description: p.description(),
            checked: state.checked().contains(p),
        })
        .collect();

    let page = PageTemplate {
        step1_class: active_class(state, Step::Selection),
        step2_class: active_class(state, Step::Values),
        step3_class: active_class(state, Step::Results),
        options,
        inputs: state.inputs(),
        input_step: INPUT_STEP,
        prediction: state.prediction().map(PredictionView::new),
        chart_data,
        gauge_class: if state.has_gauge() { "" } else { " hidden" },
        chart_script: state.charts().backend().script(),
        alert_script,
    };
    Ok(page.render()?)
}

/// Binds the render targets against the document a fresh wizard renders.
pub fn bind_views() -> Result<ViewBindings, WizardError> {
    let blank = WizardState::new(ScriptBackend::default());
    ViewBindings::bind(&render_page(&blank)?)
}
