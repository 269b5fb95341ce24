//! The three-step wizard as an explicit state object. Each transition is a
//! method; the page is rendered from whatever state the transition leaves.
use tracing::{debug, info, warn};

use crate::catalog::{Parameter, ParameterValues};
use crate::charts::{ChartBackend, ChartKind, Visualizer};
use crate::error::WizardError;
use crate::hydrate::{self, Hydration, Prediction};
use crate::inputs::{render_value_inputs, render_value_inputs_filled, InputField};
use crate::submit::{gather_values, FormSubmission, FormTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Selection,
    Values,
    Results,
}

pub const ALL_STEPS: [Step; 3] = [Step::Selection, Step::Values, Step::Results];

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Selection => 1,
            Step::Values => 2,
            Step::Results => 3,
        }
    }

    /// Id of the page region shown while this step is active.
    pub fn marker_id(self) -> &'static str {
        match self {
            Step::Selection => "step1",
            Step::Values => "step2",
            Step::Results => "step3",
        }
    }
}

pub struct WizardState<B: ChartBackend> {
    step: Step,
    checked: Vec<Parameter>,
    selected: Vec<Parameter>,
    values: ParameterValues,
    inputs: Vec<InputField>,
    prediction: Option<Prediction>,
    alert: Option<String>,
    charts: Visualizer<B>,
    retain_values_on_failure: bool,
}

impl<B: ChartBackend> WizardState<B> {
    pub fn new(backend: B) -> Self {
        WizardState {
            step: Step::Selection,
            checked: Vec::new(),
            selected: Vec::new(),
            values: ParameterValues::new(),
            inputs: Vec::new(),
            prediction: None,
            alert: None,
            charts: Visualizer::new(backend),
            retain_values_on_failure: false,
        }
    }

    /// Pre-fill the value inputs from the gathered values when a submission
    /// fails, instead of regenerating them empty.
    pub fn retain_values_on_failure(mut self, retain: bool) -> Self {
        self.retain_values_on_failure = retain;
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Boxes ticked on the selection form.
    pub fn checked(&self) -> &[Parameter] {
        &self.checked
    }

    pub fn selected(&self) -> &[Parameter] {
        &self.selected
    }

    pub fn values(&self) -> &ParameterValues {
        &self.values
    }

    pub fn inputs(&self) -> &[InputField] {
        &self.inputs
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    /// Message for a blocking alert, set by a rejected transition.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn charts(&self) -> &Visualizer<B> {
        &self.charts
    }

    pub fn has_gauge(&self) -> bool {
        self.charts.is_live(ChartKind::Gauge)
    }

    /// Step 1 -> 2 with the checked parameter ids. An empty or unknown
    /// selection leaves the wizard on step 1 with an alert.
    pub fn advance<I, S>(&mut self, checked: I) -> Result<(), WizardError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.alert = None;
        let parsed: Result<Vec<Parameter>, WizardError> =
            checked.into_iter().map(|id| id.as_ref().parse()).collect();
        let checked = match parsed {
            Ok(checked) if !checked.is_empty() => checked,
            Ok(_) => return Err(self.reject(WizardError::EmptySelection)),
            Err(e) => return Err(self.reject(e)),
        };

        self.checked = checked.clone();
        self.selected = checked;
        self.inputs = render_value_inputs(&self.selected);
        self.step = Step::Values;
        debug!(selected = self.selected.len(), "entered value step");
        Ok(())
    }

    fn reject(&mut self, err: WizardError) -> WizardError {
        warn!(%err, "selection rejected");
        self.alert = Some(err.to_string());
        self.step = Step::Selection;
        err
    }

    /// Step 2 -> submission. Gathers `(input name, raw value)` pairs into the
    /// parameter values, sends them through `transport` and re-enters at the
    /// results step from the page it answers with. On failure the wizard is
    /// back on step 2 with an alert.
    pub async fn submit<T, I, K, V>(&mut self, transport: &T, entries: I) -> Result<(), WizardError>
    where
        T: FormTransport,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.alert = None;
        let result = self.try_submit(transport, entries).await;
        if let Err(err) = &result {
            warn!(%err, "submission failed");
            self.alert = Some(format!("Submission failed: {err}"));
            self.inputs = if self.retain_values_on_failure {
                render_value_inputs_filled(&self.selected, &self.values)
            } else {
                render_value_inputs(&self.selected)
            };
            self.step = Step::Values;
        }
        result
    }

    async fn try_submit<T, I, K, V>(&mut self, transport: &T, entries: I) -> Result<(), WizardError>
    where
        T: FormTransport,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.values = gather_values(entries)?;
        let form = FormSubmission::new(&self.selected, &self.values);
        let page = transport.submit(&form).await?;
        let hydration = hydrate::extract(&page)?.ok_or(WizardError::MissingHydration)?;
        self.hydrate(hydration)
    }

    /// Enters the results step from page-embedded data and renders the charts.
    pub fn hydrate(&mut self, hydration: Hydration) -> Result<(), WizardError> {
        self.checked = hydration.selected.clone();
        self.selected = hydration.selected;
        self.values = hydration.values;
        self.prediction = hydration.prediction;
        self.inputs.clear();
        self.step = Step::Results;
        self.render_visualizations()?;
        info!(
            selected = self.selected.len(),
            charts = self.charts.live_count(),
            "results rendered"
        );
        Ok(())
    }

    pub fn render_visualizations(&mut self) -> Result<(), WizardError> {
        self.charts.render(&self.selected, &self.values)
    }

    /// Back to an empty step 1 from any state, destroying every chart.
    pub fn reset(&mut self) {
        self.checked.clear();
        self.selected.clear();
        self.values.clear();
        self.inputs.clear();
        self.prediction = None;
        self.alert = None;
        self.charts.clear();
        self.step = Step::Selection;
        debug!("wizard reset");
    }
}
