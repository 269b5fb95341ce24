use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

use crate::charts::{ChartKind, ALL_CHARTS};
use crate::error::WizardError;
use crate::wizard::{Step, ALL_STEPS};

static ELEMENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)id\s*=\s*["']([^"']+)["']"#).expect("static regex"));

pub const PARAMETER_FORM_ID: &str = "parameterForm";
pub const VALUE_FORM_ID: &str = "valueForm";
pub const VALUE_INPUTS_ID: &str = "valueInputs";

/// Render targets the wizard writes into, checked once against the page
/// markup so a missing target fails at startup instead of at first render.
#[derive(Debug, Clone)]
pub struct ViewBindings {
    pub steps: BTreeMap<Step, &'static str>,
    pub parameter_form: &'static str,
    pub value_form: &'static str,
    pub value_inputs: &'static str,
    pub canvases: BTreeMap<ChartKind, &'static str>,
}

impl ViewBindings {
    pub fn required_targets() -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = ALL_STEPS.iter().map(|s| s.marker_id()).collect();
        ids.extend([PARAMETER_FORM_ID, VALUE_FORM_ID, VALUE_INPUTS_ID]);
        ids.extend(ALL_CHARTS.iter().map(|c| c.canvas_id()));
        ids
    }

    pub fn bind(markup: &str) -> Result<Self, WizardError> {
        let present: HashSet<&str> = ELEMENT_ID
            .captures_iter(markup)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect();
        if let Some(missing) = Self::required_targets()
            .into_iter()
            .find(|id| !present.contains(id))
        {
            return Err(WizardError::MissingTarget(missing));
        }
        Ok(ViewBindings {
            steps: ALL_STEPS.iter().map(|s| (*s, s.marker_id())).collect(),
            parameter_form: PARAMETER_FORM_ID,
            value_form: VALUE_FORM_ID,
            value_inputs: VALUE_INPUTS_ID,
            canvases: ALL_CHARTS.iter().map(|c| (*c, c.canvas_id())).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ScriptBackend;
    use crate::page::render_page;
    use crate::wizard::WizardState;

    fn blank_page() -> String {
        render_page(&WizardState::new(ScriptBackend::default())).unwrap()
    }

    #[test]
    fn rendered_page_binds() {
        let bindings = ViewBindings::bind(&blank_page()).unwrap();
        assert_eq!(bindings.steps[&Step::Results], "step3");
        assert_eq!(bindings.canvases[&ChartKind::Gauge], "gaugeGraph");
        assert_eq!(bindings.canvases.len(), 5);
    }

    #[test]
    fn every_required_target_is_checked() {
        let page = blank_page();
        for id in ViewBindings::required_targets() {
            let stripped = page.replace(&format!(r#"id="{id}""#), "");
            match ViewBindings::bind(&stripped) {
                Err(WizardError::MissingTarget(missing)) => assert_eq!(missing, id),
                other => panic!("expected {id} to be missing, got {other:?}"),
            }
        }
    }

    #[test]
    fn data_attributes_do_not_count_as_ids() {
        let page = blank_page().replace(r#"id="pieChart""#, r#"data-id="pieChart""#);
        assert!(matches!(
            ViewBindings::bind(&page),
            Err(WizardError::MissingTarget("pieChart"))
        ));
    }
}
