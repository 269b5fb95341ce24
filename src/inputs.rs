use crate::catalog::{Parameter, ParameterValues};

/// Decimal resolution accepted by every value input.
pub const INPUT_STEP: &str = "0.01";

/// One label + numeric input + description block of the value form.
#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub parameter: Parameter,
    pub label: String,
    pub description: &'static str,
    /// Pre-filled value; empty unless values are retained after a failed submit.
    pub value: Option<f64>,
}

impl InputField {
    pub fn new(parameter: Parameter) -> Self {
        InputField {
            parameter,
            label: parameter.label(),
            description: parameter.description(),
            value: None,
        }
    }

    /// Form field name, always the parameter identifier.
    pub fn name(&self) -> &'static str {
        self.parameter.id()
    }
}

/// Builds the value form blocks for `selected`, in selection order.
pub fn render_value_inputs(selected: &[Parameter]) -> Vec<InputField> {
    selected.iter().copied().map(InputField::new).collect()
}

/// Same as [`render_value_inputs`], pre-filling each field from `values`.
pub fn render_value_inputs_filled(selected: &[Parameter], values: &ParameterValues) -> Vec<InputField> {
    selected
        .iter()
        .copied()
        .map(|p| InputField {
            value: values.get(&p).copied(),
            ..InputField::new(p)
        })
        .collect()
}
