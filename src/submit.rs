use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use tracing::{debug, warn};

use crate::catalog::{Parameter, ParameterValues};
use crate::error::WizardError;
use crate::hydrate::{self, Hydration};

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(Infinity|(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?)").expect("static regex")
});

/// Browser-style float coercion: parses the leading number of `raw` and maps
/// anything unparseable (or NaN) to zero. `"12abc"` -> 12, `""` -> 0.
/// Magnitudes beyond `f64::MAX` are clamped so every value stays finite.
pub fn coerce_value(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let Some(m) = LEADING_NUMBER.find(trimmed) else {
        return 0.0;
    };
    let text = m.as_str();
    let parsed = match text.trim_start_matches(['+', '-']) {
        "Infinity" if text.starts_with('-') => f64::NEG_INFINITY,
        "Infinity" => f64::INFINITY,
        _ => text.parse::<f64>().unwrap_or(0.0),
    };
    if parsed.is_nan() {
        0.0
    } else {
        parsed.clamp(-f64::MAX, f64::MAX)
    }
}

/// Collects `(input name, raw value)` pairs into parameter values.
/// Every name must be a parameter identifier.
pub fn gather_values<I, K, V>(entries: I) -> Result<ParameterValues, WizardError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut values = ParameterValues::new();
    for (name, raw) in entries {
        let param: Parameter = name.as_ref().parse()?;
        values.insert(param, coerce_value(raw.as_ref()));
    }
    Ok(values)
}

/// Urlencoded body handed to the prediction model, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn new(selected: &[Parameter], values: &ParameterValues) -> Self {
        let fields = selected
            .iter()
            .map(|p| {
                let value = values.get(p).copied().unwrap_or(0.0);
                (p.id().to_string(), value.to_string())
            })
            .collect();
        FormSubmission { fields }
    }
}

/// Stand-in for native form submission: sends the form and yields the page
/// the model answered with.
pub trait FormTransport {
    fn submit(&self, form: &FormSubmission) -> impl Future<Output = Result<String, WizardError>> + Send;
}

/// Posts the form to the prediction model.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl FormTransport for HttpTransport {
    async fn submit(&self, form: &FormSubmission) -> Result<String, WizardError> {
        debug!(endpoint = %self.endpoint, fields = form.fields.len(), "posting value form");
        let response = self
            .client
            .post(&self.endpoint)
            .form(&form.fields)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "model rejected submission");
            return Err(WizardError::Transport(format!("model responded with {status}")));
        }
        Ok(response.text().await?)
    }
}

/// Answers locally with a page carrying only the submitted values. Used when
/// no model endpoint is configured.
#[derive(Clone, Copy, Default)]
pub struct EchoTransport;

impl FormTransport for EchoTransport {
    async fn submit(&self, form: &FormSubmission) -> Result<String, WizardError> {
        let mut hydration = Hydration::default();
        for (name, raw) in &form.fields {
            let param: Parameter = name.parse()?;
            hydration.selected.push(param);
            hydration.values.insert(param, coerce_value(raw));
        }
        hydrate::render_element(&hydration)
    }
}

#[derive(Clone)]
pub enum Transport {
    Http(HttpTransport),
    Echo(EchoTransport),
}

impl Transport {
    pub fn from_model_url(url: Option<&str>) -> Self {
        match url {
            Some(url) => Transport::Http(HttpTransport::new(url)),
            None => Transport::Echo(EchoTransport),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Transport::Http(http) => format!("model at {}", http.endpoint),
            Transport::Echo(_) => "local echo (no model configured)".to_string(),
        }
    }
}

impl FormTransport for Transport {
    async fn submit(&self, form: &FormSubmission) -> Result<String, WizardError> {
        match self {
            Transport::Http(http) => http.submit(form).await,
            Transport::Echo(echo) => echo.submit(form).await,
        }
    }
}
