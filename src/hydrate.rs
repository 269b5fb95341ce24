//! The data-carrying page element a results page embeds so the wizard can
//! re-enter at the results step.
use askama::Template;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::{Parameter, ParameterValues};
use crate::error::WizardError;

pub const DATA_ELEMENT_ID: &str = "chartData";

static DATA_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<[a-zA-Z][^>]*\sid\s*=\s*["']chartData["'][^>]*>"#).expect("static regex")
});
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z][\w-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("static regex")
});
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("static regex"));

/// Model verdict shown next to the charts when the model supplies one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub prob_organic: Option<f64>,
    pub prob_inorganic: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hydration {
    pub selected: Vec<Parameter>,
    pub values: ParameterValues,
    pub prediction: Option<Prediction>,
}

/// Finds the `chartData` element in `html`. `Ok(None)` when the page has
/// none; an error when it is present but its attributes do not parse.
pub fn extract(html: &str) -> Result<Option<Hydration>, WizardError> {
    let Some(tag) = DATA_ELEMENT.find(html) else {
        return Ok(None);
    };
    let attrs: HashMap<String, String> = ATTRIBUTE
        .captures_iter(tag.as_str())
        .filter_map(|cap| {
            let name = cap.get(1)?.as_str().to_ascii_lowercase();
            let value = cap.get(2).or_else(|| cap.get(3))?.as_str();
            Some((name, unescape_html(value)))
        })
        .collect();

    let params = attrs
        .get("data-params")
        .ok_or_else(|| WizardError::Hydration("missing data-params".to_string()))?;
    let values = attrs
        .get("data-values")
        .ok_or_else(|| WizardError::Hydration("missing data-values".to_string()))?;
    let selected: Vec<Parameter> = serde_json::from_str(params)?;
    let values: ParameterValues = serde_json::from_str(values)?;

    let prediction = attrs.get("data-prediction").map(|label| Prediction {
        label: label.clone(),
        prob_organic: attrs.get("data-prob-organic").and_then(|p| p.parse().ok()),
        prob_inorganic: attrs.get("data-prob-inorganic").and_then(|p| p.parse().ok()),
    });

    Ok(Some(Hydration {
        selected,
        values,
        prediction,
    }))
}

#[derive(Template)]
#[template(path = "chart_data.html")]
struct ChartDataTemplate<'a> {
    params: String,
    values: String,
    prediction: Option<&'a Prediction>,
}

pub fn render_element(hydration: &Hydration) -> Result<String, WizardError> {
    let element = ChartDataTemplate {
        params: serde_json::to_string(&hydration.selected)?,
        values: serde_json::to_string(&hydration.values)?,
        prediction: hydration.prediction.as_ref(),
    };
    Ok(element.render()?)
}

/// Decodes character references in an attribute value in a single pass, so
/// decoded text is never decoded again.
fn unescape_html(s: &str) -> String {
    ENTITY
        .replace_all(s, |cap: &Captures| {
            let entity = &cap[1];
            let hex = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"));
            let decoded = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "amp" => Some('&'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| cap[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_element_is_not_an_error() {
        assert_eq!(extract("<html><body><p>hi</p></body></html>").unwrap(), None);
    }

    #[test]
    fn reads_server_rendered_attributes() {
        let page = r#"<section id="step3" class="step active">
<div class="prediction">Organic</div>
<div id="chartData" data-params='["ph", "bod"]' data-values='{"ph": 6.2, "bod": 3.4}'
     data-prediction="Organic" data-prob-organic="0.81" data-prob-inorganic="0.19"></div>
</section>"#;
        let h = extract(page).unwrap().unwrap();
        assert_eq!(h.selected, vec![Parameter::Ph, Parameter::Bod]);
        assert_eq!(h.values[&Parameter::Ph], 6.2);
        assert_eq!(h.values[&Parameter::Bod], 3.4);
        let prediction = h.prediction.unwrap();
        assert_eq!(prediction.label, "Organic");
        assert_eq!(prediction.prob_organic, Some(0.81));
        assert_eq!(prediction.prob_inorganic, Some(0.19));
    }

    #[test]
    fn rendered_element_reads_back() {
        let mut h = Hydration {
            selected: vec![Parameter::HeavyMetals, Parameter::Ph],
            ..Hydration::default()
        };
        h.values.insert(Parameter::HeavyMetals, 4.0);
        h.values.insert(Parameter::Ph, 8.25);
        let html = render_element(&h).unwrap();
        assert!(!html.contains(r#""heavyMetals""#));
        assert_eq!(extract(&html).unwrap(), Some(h));
    }

    #[test]
    fn model_label_reads_back_verbatim() {
        for label in ["{{chart_script}}", r#"<b>"Organic" & 'clean'</b>"#, "&amp;quot;", "µS/cm"] {
            let h = Hydration {
                selected: vec![Parameter::Ph],
                values: [(Parameter::Ph, 7.0)].into_iter().collect(),
                prediction: Some(Prediction {
                    label: label.to_string(),
                    prob_organic: Some(0.5),
                    prob_inorganic: None,
                }),
            };
            let html = render_element(&h).unwrap();
            assert_eq!(html.matches('<').count(), 2);
            assert_eq!(extract(&html).unwrap(), Some(h));
        }
    }

    #[test]
    fn data_id_attribute_is_not_the_data_element() {
        let page = r#"<div data-id="chartData"></div>
<div id="chartData" data-params='["bod"]' data-values='{"bod": 1.5}'></div>"#;
        let h = extract(page).unwrap().unwrap();
        assert_eq!(h.selected, vec![Parameter::Bod]);
        assert_eq!(h.values[&Parameter::Bod], 1.5);
    }

    #[test]
    fn decodes_named_and_numeric_references() {
        assert_eq!(unescape_html("&quot;a&#34;&#x27;&#39;&lt;&gt;&amp;lt;"), r#""a"''<>&lt;"#);
        assert_eq!(unescape_html("&nbsp;&#xZZ;"), "&nbsp;&#xZZ;");
    }

    #[test]
    fn malformed_json_is_reported() {
        let page = r#"<div id="chartData" data-params="[ph" data-values="{}"></div>"#;
        assert!(matches!(extract(page), Err(WizardError::Hydration(_))));
    }

    #[test]
    fn unknown_parameter_in_data_is_reported() {
        let page = r#"<div id="chartData" data-params='["salinity"]' data-values='{}'></div>"#;
        assert!(matches!(extract(page), Err(WizardError::Hydration(_))));
    }
}
