//! Form wizard that collects water-quality measurements, hands them to a
//! prediction model and charts the submitted values with Chart.js.

pub mod catalog;
pub mod charts;
pub mod config;
pub mod error;
pub mod hydrate;
pub mod inputs;
pub mod page;
pub mod server;
pub mod submit;
pub mod view;
pub mod wizard;

pub use catalog::{Parameter, ParameterValues, ALL_PARAMETERS};
pub use error::WizardError;
pub use wizard::{Step, WizardState};
