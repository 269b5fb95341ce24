use clap::Parser;
use std::net::SocketAddr;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Water-quality prediction wizard", long_about = None)]
pub struct Config {
    /// Address to serve the wizard on
    #[arg(long, env = "WIZARD_ADDR", default_value = "127.0.0.1:3000")]
    pub addr: SocketAddr,

    /// Prediction model endpoint receiving the value form. Without one the
    /// submitted values are charted directly.
    #[arg(long, env = "WIZARD_MODEL_URL")]
    pub model_url: Option<String>,

    /// Keep entered values in the inputs when a submission fails
    #[arg(long, env = "WIZARD_RETAIN_VALUES")]
    pub retain_values_on_failure: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["water-wizard"]).unwrap();
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert!(!config.retain_values_on_failure);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn flags_override() {
        let config = Config::try_parse_from([
            "water-wizard",
            "--addr",
            "0.0.0.0:8080",
            "--model-url",
            "http://localhost:5000/predict",
            "--retain-values-on-failure",
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.model_url.as_deref(), Some("http://localhost:5000/predict"));
        assert!(config.retain_values_on_failure);
    }
}
