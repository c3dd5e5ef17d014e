//! `zettelflow health` - language model reachability

use serde::Serialize;

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json};
use zettelflow_core::config::VaultConfig;
use zettelflow_core::error::{Result, ZettelError};
use zettelflow_core::llm::{self, QualityGateway};

#[derive(Debug, Serialize)]
struct HealthReport<'a> {
    enabled: bool,
    base_url: &'a str,
    model: &'a str,
    embed_model: &'a str,
    available: bool,
}

/// Probe the configured service; an unreachable service is a failure
pub fn execute(cli: &Cli, config: &VaultConfig) -> Result<()> {
    let model = llm::from_config(&config.llm);
    let available = QualityGateway::new(&*model).health_check();
    let report = HealthReport {
        enabled: config.llm.enabled,
        base_url: &config.llm.base_url,
        model: &config.llm.model,
        embed_model: &config.llm.embed_model,
        available,
    };

    output_by_format_result!(cli.format,
        json => print_json(&report),
        human => {
            let state = if available { "available" } else { "unreachable" };
            println!("{} at {}: {}", report.model, report.base_url, state);
            if !report.enabled {
                println!("LLM calls are disabled in the configuration.");
            }
        }
    )?;

    if !available {
        return Err(ZettelError::Other(format!(
            "language model service at {} is not available",
            config.llm.base_url
        )));
    }
    Ok(())
}
