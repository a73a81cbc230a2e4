//! The `nepqgen list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use nepqgen_providers::config::load_config_from;
use nepqgen_providers::discover_models;

pub async fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;

    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }
        let provider_config = &config.providers[name];

        let models = match discover_models(name, provider_config).await {
            Ok(models) => models,
            Err(e) => {
                eprintln!("Provider {name}: {e:#}");
                continue;
            }
        };

        if !models.is_empty() {
            found_any = true;
            println!("Provider: {name}");
            for model in &models {
                if model.max_context > 0 {
                    println!(
                        "  {}: {} ({}K context, ${:.5}/{:.5} per 1K tokens)",
                        model.id,
                        model.name,
                        model.max_context / 1000,
                        model.cost_per_1k_input,
                        model.cost_per_1k_output,
                    );
                } else {
                    println!("  {}", model.id);
                }
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `nepqgen init` to create a config file.");
    }

    Ok(())
}
