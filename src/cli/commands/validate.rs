//! Validate configuration command.

use anyhow::Result;
use insight_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Quote API: {}", config.data.base_url);
    println!(
        "Rate limit: {} requests / {}s, {}ms apart",
        config.data.rate_limit.max_requests,
        config.data.rate_limit.window_secs,
        config.data.rate_limit.delay_ms
    );
    println!("Bars per series: {}", config.data.output_size);
    println!("S/R tolerance: {}%", config.analysis.tolerance_pct);
    let blend = &config.analysis.blend;
    println!(
        "Target blend: CAGR {:.2}, ATR {:.2}, regression {:.2}, levels {:.2}, value area {:.2}",
        blend.cagr, blend.atr, blend.regression, blend.level, blend.value_area
    );

    Ok(())
}
