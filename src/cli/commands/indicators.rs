//! List indicators command.

use anyhow::Result;
use insight_signals::CATALOGUE;

pub async fn run() -> Result<()> {
    println!("Classified Indicators");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("  {:<24} {:<11} {:>6}  Horizon", "Indicator", "Category", "Weight");
    println!("  ───────────────────────────────────────────────────────");

    for info in CATALOGUE.iter() {
        println!(
            "  {:<24} {:<11} {:>6.1}  {}",
            info.name,
            info.category.to_string(),
            info.weight,
            info.timeframe
        );
    }

    println!();
    println!("Signals range from -3 (strong bearish) to +3 (strong bullish).");

    Ok(())
}
