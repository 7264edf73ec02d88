//! Templated natural-language summary with `**bold**` emphasis.

use insight_core::types::{Direction, SeriesSource};
use insight_patterns::{Divergence, PatternMatch};

use crate::horizon::HorizonRecommendation;
use crate::score::AiScore;

/// Inputs for the summary paragraph.
pub struct SummaryContext<'a> {
    pub symbol: &'a str,
    pub price: f64,
    pub source: SeriesSource,
    pub score: &'a AiScore,
    pub horizons: &'a [HorizonRecommendation],
    pub patterns: &'a [PatternMatch],
    pub divergence: Option<&'a Divergence>,
}

/// Render the summary shown under the analysis.
pub fn render_summary(ctx: &SummaryContext<'_>) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "**{}** is rated **{}** with an AI score of **{:.1}**/100 ({} bullish, {} neutral, {} bearish signals).",
        ctx.symbol,
        ctx.score.rating,
        ctx.score.score,
        ctx.score.bullish,
        ctx.score.neutral,
        ctx.score.bearish
    ));

    for rec in ctx.horizons {
        s.push_str(&format!(
            " Over **{}** the outlook is **{}** ({:.0}% confidence) with a target of **{:.2}** ({:+.1}%).",
            rec.horizon, rec.recommendation, rec.confidence, rec.target_price, rec.upside_pct
        ));
    }

    if let Some(first) = ctx.horizons.first() {
        if let Some(driver) = first.drivers.first() {
            s.push_str(&format!(" The leading short-term driver is {}.", driver));
        }
    }

    if let Some(latest) = ctx.patterns.last() {
        let tone = match latest.direction {
            Direction::Bullish => "bullish",
            Direction::Bearish => "bearish",
            Direction::Neutral => "neutral",
        };
        s.push_str(&format!(
            " The most recent candlestick pattern is a {} **{}** ({}).",
            tone,
            latest.pattern,
            latest.strength.to_string().to_lowercase()
        ));
    }

    if let Some(divergence) = ctx.divergence {
        let kind = if divergence.is_bullish() { "bullish" } else { "bearish" };
        s.push_str(&format!(
            " RSI shows a **{} divergence** at {:.2}.",
            kind, divergence.price
        ));
    }

    if ctx.source == SeriesSource::Synthetic {
        s.push_str(" **Note:** live data was unavailable and this analysis uses a synthetic series.");
    }

    s.push_str(&format!(" Last close: **{:.2}**.", ctx.price));
    s
}
