//! Signal classification, scoring and horizon recommendations.
//!
//! The pipeline runs synchronously over an immutable bar slice:
//! indicator series, detector outputs, one classified reading per indicator,
//! the aggregate score, four horizon recommendations and a summary.

pub mod analysis;
pub mod classifier;
pub mod horizon;
pub mod indicator_set;
pub mod score;
pub mod summary;

pub use analysis::{AnalysisReport, AnalysisSettings, TechnicalAnalyzer};
pub use classifier::{catalogue_entry, IndicatorInfo, IndicatorKind, Reading, SignalClassifier, CATALOGUE};
pub use horizon::{
    BlendWeights, HorizonRecommendation, HorizonRecommender, ProjectionContext, Recommendation,
    TargetComponents,
};
pub use indicator_set::{Detections, DetectorSettings, IndicatorSet};
pub use score::{AiScore, Rating};
pub use summary::{render_summary, SummaryContext};
