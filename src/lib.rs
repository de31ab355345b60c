//! Adaptive difficulty and affect analysis for spoken-answer learning sessions.
//!
//! The crate turns a finished mono waveform into acoustic features, scores
//! the learner's affect from those features, and keeps a per-session 3PL
//! ability estimate that picks the difficulty of the next item.

pub mod affect;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod irt;
pub mod session;
pub mod types;

pub use affect::{AffectAnalyzer, Emotion, EmotionalState, EmotionalTrend, TrendDirection};
pub use config::AppConfig;
pub use error::{AdaptError, Result};
pub use features::{FeatureExtractor, FeatureVector};
pub use irt::{AbilityEstimator, AbilityState, PerformanceStatistics, SkillLevel};
pub use session::{AnswerChecker, SessionAdapter, SessionStatistics};
pub use types::{AudioData, CandidateItem, ItemDifficulty, ResponseEvent};
