pub mod data;

pub use data::{DecisionRecord, ExtractedClaim, ImagePair, SignalBundle, Suggestion};
