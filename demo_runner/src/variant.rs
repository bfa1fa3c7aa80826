//! Presets for the three demo pages.
//!
use clap::ValueEnum;
use stability_classifier::StabilityConfig;

use crate::{
    render::{ImageRenderer, KeywordRenderer, PoseRenderer},
    sink::{ElementBoard, ElementMap, EventSink},
};

pub const SWITCH_ON_WORD: &str = "tænd";
pub const SWITCH_OFF_WORD: &str = "sluk";

const KEYWORD_SENTINELS: [&str; 2] = ["background noise", "unknown"];
/// Word predictions below this score are not reported by the recognizer.
const KEYWORD_MIN_SCORE: f32 = 0.7;

const KEYWORD_ELEMENTS: [&str; 3] = ["kaffe", "lys", "tv"];
const IMAGE_ELEMENTS: [&str; 3] = ["metal", "plastik", "restaffald"];
const POSE_ELEMENTS: [&str; 3] = ["upward-salute", "extended-side", "warrior"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Variant {
    /// Speech commands switching household devices on and off.
    Keyword,
    /// Waste sorting: the recognised object opens its bin.
    Image,
    /// Yoga poses held until complete.
    Pose,
}

impl Variant {
    /// Stability settings for this page over the model's labels.
    pub fn config(&self, labels: Vec<String>) -> StabilityConfig {
        let config = StabilityConfig::new(labels);
        match self {
            Variant::Keyword => config
                .with_min_dwell_ms(0)
                .with_min_score(KEYWORD_MIN_SCORE)
                .with_sentinel_labels(self.sentinel_labels()),
            Variant::Image => config.with_min_dwell_ms(1000),
            Variant::Pose => config
                .with_min_dwell_ms(1000)
                .with_grace_ms(500)
                .with_hold_to_complete_ms(5000),
        }
    }

    pub fn elements(&self) -> &'static [&'static str] {
        match self {
            Variant::Keyword => &KEYWORD_ELEMENTS,
            Variant::Image => &IMAGE_ELEMENTS,
            Variant::Pose => &POSE_ELEMENTS,
        }
    }

    pub fn sentinel_labels(&self) -> Vec<String> {
        match self {
            Variant::Keyword => KEYWORD_SENTINELS.iter().map(|s| s.to_string()).collect(),
            Variant::Image | Variant::Pose => Vec::new(),
        }
    }

    pub fn renderer(&self) -> Box<dyn EventSink + Send> {
        let board = ElementBoard::new(self.elements().iter().copied());
        let elements = ElementMap::identity(self.elements());

        match self {
            Variant::Keyword => Box::new(KeywordRenderer::new(
                board,
                elements,
                SWITCH_ON_WORD,
                SWITCH_OFF_WORD,
                &self.sentinel_labels(),
            )),
            Variant::Image => Box::new(ImageRenderer::new(board, elements)),
            Variant::Pose => Box::new(PoseRenderer::new(board, elements)),
        }
    }
}
