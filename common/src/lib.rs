//! Food AI Common Library
//!
//! CLIとWeb(WASM)で共有される食品カタログ・照合・分量換算

pub mod types;
pub mod catalog;
pub mod error;
pub mod matcher;
pub mod scaler;
pub mod portion;
pub mod selection;
pub mod parser;
pub mod prompts;

pub use types::{DefaultServing, FoodMatch, FoodRecord, NutritionFacts, Prediction, DEFAULT_PORTION_GRAMS};
pub use catalog::FoodCatalog;
pub use error::{Error, Result};
pub use matcher::{match_label, match_predictions};
pub use scaler::{format_tenth, round_to_tenth, scale};
pub use portion::{parse_portion, validate_portion, InvalidPortion};
pub use selection::{Selection, SelectionState};
pub use parser::{extract_json, parse_predictions};
pub use prompts::build_classify_prompt;
