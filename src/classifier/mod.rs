//! 画像分類器
//!
//! 分類器は外部の能力として扱い、以下の2つの契約だけに依存する:
//! - `ModelLoader::load`: モデルの初期化（失敗し得る）
//! - `ImageClassifier::classify`: 順位付きの推論結果（空もあり得る）

mod ai_cli;
pub mod cache;

pub use ai_cli::{AiCliLoader, AiCliModel};
pub use cache::{CachedLoader, CachedModel, PredictionCache};

use crate::error::Result;
use crate::image_source::DecodedImage;
use food_ai_common::Prediction;
use std::future::Future;

/// 読み込み済みモデル
pub trait ImageClassifier: Send + Sync {
    /// 推論結果を分類器の順位どおりに返す
    fn classify(&self, image: &DecodedImage) -> impl Future<Output = Result<Vec<Prediction>>> + Send;
}

/// モデルの読み込み
pub trait ModelLoader: Send + Sync {
    type Model: ImageClassifier;

    fn load(&self) -> impl Future<Output = Result<Self::Model>> + Send;
}
