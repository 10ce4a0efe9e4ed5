//! 分類セッション
//!
//! 1画面分の状態（モデル・推論結果・選択状態）を保持し、分類の流れを管理する。
//!
//! ## 処理フロー
//! 1. 要求開始: 世代番号を進め、前回の推論結果・選択・ステータスを消す
//! 2. モデル取得: 初回のみ読み込み、同時要求は同じ読み込みを待つ
//! 3. 画像デコード → 分類 → カタログ照合
//! 4. 各待機点の後、世代番号が最新でなければ結果を捨てる（後勝ち）

use crate::classifier::{ImageClassifier, ModelLoader};
use crate::error::{FoodAiError, Result};
use crate::image_source::{load_image, DecodedImage};
use food_ai_common::{
    match_predictions, FoodCatalog, FoodMatch, FoodRecord, InvalidPortion, NutritionFacts,
    Prediction, Selection, SelectionState,
};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// 分類要求の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    LoadingModel,
    Classifying,
    DisplayingResult,
    Error,
}

/// 分類要求の結果
#[derive(Debug)]
pub enum ClassifyOutcome {
    /// カタログと一致
    Matched(FoodMatch),
    /// 分類は成功したが推論結果が空
    NoPredictions,
    /// 推論結果はあるがカタログに一致なし（手動選択が必要）
    NoMatch(Vec<Prediction>),
    /// モデル読み込み・デコード・分類の失敗
    Failed(FoodAiError),
    /// 新しい要求に置き換えられた（状態は変更していない）
    Superseded,
}

/// 表示層向けのスナップショット
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub status: Option<String>,
    pub predictions: Vec<Prediction>,
    pub selection: Option<Selection>,
    /// 丸め済み。食品未選択ならNone（非表示）
    pub nutrition: Option<NutritionFacts>,
}

#[derive(Debug)]
struct SessionState {
    generation: u64,
    phase: Phase,
    status: Option<String>,
    predictions: Vec<Prediction>,
    selection: SelectionState,
}

impl SessionState {
    fn reset_display(&mut self) {
        self.status = None;
        self.predictions.clear();
        self.selection.clear();
    }
}

enum ImageInput<'a> {
    Path(&'a Path),
    Decoded(DecodedImage),
}

/// 分類セッション
pub struct ClassificationSession<L: ModelLoader> {
    loader: L,
    catalog: Arc<FoodCatalog>,
    /// 読み込み結果（失敗も含めて保持。`reload_model`まで再試行しない）
    model: OnceCell<std::result::Result<Arc<L::Model>, String>>,
    state: Mutex<SessionState>,
}

impl<L: ModelLoader> ClassificationSession<L> {
    pub fn new(loader: L, catalog: impl Into<Arc<FoodCatalog>>) -> Self {
        Self {
            loader,
            catalog: catalog.into(),
            model: OnceCell::new(),
            state: Mutex::new(SessionState {
                generation: 0,
                phase: Phase::Idle,
                status: None,
                predictions: Vec::new(),
                selection: SelectionState::new(),
            }),
        }
    }

    pub fn catalog(&self) -> &FoodCatalog {
        &self.catalog
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.model.get(), Some(Ok(_)))
    }

    /// モデルを取得（初回のみ読み込み）
    pub async fn model(&self) -> Result<Arc<L::Model>> {
        let outcome = self
            .model
            .get_or_init(|| async {
                info!("モデル読み込み開始");
                match self.loader.load().await {
                    Ok(model) => {
                        info!("モデル読み込み完了");
                        Ok(Arc::new(model))
                    }
                    Err(e) => {
                        warn!(error = %e, "モデル読み込み失敗");
                        Err(match e {
                            FoodAiError::ModelLoad(msg) => msg,
                            other => other.to_string(),
                        })
                    }
                }
            })
            .await;

        outcome.clone().map_err(FoodAiError::ModelLoad)
    }

    /// モデルの再読み込みを許可（明示的な再試行）
    pub fn reload_model(&mut self) {
        self.model = OnceCell::new();
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        if state.phase == Phase::Error {
            state.phase = Phase::Idle;
            state.status = None;
        }
    }

    /// 画像ファイルを分類
    pub async fn classify_file(&self, path: &Path) -> ClassifyOutcome {
        let request = self.begin_request();
        self.run(request, ImageInput::Path(path)).await
    }

    /// デコード済み画像を分類
    pub async fn classify_image(&self, image: DecodedImage) -> ClassifyOutcome {
        let request = self.begin_request();
        self.run(request, ImageInput::Decoded(image)).await
    }

    /// 表示を全てクリア（新しい画像・空ファイル）。進行中の要求は無効になる
    pub fn clear(&self) {
        let mut state = self.lock_state();
        state.generation += 1;
        state.reset_display();
        state.phase = Phase::Idle;
    }

    /// 手動で食品を選択。見つからなければ選択なしにする
    pub fn select_food(&self, id: &str) -> Option<FoodRecord> {
        let food = self.catalog.find_by_id(id).cloned();

        let mut state = self.lock_state();
        // 手動選択は進行中の分類結果より優先
        state.generation += 1;
        match &food {
            Some(food) => {
                state.selection.select(food.clone());
                state.status = Some(format!("已选择：{}", food.name_zh));
                state.phase = Phase::DisplayingResult;
            }
            None => {
                debug!(id, "カタログにない食品ID");
                state.selection.clear();
                if matches!(state.phase, Phase::LoadingModel | Phase::Classifying) {
                    state.phase = Phase::Idle;
                }
            }
        }
        food
    }

    /// 手動選択を解除（推論結果の表示は残す）
    pub fn clear_selection(&self) {
        let mut state = self.lock_state();
        state.generation += 1;
        state.selection.clear();
        if matches!(state.phase, Phase::LoadingModel | Phase::Classifying) {
            state.phase = Phase::Idle;
        }
    }

    /// 分量入力を選択中の食品に適用
    ///
    /// 不正なら表示中の栄養成分はそのまま。食品未選択なら検証のみで `Ok(None)`
    pub fn set_portion(&self, input: &str) -> std::result::Result<Option<f64>, InvalidPortion> {
        let mut state = self.lock_state();
        let grams = state.selection.set_portion(input)?;
        Ok(state.selection.current().map(|_| grams))
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        SessionSnapshot {
            phase: state.phase,
            status: state.status.clone(),
            predictions: state.predictions.clone(),
            selection: state.selection.current().cloned(),
            nutrition: state.selection.nutrition(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 要求開始。古い表示は結果を待たずに消す
    fn begin_request(&self) -> u64 {
        let mut state = self.lock_state();
        state.generation += 1;
        state.reset_display();
        state.phase = Phase::LoadingModel;
        debug!(request = state.generation, "分類要求開始");
        state.generation
    }

    fn transition(&self, request: u64, phase: Phase) -> bool {
        let mut state = self.lock_state();
        if state.generation != request {
            return false;
        }
        state.phase = phase;
        true
    }

    async fn run(&self, request: u64, input: ImageInput<'_>) -> ClassifyOutcome {
        match self.predict(request, input).await {
            Ok(Some(predictions)) => self.finish(request, predictions),
            Ok(None) => {
                debug!(request, "新しい要求に置き換えられました");
                ClassifyOutcome::Superseded
            }
            Err(e) => self.fail(request, e),
        }
    }

    /// モデル取得〜分類。置き換えられたらNone
    async fn predict(&self, request: u64, input: ImageInput<'_>) -> Result<Option<Vec<Prediction>>> {
        let model = self.model().await?;
        if !self.transition(request, Phase::Classifying) {
            return Ok(None);
        }

        let image = match input {
            ImageInput::Path(path) => load_image(path).await?,
            ImageInput::Decoded(image) => image,
        };
        if !self.transition(request, Phase::Classifying) {
            return Ok(None);
        }

        let predictions = model.classify(&image).await?;
        debug!(request, count = predictions.len(), "分類完了");
        Ok(Some(predictions))
    }

    fn finish(&self, request: u64, predictions: Vec<Prediction>) -> ClassifyOutcome {
        let mut state = self.lock_state();
        if state.generation != request {
            debug!(request, "古い分類結果を破棄");
            return ClassifyOutcome::Superseded;
        }

        state.phase = Phase::DisplayingResult;

        if predictions.is_empty() {
            state.status = Some("未识别出任何内容，请手动选择食物。".to_string());
            return ClassifyOutcome::NoPredictions;
        }

        let matched = match_predictions(&predictions, &self.catalog);
        state.predictions = predictions;

        match matched {
            Some(found) => {
                info!(food = %found.food.id, label = %found.prediction.class_name, "カタログ一致");
                state.status = Some(format!(
                    "识别结果：{}（{}）",
                    found.food.name_zh,
                    found.prediction.percent()
                ));
                state.selection.select(found.food.clone());
                ClassifyOutcome::Matched(found)
            }
            None => {
                info!("カタログに一致なし");
                state.status = Some("营养数据库中没有匹配的食物，请手动选择。".to_string());
                ClassifyOutcome::NoMatch(state.predictions.clone())
            }
        }
    }

    fn fail(&self, request: u64, error: FoodAiError) -> ClassifyOutcome {
        let mut state = self.lock_state();
        if state.generation != request {
            debug!(request, error = %error, "古い要求のエラーを破棄");
            return ClassifyOutcome::Superseded;
        }

        warn!(error = %error, "分類失敗");
        state.reset_display();
        state.phase = Phase::Error;
        state.status = Some(error.status_message());
        ClassifyOutcome::Failed(error)
    }
}
