//! 食品・推論結果の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - FoodRecord: 食品カタログの1エントリ
//! - NutritionFacts: 栄養成分（100gあたり or 分量換算後）
//! - Prediction: 画像分類器の出力1件
//! - FoodMatch: 照合結果（食品 + 照合元の推論結果）

use serde::{Deserialize, Serialize};

/// 分量未指定時のデフォルト（g）
pub const DEFAULT_PORTION_GRAMS: f64 = 100.0;

/// 栄養成分
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: f64,  // kcal
    pub protein: f64,   // g
    pub fat: f64,       // g
    pub carbs: f64,     // g
}

impl NutritionFacts {
    pub fn new(calories: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self { calories, protein, fat, carbs }
    }

    /// 各フィールドを配列で返す（検証・比較用）
    pub fn fields(&self) -> [f64; 4] {
        [self.calories, self.protein, self.fat, self.carbs]
    }
}

/// 推奨分量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultServing {
    pub grams: f64,
    pub label: String,  // 表示用（例: "一碗"）
}

/// 食品カタログのエントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    pub id: String,
    pub name_zh: String,
    pub name_en: String,

    /// 小文字の部分文字列。ラベルに含まれていれば一致
    pub synonyms: Vec<String>,

    #[serde(rename = "per100g")]
    pub per_100g: NutritionFacts,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_serving: Option<DefaultServing>,
}

impl FoodRecord {
    /// 実効デフォルト分量（推奨分量がなければ100g）
    pub fn default_grams(&self) -> f64 {
        self.default_serving
            .as_ref()
            .map_or(DEFAULT_PORTION_GRAMS, |s| s.grams)
    }

    /// 推奨分量のラベル（なければNone）
    pub fn serving_label(&self) -> Option<&str> {
        self.default_serving.as_ref().map(|s| s.label.as_str())
    }

    /// 表示名（"米饭 / Rice"）
    pub fn display_name(&self) -> String {
        format!("{} / {}", self.name_zh, self.name_en)
    }
}

/// 画像分類器の推論結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub class_name: String,
    #[serde(default)]
    pub probability: f64,
}

impl Prediction {
    pub fn new(class_name: impl Into<String>, probability: f64) -> Self {
        Self {
            class_name: class_name.into(),
            probability,
        }
    }

    /// 確率をパーセント表記に（"82.0%"）
    pub fn percent(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodMatch {
    pub food: FoodRecord,
    pub prediction: Prediction,
}
