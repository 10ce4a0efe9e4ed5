//! 推論結果とカタログの照合
//!
//! 推論結果を上位から順に見て、ラベル（小文字化）に同義語を
//! 部分文字列として含むカタログエントリを探す。最初に一致した推論結果で
//! 打ち切り、それ以降の推論結果は参照しない。
//! スコアリングはしない（単純なキーワード一致）。

use crate::catalog::FoodCatalog;
use crate::types::{FoodMatch, FoodRecord, Prediction};

/// 推論結果リストをカタログと照合
///
/// # Arguments
/// * `predictions` - 分類器の順位どおりの推論結果（並べ替えない）
/// * `catalog` - 食品カタログ
///
/// # Returns
/// * `Some(FoodMatch)` - 最初に一致した食品と、その推論結果
/// * `None` - 一致なし（空リストを含む）
pub fn match_predictions(predictions: &[Prediction], catalog: &FoodCatalog) -> Option<FoodMatch> {
    predictions.iter().find_map(|prediction| {
        match_label(&prediction.class_name, catalog).map(|food| FoodMatch {
            food: food.clone(),
            prediction: prediction.clone(),
        })
    })
}

/// ラベル1件をカタログと照合（カタログ定義順で最初の一致）
pub fn match_label<'a>(label: &str, catalog: &'a FoodCatalog) -> Option<&'a FoodRecord> {
    let label = label.to_lowercase();
    if label.trim().is_empty() {
        return None;
    }

    catalog
        .all()
        .iter()
        .find(|food| food.synonyms.iter().any(|s| label.contains(s.as_str())))
}
