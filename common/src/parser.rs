//! 分類器レスポンスパーサー
//!
//! AI CLIなどのレスポンスからJSONを抽出し、推論結果の配列をパースする

use crate::error::{Error, Result};
use crate::types::Prediction;

/// レスポンスからJSON配列部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の [...] 配列
/// 3. エラー
///
/// # Examples
/// ```
/// use food_ai_common::extract_json;
///
/// let response = "result: [{\"className\": \"pizza\"}]";
/// let json = extract_json(response).unwrap();
/// assert!(json.starts_with('['));
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + "```json".len();
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) {
        if end >= start {
            return Ok(&response[start..=end]);
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 推論結果レスポンスをパース
///
/// 順序は分類器のまま維持する（並べ替えない）。
/// 確率は [0, 1] に収め、数値でないものは0として扱う。
///
/// # Returns
/// * `Ok(Vec<Prediction>)` - パース成功（空配列もあり得る）
/// * `Err` - JSONが見つからないかパース失敗
pub fn parse_predictions(response: &str) -> Result<Vec<Prediction>> {
    let json_str = extract_json(response)?;
    let predictions: Vec<Prediction> = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("推論結果 JSONパースエラー: {}", e)))?;

    Ok(predictions
        .into_iter()
        .map(|mut p| {
            p.probability = if p.probability.is_finite() {
                p.probability.clamp(0.0, 1.0)
            } else {
                0.0
            };
            p
        })
        .collect())
}
