//! 選択状態
//!
//! 現在表示中の食品と分量。分類成功・手動選択で置き換え、
//! 新しい画像・空ファイル・選択解除でクリアする。永続化しない。

use crate::portion::{parse_portion, InvalidPortion};
use crate::scaler::scale;
use crate::types::{FoodRecord, NutritionFacts, DEFAULT_PORTION_GRAMS};
use serde::Serialize;

/// 現在の選択
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub food: FoodRecord,
    pub portion_grams: f64,
}

impl Selection {
    /// 換算後の栄養成分（丸め前）
    pub fn nutrition(&self) -> NutritionFacts {
        scale(&self.food, self.portion_grams)
    }
}

/// 選択状態（食品なしを含む）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    current: Option<Selection>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 食品を選択し、分量を推奨分量（なければ100g）に初期化
    pub fn select(&mut self, food: FoodRecord) {
        let portion_grams = food.default_grams();
        self.current = Some(Selection { food, portion_grams });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn current_food(&self) -> Option<&FoodRecord> {
        self.current.as_ref().map(|s| &s.food)
    }

    /// 現在の分量（食品未選択時は100g）
    pub fn portion_grams(&self) -> f64 {
        self.current
            .as_ref()
            .map_or(DEFAULT_PORTION_GRAMS, |s| s.portion_grams)
    }

    /// 分量入力を適用
    ///
    /// 不正な入力では何も変更しない（表示中の栄養成分はそのまま）。
    /// 食品未選択時は検証のみ行う。
    pub fn set_portion(&mut self, input: &str) -> Result<f64, InvalidPortion> {
        let grams = parse_portion(input)?;
        self.apply_portion(grams);
        Ok(grams)
    }

    fn apply_portion(&mut self, grams: f64) {
        if let Some(selection) = self.current.as_mut() {
            selection.portion_grams = grams;
        }
    }

    /// 表示用の栄養成分（丸め済み）。食品未選択時はNone（非表示）
    pub fn nutrition(&self) -> Option<NutritionFacts> {
        self.current.as_ref().map(|s| s.nutrition().rounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FoodCatalog;

    fn catalog() -> FoodCatalog {
        FoodCatalog::builtin()
    }

    #[test]
    fn test_select_initializes_default_serving() {
        let mut state = SelectionState::new();
        state.select(catalog().find_by_id("rice").cloned().unwrap());
        assert_eq!(state.portion_grams(), 150.0);
        assert_eq!(
            state.nutrition(),
            Some(NutritionFacts::new(195.0, 4.1, 0.5, 42.0))
        );
    }

    #[test]
    fn test_select_without_serving_uses_100g() {
        let mut state = SelectionState::new();
        let strawberry = catalog().find_by_id("strawberry").cloned().unwrap();
        assert!(strawberry.default_serving.is_none());
        state.select(strawberry.clone());
        assert_eq!(state.portion_grams(), 100.0);
        assert_eq!(state.nutrition(), Some(strawberry.per_100g.rounded()));
    }

    #[test]
    fn test_invalid_portion_keeps_previous_display() {
        let mut state = SelectionState::new();
        state.select(catalog().find_by_id("rice").cloned().unwrap());
        let before = state.nutrition();

        let err = state.set_portion("-5").unwrap_err();
        assert_eq!(err.input, "-5");
        assert_eq!(state.portion_grams(), 150.0);
        assert_eq!(state.nutrition(), before);
    }

    #[test]
    fn test_valid_portion_rescales() {
        let mut state = SelectionState::new();
        state.select(catalog().find_by_id("rice").cloned().unwrap());
        assert_eq!(state.set_portion("200").unwrap(), 200.0);
        assert_eq!(state.nutrition().unwrap().calories, 260.0);
    }

    #[test]
    fn test_reselect_resets_portion() {
        let mut state = SelectionState::new();
        state.select(catalog().find_by_id("rice").cloned().unwrap());
        state.set_portion("300").unwrap();
        state.select(catalog().find_by_id("banana").cloned().unwrap());
        assert_eq!(state.portion_grams(), 120.0);
    }

    #[test]
    fn test_clear_hides_nutrition() {
        let mut state = SelectionState::new();
        state.select(catalog().find_by_id("rice").cloned().unwrap());
        state.clear();
        assert!(state.current_food().is_none());
        assert!(state.nutrition().is_none());
    }
}
