//! 分量換算
//!
//! 100gあたりの栄養成分を任意のグラム数に換算する。
//! グラム数の検証は呼び出し側（分量入力）で行う。

use crate::types::{FoodRecord, NutritionFacts};

/// 栄養成分をグラム数で換算
///
/// `per100g * (grams / 100)` を各成分に適用する。
/// `grams` は正の有限値であること（検証済み前提、エラーなし）。
pub fn scale(food: &FoodRecord, grams: f64) -> NutritionFacts {
    food.per_100g.scaled(grams / 100.0)
}

impl NutritionFacts {
    /// 全成分に係数を掛ける
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            fat: self.fat * factor,
            carbs: self.carbs * factor,
        }
    }

    /// 表示用に小数第1位で丸める
    pub fn rounded(&self) -> Self {
        Self {
            calories: round_to_tenth(self.calories),
            protein: round_to_tenth(self.protein),
            fat: round_to_tenth(self.fat),
            carbs: round_to_tenth(self.carbs),
        }
    }
}

/// 小数第1位で四捨五入
///
/// 0.3 * 1.5 = 0.44999999999999996 のような二進誤差を先に吸収してから丸める。
pub fn round_to_tenth(value: f64) -> f64 {
    let tenths = (value * 10.0 * 1e6).round() / 1e6;
    tenths.round() / 10.0
}

/// 表示用フォーマット（"4.1"）
pub fn format_tenth(value: f64) -> String {
    format!("{:.1}", round_to_tenth(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FoodCatalog;
    use crate::types::DefaultServing;

    fn rice() -> FoodRecord {
        FoodRecord {
            id: "rice".to_string(),
            name_zh: "米饭".to_string(),
            name_en: "Rice".to_string(),
            synonyms: vec!["rice".to_string(), "fried rice".to_string()],
            per_100g: NutritionFacts::new(130.0, 2.7, 0.3, 28.0),
            default_serving: Some(DefaultServing {
                grams: 150.0,
                label: "一碗".to_string(),
            }),
        }
    }

    #[test]
    fn test_scale_identity_portion() {
        for food in FoodCatalog::builtin().all() {
            assert_eq!(scale(food, 100.0), food.per_100g, "{}", food.id);
        }
    }

    #[test]
    fn test_scale_rice_bowl() {
        let facts = scale(&rice(), 150.0).rounded();
        assert_eq!(facts, NutritionFacts::new(195.0, 4.1, 0.5, 42.0));
    }

    #[test]
    fn test_scale_monotonic() {
        let grams = [0.5, 1.0, 33.3, 99.9, 100.0, 150.0, 512.0, 2000.0];
        for food in FoodCatalog::builtin().all() {
            for pair in grams.windows(2) {
                let small = scale(food, pair[0]);
                let large = scale(food, pair[1]);
                for (s, l) in small.fields().iter().zip(large.fields().iter()) {
                    assert!(s <= l, "{}: {} > {}", food.id, s, l);
                }
            }
        }
    }

    #[test]
    fn test_round_to_tenth_half_up() {
        assert_eq!(round_to_tenth(0.45), 0.5);
        assert_eq!(round_to_tenth(0.3 * 1.5), 0.5);
        assert_eq!(round_to_tenth(2.7 * 1.5), 4.1);
        assert_eq!(round_to_tenth(0.04), 0.0);
        assert_eq!(round_to_tenth(195.0), 195.0);
    }

    #[test]
    fn test_format_tenth() {
        assert_eq!(format_tenth(42.0), "42.0");
        assert_eq!(format_tenth(2.7 * 1.5), "4.1");
        assert_eq!(format_tenth(0.3 * 1.5), "0.5");
    }
}
