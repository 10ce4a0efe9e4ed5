//! 画面表示用の文字列生成

use crate::session::SessionSnapshot;
use food_ai_common::{format_tenth, FoodCatalog, FoodRecord, NutritionFacts, Prediction, Selection};

/// 推論結果一覧
pub fn render_predictions(predictions: &[Prediction]) -> String {
    predictions
        .iter()
        .enumerate()
        .map(|(i, p)| format!("  {}. {} ({})", i + 1, p.class_name, p.percent()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 分量の表示（"150g（一碗）"）
pub fn render_portion(selection: &Selection) -> String {
    let grams = format!("{}g", trim_number(selection.portion_grams));
    match selection.food.default_serving.as_ref() {
        Some(serving) if serving.grams == selection.portion_grams => {
            format!("{}（{}）", grams, serving.label)
        }
        _ => grams,
    }
}

/// 栄養成分表
pub fn render_nutrition(facts: &NutritionFacts) -> String {
    [
        ("热量", facts.calories, "kcal"),
        ("蛋白质", facts.protein, "g"),
        ("脂肪", facts.fat, "g"),
        ("碳水化合物", facts.carbs, "g"),
    ]
    .iter()
    .map(|(label, value, unit)| format!("  {}\t{:>8} {}", label, format_tenth(*value), unit))
    .collect::<Vec<_>>()
    .join("\n")
}

/// スナップショット全体
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut lines = Vec::new();

    if let Some(status) = &snapshot.status {
        lines.push(status.clone());
    }

    if !snapshot.predictions.is_empty() {
        lines.push("识别候选:".to_string());
        lines.push(render_predictions(&snapshot.predictions));
    }

    // 食品未選択時は栄養成分を出さない
    if let (Some(selection), Some(nutrition)) = (&snapshot.selection, &snapshot.nutrition) {
        lines.push(String::new());
        lines.push(format!(
            "{}  {}",
            selection.food.display_name(),
            render_portion(selection)
        ));
        lines.push(render_nutrition(nutrition));
    }

    lines.join("\n")
}

/// カタログ一覧（中国語名順）
pub fn render_catalog(catalog: &FoodCatalog) -> String {
    catalog
        .sorted_by_name_zh()
        .into_iter()
        .map(render_catalog_row)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_catalog_row(food: &FoodRecord) -> String {
    let serving = match &food.default_serving {
        Some(s) => format!("{}g（{}）", trim_number(s.grams), s.label),
        None => "100g".to_string(),
    };
    format!(
        "  {:<14} {}  {} kcal/100g  默认 {}",
        food.id,
        food.display_name(),
        format_tenth(food.per_100g.calories),
        serving
    )
}

/// 整数なら小数点なしで表示
fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format_tenth(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Phase;
    use food_ai_common::SelectionState;

    fn rice_selection(input: Option<&str>) -> SelectionState {
        let catalog = FoodCatalog::builtin();
        let mut state = SelectionState::new();
        state.select(catalog.find_by_id("rice").cloned().unwrap());
        if let Some(input) = input {
            state.set_portion(input).unwrap();
        }
        state
    }

    #[test]
    fn test_render_portion_with_serving_label() {
        let state = rice_selection(None);
        assert_eq!(render_portion(state.current().unwrap()), "150g（一碗）");
    }

    #[test]
    fn test_render_portion_custom() {
        let state = rice_selection(Some("212.5"));
        assert_eq!(render_portion(state.current().unwrap()), "212.5g");
    }

    #[test]
    fn test_render_nutrition_rice_bowl() {
        let state = rice_selection(None);
        let text = render_nutrition(&state.nutrition().unwrap());
        assert!(text.contains("195.0 kcal"));
        assert!(text.contains("4.1 g"));
        assert!(text.contains("0.5 g"));
        assert!(text.contains("42.0 g"));
    }

    #[test]
    fn test_render_snapshot_hides_nutrition_without_food() {
        let snapshot = SessionSnapshot {
            phase: Phase::DisplayingResult,
            status: Some("没有匹配".to_string()),
            predictions: vec![Prediction::new("napkin", 0.9)],
            selection: None,
            nutrition: None,
        };
        let text = render_snapshot(&snapshot);
        assert!(text.contains("napkin (90.0%)"));
        assert!(!text.contains("kcal"));
    }

    #[test]
    fn test_render_catalog_lists_all() {
        let catalog = FoodCatalog::builtin();
        let text = render_catalog(&catalog);
        assert_eq!(text.lines().count(), catalog.len());
        assert!(text.contains("米饭 / Rice"));
    }
}
