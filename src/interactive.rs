//! 対話式の手動選択・分量入力

use crate::classifier::ModelLoader;
use crate::display::{render_nutrition, render_portion};
use crate::error::{FoodAiError, Result};
use crate::session::ClassificationSession;
use dialoguer::{Input, Select};
use food_ai_common::FoodRecord;

/// カタログから食品を手動選択（中国語名順）
///
/// 照合済みの食品があればそれを既定値にし、別の食品で置き換えられる。
/// Escは現状維持、「不选择」は選択解除。選択が変わったらtrue
pub fn choose_food<L: ModelLoader>(session: &ClassificationSession<L>) -> Result<bool> {
    let foods = session.catalog().sorted_by_name_zh();
    let current = session.snapshot().selection.map(|s| s.food.id);

    let mut items = vec!["（不选择）".to_string()];
    items.extend(foods.iter().map(|f| f.display_name()));

    let prompt = if current.is_some() {
        "如需更换食物请重新选择（Esc 保持当前）"
    } else {
        "请选择食物"
    };

    let choice = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index(&foods, current.as_deref()))
        .interact_opt()
        .map_err(|e| FoodAiError::Interactive(e.to_string()))?;

    match choice {
        None => Ok(false),
        Some(0) => {
            if current.is_none() {
                return Ok(false);
            }
            session.clear_selection();
            Ok(true)
        }
        Some(index) => {
            let food = foods[index - 1];
            if current.as_deref() == Some(food.id.as_str()) {
                return Ok(false);
            }
            Ok(session.select_food(&food.id).is_some())
        }
    }
}

/// 選択肢の既定位置（先頭は「不选择」）
fn default_index(foods: &[&FoodRecord], current: Option<&str>) -> usize {
    current
        .and_then(|id| foods.iter().position(|f| f.id == id))
        .map_or(0, |i| i + 1)
}

/// 分量を対話入力。空入力で終了
///
/// 不正な入力は警告のみで、表示中の栄養成分は変えない
pub fn edit_portion<L: ModelLoader>(session: &ClassificationSession<L>) -> Result<()> {
    loop {
        let snapshot = session.snapshot();
        let Some(selection) = snapshot.selection else {
            return Ok(());
        };

        let input: String = Input::new()
            .with_prompt(format!("份量（克）[当前 {}，回车结束]", render_portion(&selection)))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| FoodAiError::Interactive(e.to_string()))?;

        if input.trim().is_empty() {
            return Ok(());
        }

        match session.set_portion(&input) {
            Ok(_) => {
                if let Some(nutrition) = session.snapshot().nutrition {
                    println!("{}", render_nutrition(&nutrition));
                }
            }
            Err(e) => println!("⚠ {}", e),
        }
    }
}
