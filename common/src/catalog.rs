//! 食品カタログモジュール
//!
//! 起動時に一度だけ構築される読み取り専用の食品リスト。
//! 組み込みデータ（`FoodCatalog::builtin`）か、JSONファイルから読み込む。
//! 構築時に検証し、以後は追加・変更・削除しない。

use crate::error::{Error, Result};
use crate::types::{DefaultServing, FoodRecord, NutritionFacts};
use std::collections::HashSet;

/// 食品カタログ
#[derive(Debug, Clone)]
pub struct FoodCatalog {
    foods: Vec<FoodRecord>,
}

impl FoodCatalog {
    /// レコードから構築（検証付き）
    pub fn from_records(foods: Vec<FoodRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for food in &foods {
            validate_record(food)?;
            if !seen.insert(food.id.as_str()) {
                return Err(Error::InvalidCatalog(format!("重複したID: {}", food.id)));
            }
        }
        Ok(Self { foods })
    }

    /// JSON文字列から読み込み（FoodRecordの配列）
    pub fn from_json(json: &str) -> Result<Self> {
        let foods: Vec<FoodRecord> = serde_json::from_str(json)?;
        Self::from_records(foods)
    }

    /// JSONファイルから読み込み（非WASM環境のみ）
    #[cfg(not(feature = "wasm"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 全レコード（定義順）
    pub fn all(&self) -> &[FoodRecord] {
        &self.foods
    }

    /// IDで検索。見つからなければNone（エラーではない）
    pub fn find_by_id(&self, id: &str) -> Option<&FoodRecord> {
        self.foods.iter().find(|f| f.id == id)
    }

    /// 中国語名でソートした一覧（手動選択リスト用）
    pub fn sorted_by_name_zh(&self) -> Vec<&FoodRecord> {
        let mut sorted: Vec<&FoodRecord> = self.foods.iter().collect();
        sorted.sort_by(|a, b| a.name_zh.cmp(&b.name_zh));
        sorted
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// 組み込みカタログ
    pub fn builtin() -> Self {
        Self {
            foods: vec![
                food("rice", "米饭", "Rice", &["rice", "fried rice"],
                    (130.0, 2.7, 0.3, 28.0), Some((150.0, "一碗"))),
                food("noodles", "面条", "Noodles", &["noodle", "spaghetti", "carbonara", "ramen"],
                    (158.0, 5.8, 0.9, 31.0), Some((200.0, "一碗"))),
                food("bread", "面包", "Bread", &["bread", "french loaf", "bagel", "beigel", "pretzel"],
                    (265.0, 9.0, 3.2, 49.0), Some((60.0, "两片"))),
                food("hotdog", "热狗", "Hot dog", &["hotdog", "hot dog"],
                    (247.0, 10.6, 14.8, 18.0), Some((98.0, "一个"))),
                food("burger", "汉堡", "Hamburger", &["cheeseburger", "hamburger", "burger"],
                    (295.0, 17.0, 14.0, 24.0), Some((150.0, "一个"))),
                food("pizza", "披萨", "Pizza", &["pizza"],
                    (266.0, 11.0, 10.0, 33.0), Some((107.0, "一片"))),
                food("burrito", "墨西哥卷饼", "Burrito", &["burrito"],
                    (206.0, 8.0, 7.0, 26.0), Some((220.0, "一个"))),
                food("mashed_potato", "土豆泥", "Mashed potato", &["mashed potato", "potato"],
                    (113.0, 2.0, 4.2, 17.0), Some((200.0, "一份"))),
                food("egg", "鸡蛋", "Egg", &["egg", "omelet"],
                    (155.0, 13.0, 11.0, 1.1), Some((50.0, "一个"))),
                food("apple", "苹果", "Apple", &["apple", "granny smith"],
                    (52.0, 0.3, 0.2, 14.0), Some((180.0, "一个"))),
                food("banana", "香蕉", "Banana", &["banana"],
                    (89.0, 1.1, 0.3, 23.0), Some((120.0, "一根"))),
                food("orange", "橙子", "Orange", &["orange"],
                    (47.0, 0.9, 0.1, 12.0), Some((150.0, "一个"))),
                food("strawberry", "草莓", "Strawberry", &["strawberry"],
                    (32.0, 0.7, 0.3, 7.7), None),
                food("broccoli", "西兰花", "Broccoli", &["broccoli", "cauliflower"],
                    (34.0, 2.8, 0.4, 7.0), None),
                food("corn", "玉米", "Corn", &["corn"],
                    (96.0, 3.4, 1.5, 21.0), Some((90.0, "一根"))),
                food("mushroom", "蘑菇", "Mushroom", &["mushroom", "agaric"],
                    (22.0, 3.1, 0.3, 3.3), None),
                food("ice_cream", "冰淇淋", "Ice cream", &["ice cream", "icecream"],
                    (207.0, 3.5, 11.0, 24.0), Some((66.0, "一球"))),
                food("coffee", "咖啡", "Espresso", &["espresso", "coffee"],
                    (9.0, 0.1, 0.2, 1.7), Some((30.0, "一杯"))),
            ],
        }
    }
}

impl Default for FoodCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn food(
    id: &str,
    name_zh: &str,
    name_en: &str,
    synonyms: &[&str],
    per_100g: (f64, f64, f64, f64),
    serving: Option<(f64, &str)>,
) -> FoodRecord {
    let (calories, protein, fat, carbs) = per_100g;
    FoodRecord {
        id: id.to_string(),
        name_zh: name_zh.to_string(),
        name_en: name_en.to_string(),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        per_100g: NutritionFacts::new(calories, protein, fat, carbs),
        default_serving: serving.map(|(grams, label)| DefaultServing {
            grams,
            label: label.to_string(),
        }),
    }
}

/// レコード単体の検証
fn validate_record(food: &FoodRecord) -> Result<()> {
    let invalid = |msg: String| Err(Error::InvalidCatalog(format!("{}: {}", food.id, msg)));

    if food.id.trim().is_empty() {
        return Err(Error::InvalidCatalog("IDが空です".into()));
    }
    if food.name_zh.trim().is_empty() || food.name_en.trim().is_empty() {
        return invalid("名称が空です".into());
    }
    if food.synonyms.is_empty() {
        return invalid("同義語がありません".into());
    }
    for synonym in &food.synonyms {
        // 空文字は全ラベルに一致してしまう
        if synonym.trim().is_empty() {
            return invalid("空の同義語".into());
        }
        if *synonym != synonym.to_lowercase() {
            return invalid(format!("同義語は小文字で指定してください: {}", synonym));
        }
    }
    if food.per_100g.fields().iter().any(|v| !v.is_finite() || *v < 0.0) {
        return invalid("栄養成分は0以上の有限値が必要です".into());
    }
    if let Some(serving) = &food.default_serving {
        if !serving.grams.is_finite() || serving.grams <= 0.0 {
            return invalid(format!("推奨分量が不正: {}", serving.grams));
        }
    }
    Ok(())
}
