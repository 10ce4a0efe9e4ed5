//! プロンプト生成モジュール
//!
//! AI CLIを画像分類器として使う場合のプロンプト。
//! 出力は ImageNet 形式の英語ラベルと確率の配列に限定する。

/// 分類プロンプト生成
///
/// # Arguments
/// * `file_name` - 画像ファイル名（プロンプト内の参照用）
/// * `top_k` - 返させるラベル数
pub fn build_classify_prompt(file_name: &str, top_k: usize) -> String {
    let top_k = top_k.max(1);

    format!(
        r#"You are an image classifier. Classify the photo "{file_name}".

## Rules
- Return the {top_k} most likely labels, most likely first.
- Labels are short lowercase English nouns in ImageNet style (e.g. "pizza", "granny smith", "fried rice", "plate").
- probability is a number between 0 and 1. Probabilities must be in descending order.
- If nothing can be recognized, return an empty array [].

## Output format (output ONLY this JSON array)
[
  {{"className": "label", "probability": 0.0}}
]"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_classify_prompt() {
        let prompt = build_classify_prompt("lunch.jpg", 5);
        assert!(prompt.contains("lunch.jpg"));
        assert!(prompt.contains("Return the 5 most likely labels"));
        assert!(prompt.contains("\"className\""));
        assert!(prompt.contains("\"probability\""));
    }

    #[test]
    fn test_build_classify_prompt_min_top_k() {
        let prompt = build_classify_prompt("x.png", 0);
        assert!(prompt.contains("Return the 1 most likely labels"));
    }
}
