//! 分量入力の検証
//!
//! 入力文字列を正の有限なグラム数として解釈する。
//! 不正な入力は `InvalidPortion` を返すだけで、表示中の値は呼び出し側で維持する。

use thiserror::Error;

/// 不正な分量入力
#[derive(Error, Debug, Clone, PartialEq)]
#[error("分量が不正です: '{input}'（正の数値を入力してください）")]
pub struct InvalidPortion {
    pub input: String,
}

/// 分量入力をパース
///
/// # Examples
/// ```
/// use food_ai_common::parse_portion;
///
/// assert_eq!(parse_portion(" 150 ").unwrap(), 150.0);
/// assert!(parse_portion("-5").is_err());
/// ```
pub fn parse_portion(input: &str) -> Result<f64, InvalidPortion> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_suffix('g')
        .or_else(|| trimmed.strip_suffix('克'))
        .unwrap_or(trimmed)
        .trim_end();

    match trimmed.parse::<f64>() {
        Ok(grams) => validate_portion(grams).map_err(|_| InvalidPortion {
            input: input.to_string(),
        }),
        Err(_) => Err(InvalidPortion {
            input: input.to_string(),
        }),
    }
}

/// 数値としての分量を検証
pub fn validate_portion(grams: f64) -> Result<f64, InvalidPortion> {
    if grams.is_finite() && grams > 0.0 {
        Ok(grams)
    } else {
        Err(InvalidPortion {
            input: grams.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(parse_portion("150").unwrap(), 150.0);
        assert_eq!(parse_portion("12.5").unwrap(), 12.5);
        assert_eq!(parse_portion("200g").unwrap(), 200.0);
        assert_eq!(parse_portion("80 克").unwrap(), 80.0);
    }

    #[test]
    fn test_parse_negative() {
        let err = parse_portion("-5").unwrap_err();
        assert_eq!(err.input, "-5");
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_parse_rejects_zero_and_garbage() {
        for input in ["0", "", "   ", "abc", "NaN", "inf", "-inf", "1e400"] {
            assert!(parse_portion(input).is_err(), "受理された: {:?}", input);
        }
    }

    #[test]
    fn test_validate_portion() {
        assert_eq!(validate_portion(0.1), Ok(0.1));
        assert!(validate_portion(f64::NAN).is_err());
        assert!(validate_portion(-0.0).is_err());
    }
}
