use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 分類に使うAI CLI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Claude,
    Codex,
    Gemini,
}

impl AiProvider {
    pub fn command_name(&self) -> &'static str {
        match self {
            AiProvider::Claude => "claude",
            AiProvider::Codex => "codex",
            AiProvider::Gemini => "gemini",
        }
    }

    /// プロンプト実行用の引数（画像パスはプロンプト内で参照させる）
    pub fn prompt_args(&self, prompt: &str, model: Option<&str>) -> Vec<String> {
        let mut args = match self {
            AiProvider::Claude => vec![
                "-p".to_string(),
                prompt.to_string(),
                "--output-format".to_string(),
                "text".to_string(),
            ],
            AiProvider::Codex => vec!["exec".to_string(), prompt.to_string()],
            AiProvider::Gemini => vec!["-p".to_string(), prompt.to_string()],
        };

        if let Some(model) = model {
            args.push("--model".to_string());
            args.push(model.to_string());
        }
        args
    }
}

impl std::str::FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(AiProvider::Claude),
            "codex" => Ok(AiProvider::Codex),
            "gemini" => Ok(AiProvider::Gemini),
            _ => Err(format!("Unknown provider: {}. Use claude, codex, or gemini", s)),
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("Claude".parse::<AiProvider>(), Ok(AiProvider::Claude));
        assert_eq!("gemini".parse::<AiProvider>(), Ok(AiProvider::Gemini));
        assert!("gpt".parse::<AiProvider>().is_err());
    }

    #[test]
    fn test_prompt_args_with_model() {
        let args = AiProvider::Claude.prompt_args("hello", Some("sonnet"));
        assert_eq!(args[0], "-p");
        assert_eq!(args[1], "hello");
        assert_eq!(&args[args.len() - 2..], ["--model", "sonnet"]);
    }

    #[test]
    fn test_codex_uses_exec() {
        let args = AiProvider::Codex.prompt_args("hi", None);
        assert_eq!(args, vec!["exec", "hi"]);
    }
}
