//! AI CLI連携の分類器
//!
//! claude / codex / gemini の各CLIに画像を読ませ、
//! ImageNet形式のラベルと確率をJSON配列で返させる。
//! - load: CLIが実行可能かを `--version` で確認
//! - classify: 縮小PNGを作業ディレクトリに書き出してプロンプトで参照させる

use super::{ImageClassifier, ModelLoader};
use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::{FoodAiError, Result};
use crate::image_source::DecodedImage;
use food_ai_common::{build_classify_prompt, parse_predictions, Prediction};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

static TEMP_SERIAL: AtomicU64 = AtomicU64::new(0);

/// AI CLIモデルのローダー
#[derive(Debug, Clone)]
pub struct AiCliLoader {
    provider: AiProvider,
    model: Option<String>,
    top_k: usize,
    max_image_size: u32,
    timeout: Duration,
    work_dir: PathBuf,
}

impl AiCliLoader {
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider: config.ai_provider,
            model: config.model.clone(),
            top_k: config.top_k.max(1),
            max_image_size: config.max_image_size.max(32),
            timeout: Duration::from_secs(config.timeout_seconds.max(1)),
            work_dir: std::env::temp_dir().join("food-ai"),
        }
    }
}

impl ModelLoader for AiCliLoader {
    type Model = AiCliModel;

    async fn load(&self) -> Result<AiCliModel> {
        let program = self.provider.command_name();
        info!(provider = program, "分類モデル読み込み");

        let version = run_command(program, &["--version".to_string()], self.timeout)
            .await
            .map_err(|e| FoodAiError::ModelLoad(format!("{} CLIを起動できません: {}", program, e)))?;
        debug!(version = version.trim(), "CLIバージョン");

        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| FoodAiError::ModelLoad(format!("作業ディレクトリ作成失敗: {}", e)))?;

        Ok(AiCliModel {
            provider: self.provider,
            model: self.model.clone(),
            top_k: self.top_k,
            max_image_size: self.max_image_size,
            timeout: self.timeout,
            work_dir: self.work_dir.clone(),
        })
    }
}

/// 読み込み済みのAI CLIモデル
#[derive(Debug, Clone)]
pub struct AiCliModel {
    provider: AiProvider,
    model: Option<String>,
    top_k: usize,
    max_image_size: u32,
    timeout: Duration,
    work_dir: PathBuf,
}

impl ImageClassifier for AiCliModel {
    async fn classify(&self, image: &DecodedImage) -> Result<Vec<Prediction>> {
        let png = {
            let image = image.clone();
            let max_size = self.max_image_size;
            tokio::task::spawn_blocking(move || image.encode_png(max_size))
                .await
                .map_err(|e| FoodAiError::Classification(format!("エンコードタスク失敗: {}", e)))??
        };

        let temp_path = self.temp_image_path(image.digest());
        tokio::fs::write(&temp_path, png)
            .await
            .map_err(|e| FoodAiError::Classification(format!("一時ファイル書き込み失敗: {}", e)))?;

        let image_path = temp_path.display().to_string().replace('\\', "/");
        let raw_prompt = format!(
            "Read the following image file and classify it: {}\n\n{}",
            image_path,
            build_classify_prompt(image.name(), self.top_k)
        );
        let prompt = flatten_prompt(&raw_prompt);
        debug!(chars = prompt.len(), "分類プロンプト");

        let args = self.provider.prompt_args(&prompt, self.model.as_deref());
        let result = run_command(self.provider.command_name(), &args, self.timeout).await;

        // 失敗しても一時ファイルは消す
        let _ = tokio::fs::remove_file(&temp_path).await;

        let response = result.map_err(FoodAiError::Classification)?;
        debug!(chars = response.len(), "分類レスポンス");

        let mut predictions = parse_predictions(&response)
            .map_err(|e| FoodAiError::Classification(e.to_string()))?;
        predictions.truncate(self.top_k);
        Ok(predictions)
    }
}

impl AiCliModel {
    /// 要求ごとに別の一時ファイル名（同じ画像の同時要求で衝突しない）
    fn temp_image_path(&self, digest: &str) -> PathBuf {
        let stem = digest.get(..16).unwrap_or(digest);
        let serial = TEMP_SERIAL.fetch_add(1, Ordering::Relaxed);
        self.work_dir
            .join(format!("{}-{}-{}.png", stem, std::process::id(), serial))
    }
}

/// 改行をスペースに（Windowsではcmd経由なので引用符もエスケープ）
fn flatten_prompt(prompt: &str) -> String {
    let flat = prompt.replace('\n', " ");
    if cfg!(windows) {
        flat.replace('"', "\\\"")
    } else {
        flat
    }
}

/// CLIを実行してstdoutを返す（タイムアウト付き）
async fn run_command(program: &str, args: &[String], timeout: Duration) -> std::result::Result<String, String> {
    // Windowsではcmd /c経由
    #[cfg(windows)]
    let mut command = {
        let mut command = Command::new("cmd");
        command.arg("/c").arg(program).args(args);
        command
    };

    #[cfg(not(windows))]
    let mut command = {
        let mut command = Command::new(program);
        command.args(args);
        command
    };

    command.kill_on_drop(true);

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| format!("{} が{}秒以内に応答しませんでした", program, timeout.as_secs()))?
        .map_err(|e| format!("{} 実行エラー: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} failed (code {:?}): {}",
            program,
            output.status.code(),
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
