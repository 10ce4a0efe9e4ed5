//! 推論結果キャッシュモジュール
//!
//! 画像内容のSHA-256をキーにして推論結果をキャッシュし、
//! 同じ画像の再分類をスキップする。
//! `CachedLoader` / `CachedModel` で任意の分類器に被せて使う。

use super::{ImageClassifier, ModelLoader};
use crate::error::Result;
use crate::image_source::DecodedImage;
use food_ai_common::Prediction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const CACHE_FILE_NAME: &str = ".food-ai-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionCache {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 画像ハッシュ → 推論結果のマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub file_name: String,
    pub predictions: Vec<Prediction>,
}

impl PredictionCache {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（なし・破損・バージョン違いは空扱い）
    pub fn load(dir: &Path) -> Self {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        match serde_json::from_reader::<_, PredictionCache>(BufReader::new(file)) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                warn!("キャッシュバージョン不一致、再生成します");
                Self::default()
            }
            Err(_) => Self::default(),
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(Self::cache_path(dir))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// キャッシュファイルを削除。削除したらtrue
    pub fn clear(dir: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(dir);
        if cache_path.exists() {
            std::fs::remove_file(cache_path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn get(&self, hash: &str) -> Option<&[Prediction]> {
        self.entries.get(hash).map(|e| e.predictions.as_slice())
    }

    pub fn insert(&mut self, hash: String, file_name: String, predictions: Vec<Prediction>) {
        self.entries.insert(hash, CacheEntry {
            file_name,
            predictions,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PredictionCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// キャッシュ付きローダー
pub struct CachedLoader<L> {
    inner: L,
    dir: PathBuf,
}

impl<L: ModelLoader> CachedLoader<L> {
    pub fn new(inner: L, dir: PathBuf) -> Self {
        Self { inner, dir }
    }
}

impl<L: ModelLoader> ModelLoader for CachedLoader<L> {
    type Model = CachedModel<L::Model>;

    async fn load(&self) -> Result<Self::Model> {
        let inner = self.inner.load().await?;
        let cache = PredictionCache::load(&self.dir);
        debug!(entries = cache.len(), "推論キャッシュ読み込み");
        Ok(CachedModel::new(inner, cache, self.dir.clone()))
    }
}

/// キャッシュ付きモデル
pub struct CachedModel<M> {
    inner: M,
    cache: Mutex<PredictionCache>,
    /// ファイル書き込みを直列化（古い内容で上書きしない）
    save_lock: tokio::sync::Mutex<()>,
    dir: PathBuf,
}

impl<M> CachedModel<M> {
    fn new(inner: M, cache: PredictionCache, dir: PathBuf) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            save_lock: tokio::sync::Mutex::new(()),
            dir,
        }
    }

    /// 現在の内容をブロッキングスレッドで保存。失敗は警告のみ
    async fn persist(&self) {
        let _guard = self.save_lock.lock().await;
        let snapshot = match self.cache.lock() {
            Ok(cache) => cache.clone(),
            Err(_) => return,
        };
        let dir = self.dir.clone();

        match tokio::task::spawn_blocking(move || snapshot.save(&dir)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "推論キャッシュ保存失敗"),
            Err(e) => warn!(error = %e, "推論キャッシュ保存タスク失敗"),
        }
    }
}

impl<M: ImageClassifier> ImageClassifier for CachedModel<M> {
    async fn classify(&self, image: &DecodedImage) -> Result<Vec<Prediction>> {
        let hit = self
            .cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(image.digest()).map(|p| p.to_vec()));
        if let Some(predictions) = hit {
            debug!(file = image.name(), "推論キャッシュヒット");
            return Ok(predictions);
        }

        let predictions = self.inner.classify(image).await?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                image.digest().to_string(),
                image.name().to_string(),
                predictions.clone(),
            );
        }
        self.persist().await;

        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cache_empty() {
        let dir = tempdir().unwrap();
        let cache = PredictionCache::load(dir.path());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_save_and_load() {
        let dir = tempdir().unwrap();
        let mut cache = PredictionCache::load(dir.path());
        cache.insert(
            "abc123".to_string(),
            "lunch.jpg".to_string(),
            vec![Prediction::new("pizza", 0.7)],
        );
        cache.save(dir.path()).unwrap();

        let loaded = PredictionCache::load(dir.path());
        assert_eq!(loaded.len(), 1);
        let predictions = loaded.get("abc123").expect("キャッシュが見つからない");
        assert_eq!(predictions[0].class_name, "pizza");
    }

    #[test]
    fn test_cache_corrupted_file() {
        let dir = tempdir().unwrap();
        std::fs::write(PredictionCache::cache_path(dir.path()), "{ invalid json }").unwrap();
        assert!(PredictionCache::load(dir.path()).is_empty());
    }

    #[test]
    fn test_cache_version_mismatch() {
        let dir = tempdir().unwrap();
        std::fs::write(
            PredictionCache::cache_path(dir.path()),
            r#"{"version": 99, "entries": {"h": {"file_name": "a.jpg", "predictions": []}}}"#,
        )
        .unwrap();
        assert!(PredictionCache::load(dir.path()).is_empty());
    }

    #[test]
    fn test_cache_clear() {
        let dir = tempdir().unwrap();
        PredictionCache::default().save(dir.path()).unwrap();
        assert!(PredictionCache::clear(dir.path()).unwrap());
        assert!(!PredictionCache::clear(dir.path()).unwrap());
    }

    struct EchoModel;

    impl ImageClassifier for EchoModel {
        async fn classify(&self, image: &DecodedImage) -> Result<Vec<Prediction>> {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            Ok(vec![Prediction::new(image.name(), 0.5)])
        }
    }

    #[tokio::test]
    async fn test_concurrent_classify_keeps_all_entries() {
        let dir = tempdir().unwrap();
        let model = CachedModel::new(EchoModel, PredictionCache::default(), dir.path().to_path_buf());
        let small = DecodedImage::new("small.png", image::DynamicImage::new_rgb8(4, 4));
        let large = DecodedImage::new("large.png", image::DynamicImage::new_rgb8(8, 8));

        let (a, b) = tokio::join!(model.classify(&small), model.classify(&large));
        assert_eq!(a.unwrap()[0].class_name, "small.png");
        assert_eq!(b.unwrap()[0].class_name, "large.png");

        let loaded = PredictionCache::load(dir.path());
        assert_eq!(loaded.len(), 2);
        assert!(loaded.get(small.digest()).is_some());
        assert!(loaded.get(large.digest()).is_some());
    }
}
