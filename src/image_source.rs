//! 画像読み込み
//!
//! ファイルを非同期で読み込み、デコードする。
//! デコード失敗は分類失敗とは別のエラー（`ImageDecode`）として返す。

use crate::error::{FoodAiError, Result};
use image::{DynamicImage, ImageFormat};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::Path;

/// デコード済み画像
#[derive(Debug, Clone)]
pub struct DecodedImage {
    name: String,
    image: DynamicImage,
    digest: String,
}

impl DecodedImage {
    /// デコード済みの画像から作成（ダイジェストは画素データから計算）
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        let digest = sha256_hex(image.as_bytes());
        Self {
            name: name.into(),
            image,
            digest,
        }
    }

    /// エンコード済みバイト列からデコード
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        if bytes.is_empty() {
            return Err(FoodAiError::EmptyImage(name));
        }

        let image = image::load_from_memory(bytes)
            .map_err(|e| FoodAiError::ImageDecode(format!("{}: {}", name, e)))?;

        Ok(Self {
            digest: sha256_hex(bytes),
            name,
            image,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 内容のSHA-256（16進）。キャッシュキーに使う
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// 長辺が `max_size` を超える場合は縮小
    pub fn downscaled(&self, max_size: u32) -> DynamicImage {
        if self.image.width() > max_size || self.image.height() > max_size {
            self.image.thumbnail(max_size, max_size)
        } else {
            self.image.clone()
        }
    }

    /// PNGとしてエンコード（縮小付き）
    pub fn encode_png(&self, max_size: u32) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.downscaled(max_size)
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| FoodAiError::Classification(format!("画像エンコード失敗: {}", e)))?;
        Ok(buffer.into_inner())
    }
}

/// 画像ファイルを読み込んでデコード
pub async fn load_image(path: &Path) -> Result<DecodedImage> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FoodAiError::FileNotFound(path.display().to_string()));
        }
        Err(e) => return Err(FoodAiError::ImageDecode(format!("{}: {}", name, e))),
    };

    // デコードはCPU処理なのでブロッキングスレッドで
    tokio::task::spawn_blocking(move || DecodedImage::from_bytes(name, &bytes))
        .await
        .map_err(|e| FoodAiError::ImageDecode(format!("デコードタスク失敗: {}", e)))?
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::tempdir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_from_bytes_empty() {
        let result = DecodedImage::from_bytes("empty.jpg", &[]);
        assert!(matches!(result, Err(FoodAiError::EmptyImage(_))));
    }

    #[test]
    fn test_from_bytes_garbage() {
        let result = DecodedImage::from_bytes("bad.jpg", b"not an image");
        assert!(matches!(result, Err(FoodAiError::ImageDecode(_))));
    }

    #[test]
    fn test_from_bytes_png() {
        let image = DecodedImage::from_bytes("ok.png", &png_bytes(8, 4)).unwrap();
        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.digest().len(), 64);
    }

    #[test]
    fn test_digest_is_content_based() {
        let a = DecodedImage::from_bytes("a.png", &png_bytes(4, 4)).unwrap();
        let b = DecodedImage::from_bytes("b.png", &png_bytes(4, 4)).unwrap();
        let c = DecodedImage::from_bytes("c.png", &png_bytes(5, 4)).unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn test_downscaled_keeps_aspect() {
        let image = DecodedImage::new("big.png", DynamicImage::ImageRgb8(RgbImage::new(1000, 500)));
        let small = image.downscaled(100);
        assert_eq!((small.width(), small.height()), (100, 50));

        let same = image.downscaled(2000);
        assert_eq!((same.width(), same.height()), (1000, 500));
    }

    #[tokio::test]
    async fn test_load_image_not_found() {
        let result = load_image(Path::new("/nonexistent/photo.jpg")).await;
        assert!(matches!(result, Err(FoodAiError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_load_image_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();

        let result = load_image(&path).await;
        assert!(matches!(result, Err(FoodAiError::EmptyImage(name)) if name == "empty.jpg"));
    }

    #[tokio::test]
    async fn test_load_image_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lunch.png");
        std::fs::write(&path, png_bytes(3, 3)).unwrap();

        let image = load_image(&path).await.unwrap();
        assert_eq!(image.name(), "lunch.png");
        assert_eq!(image.dimensions(), (3, 3));
    }
}
