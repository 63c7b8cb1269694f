// src/services/image_store.rs

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use uuid::Uuid;

use crate::common::error::AppError;

pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Armazenamento das fotos enviadas. O caminho devolvido por `put` é o que
/// fica gravado no registro.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, dir: &str, ext: &str, bytes: &[u8]) -> Result<String, AppError>;

    // Apagar um arquivo que já não existe não é erro
    async fn delete(&self, path: &str) -> Result<(), AppError>;
}

/// Confere tamanho e formato dos bytes enviados e devolve a extensão.
pub fn sniff_image(bytes: &[u8]) -> Result<&'static str, AppError> {
    if bytes.is_empty() {
        return Err(AppError::field("image", "missing_image"));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::field("image", "image_too_large"));
    }
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok("jpg"),
        Ok(ImageFormat::Png) => Ok("png"),
        Ok(ImageFormat::Gif) => Ok("gif"),
        _ => Err(AppError::field("image", "invalid_image")),
    }
}

#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // Só caminhos relativos e sem ".."
    fn resolve(&self, relative: &str) -> Result<PathBuf, AppError> {
        let path = Path::new(relative);
        let safe = !relative.is_empty()
            && path.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(anyhow::anyhow!("Caminho fora do storage: {}", relative).into());
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ImageStore for LocalDiskStore {
    async fn put(&self, dir: &str, ext: &str, bytes: &[u8]) -> Result<String, AppError> {
        let relative = format!("{}/{}.{}", dir, Uuid::new_v4(), ext);
        let full = self.resolve(&relative)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        tracing::debug!("Imagem salva em {}", full.display());
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Imagem {} já não existia", path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[tokio::test]
    async fn put_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());

        let path = store.put("workers", "png", PNG).await.unwrap();
        assert!(path.starts_with("workers/") && path.ends_with(".png"));
        assert_eq!(tokio::fs::read(dir.path().join(&path)).await.unwrap(), PNG);

        store.delete(&path).await.unwrap();
        assert!(!dir.path().join(&path).exists());
    }

    #[tokio::test]
    async fn deleting_a_missing_file_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());
        assert!(store.delete("workers/nope.png").await.is_ok());
    }

    #[tokio::test]
    async fn paths_escaping_the_root_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path());
        assert!(store.delete("../etc/passwd").await.is_err());
        assert!(store.delete("/etc/passwd").await.is_err());
        assert!(store.put("..", "png", PNG).await.is_err());
    }

    #[test]
    fn sniffing_accepts_only_small_jpeg_png_gif() {
        assert_eq!(sniff_image(PNG).unwrap(), "png");
        assert_eq!(sniff_image(b"\xFF\xD8\xFF\xE0\0\x10JFIF").unwrap(), "jpg");
        assert_eq!(sniff_image(b"GIF89a\x01\0\x01\0").unwrap(), "gif");
        assert!(sniff_image(b"plain text").is_err());
        assert!(sniff_image(&[]).is_err());

        let mut big = PNG.to_vec();
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(sniff_image(&big).is_err());
    }
}
