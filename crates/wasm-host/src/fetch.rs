//! # WASMバイナリフェッチャ
//!
//! ## フェッチャ実装
//! - `HttpFetcher`: URL経由でWASMバイナリを取得する（本番用）
//! - `FileFetcher`: ローカルファイルから読み込む（開発・テスト用）

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use hibana_core::{ArtifactFetcher, ArtifactStream, BootstrapError, ByteSource, PendingFetch};

/// URL経由でWASMバイナリを取得するフェッチャ。
/// レスポンスボディは到着順にストリーミングコンパイルへ流れる。
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> PendingFetch {
        let client = self.client.clone();
        let url = url.to_string();
        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| BootstrapError::Fetch(format!("HTTP送信失敗 ({url}): {e}")))?;
            if !response.status().is_success() {
                return Err(BootstrapError::Fetch(format!(
                    "HTTPエラー: ステータス {} ({url})",
                    response.status()
                )));
            }
            Ok(ArtifactStream::new(Box::new(ResponseSource { response })))
        })
    }
}

/// 受信中のHTTPレスポンスボディをチャンク単位で流すソース。
struct ResponseSource {
    response: reqwest::Response,
}

impl ByteSource for ResponseSource {
    fn next_chunk(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Bytes>, BootstrapError>> + Send + '_>> {
        Box::pin(async move {
            self.response
                .chunk()
                .await
                .map_err(|e| BootstrapError::Fetch(format!("レスポンス読み取り失敗: {e}")))
        })
    }
}

/// ローカルファイルからWASMバイナリを読み込むフェッチャ。
/// ロケータはそのままファイルパスとして解釈する。
pub struct FileFetcher;

impl ArtifactFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> PendingFetch {
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        Box::pin(async move {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                BootstrapError::Fetch(format!(
                    "WASMバイナリの読み込みに失敗 ({}): {e}",
                    path.display()
                ))
            })?;
            Ok(ArtifactStream::from_bytes(bytes))
        })
    }
}
