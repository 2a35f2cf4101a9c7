//! # シムモジュールローダー
//!
//! シムはマニフェスト(JSON)として配布される。マニフェストは公開する
//! ケイパビリティを名前で列挙するだけで、バージョン番号を持たない。
//! ローダーは宣言された名前にネイティブランタイムサポートを機械的に
//! 束ねるだけで、世代の判定はディスパッチャ側の責務。
//!
//! ## ローダー実装
//! - `HttpShimLoader`: URL経由でマニフェストを取得する（本番用）
//! - `FileShimLoader`: ローカルファイルから読み込む（開発・テスト用）

pub mod revisions;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use hibana_core::{ShimExports, ShimLoader};
use hibana_types::ShimManifest;
use wasmtime::Engine;

/// URL経由でシムマニフェストを取得するローダー。
pub struct HttpShimLoader {
    /// HTTPクライアント
    client: reqwest::Client,
    /// ランタイムサポートを束ねるエンジン
    engine: Engine,
}

impl HttpShimLoader {
    pub fn new(client: reqwest::Client, engine: Engine) -> Self {
        Self { client, engine }
    }
}

impl ShimLoader for HttpShimLoader {
    fn load<'a>(
        &'a self,
        shim_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ShimExports, String>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(shim_url)
                .send()
                .await
                .map_err(|e| format!("シムマニフェストの取得に失敗 ({shim_url}): {e}"))?;
            if !response.status().is_success() {
                return Err(format!(
                    "シムマニフェスト取得でHTTPエラー: ステータス {} ({shim_url})",
                    response.status()
                ));
            }
            let manifest: ShimManifest = response
                .json()
                .await
                .map_err(|e| format!("シムマニフェストのパースに失敗 ({shim_url}): {e}"))?;
            Ok(revisions::bind(&manifest, self.engine.clone()))
        })
    }
}

/// ローカルファイルからシムマニフェストを読み込むローダー。
/// ロケータはそのままファイルパスとして解釈する。
pub struct FileShimLoader {
    engine: Engine,
}

impl FileShimLoader {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

impl ShimLoader for FileShimLoader {
    fn load<'a>(
        &'a self,
        shim_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ShimExports, String>> + Send + 'a>> {
        Box::pin(async move {
            let path = PathBuf::from(shim_url.strip_prefix("file://").unwrap_or(shim_url));
            let raw = tokio::fs::read(&path).await.map_err(|e| {
                format!("シムマニフェストの読み込みに失敗 ({}): {e}", path.display())
            })?;
            let manifest: ShimManifest = serde_json::from_slice(&raw).map_err(|e| {
                format!("シムマニフェストのパースに失敗 ({}): {e}", path.display())
            })?;
            Ok(revisions::bind(&manifest, self.engine.clone()))
        })
    }
}
