//! # WASMバイナリ取得
//!
//! 取得はロケータを受け取ってバイトストリームを返すだけの外部コラボレータ。
//! ストリームはストリーミングコンパイルの入力としてチャンク単位で消費される。

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::BootstrapError;

/// 取得中のレスポンスボディ。チャンク単位で読み出す。
pub trait ByteSource: Send {
    /// 次のチャンクを返す。ストリーム終端ではNone。
    fn next_chunk(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Bytes>, BootstrapError>> + Send + '_>>;
}

/// 取得済みバイトストリームのハンドル。
pub struct ArtifactStream {
    source: Box<dyn ByteSource>,
}

impl std::fmt::Debug for ArtifactStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStream").finish_non_exhaustive()
    }
}

impl ArtifactStream {
    pub fn new(source: Box<dyn ByteSource>) -> Self {
        Self { source }
    }

    /// 手元に揃っているバイト列から単一チャンクのストリームを作る。
    /// ファイル由来のバイナリやテスト入力に使う。
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(Box::new(BufferedSource {
            remaining: Some(Bytes::from(bytes)),
        }))
    }

    /// 次のチャンクを返す。ストリーム終端ではNone。
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, BootstrapError> {
        self.source.next_chunk().await
    }

    /// 到着したチャンクを順に読み切り、1つのバッファへ集める。
    pub async fn collect(mut self) -> Result<Vec<u8>, BootstrapError> {
        let mut bytes = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

/// 全バイトが揃っている場合の単一チャンクソース。
struct BufferedSource {
    remaining: Option<Bytes>,
}

impl ByteSource for BufferedSource {
    fn next_chunk(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Bytes>, BootstrapError>> + Send + '_>> {
        let chunk = self.remaining.take();
        Box::pin(async move { Ok(chunk) })
    }
}

/// 未解決の取得。fetch呼び出し自体は即座に返り、完了はawaitで待つ。
/// 取得の失敗はこのFutureの解決時（＝コンパイル段階の入口）に現れる。
pub type PendingFetch =
    Pin<Box<dyn Future<Output = Result<ArtifactStream, BootstrapError>> + Send>>;

/// WASMバイナリを取得するコラボレータ。
pub trait ArtifactFetcher: Send + Sync {
    /// 取得を開始し、未解決のストリームを返す。
    fn fetch(&self, url: &str) -> PendingFetch;
}
