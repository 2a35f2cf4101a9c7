//! # プラットフォームコンパイル
//!
//! ホスト環境自身が備える汎用ストリーミングコンパイル。シム非依存で、
//! シムがコンパイル手段を持たない最古世代へのフォールバックに使われる。

use std::future::Future;
use std::pin::Pin;

use crate::error::BootstrapError;
use crate::fetch::PendingFetch;
use crate::handle::PlatformModule;

/// 未解決のコンパイル結果。
///
/// 第1世代の経路ではこのハンドルが**未解決のまま**シムの2引数instantiateへ
/// 渡り、シム側が自身で解決する。ディスパッチャがawaitすることはない。
pub type PendingCompile =
    Pin<Box<dyn Future<Output = Result<PlatformModule, BootstrapError>> + Send>>;

/// プラットフォーム側の汎用ストリーミングコンパイル。
pub trait PlatformCompiler: Send + Sync {
    /// 取得結果のコンパイルを開始する。呼び出し自体は即座に返る。
    fn compile_streaming(&self, fetch: PendingFetch) -> PendingCompile;
}
