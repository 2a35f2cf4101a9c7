//! # シムインターフェース
//!
//! ロード済みシムモジュールのエクスポート形状と、各世代のケイパビリティ型。
//!
//! シムはバージョンを自己申告しないため、どのスロットが埋まっているかの
//! **形状**がそのまま世代判定のキーになる。ケイパビリティはいずれも
//! 1回限りの呼び出しなので `FnOnce` で表す。

use std::future::Future;
use std::pin::Pin;

use crate::error::BootstrapError;
use crate::fetch::PendingFetch;
use crate::handle::{InstanceHandle, PlatformModule};
use crate::platform::PendingCompile;

/// ケイパビリティが返す非同期結果。
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

// ---------------------------------------------------------------------------
// instantiate引数
// ---------------------------------------------------------------------------

/// 2引数instantiateへ渡すインポート群。現行の標準シムでは常に空。
#[derive(Debug, Default)]
pub struct Imports {}

impl Imports {
    /// 空のインポート群。
    pub fn empty() -> Self {
        Self {}
    }
}

/// 2引数instantiateの第1引数。
///
/// 第2世代はコンパイル済み成果物を、第1世代は未解決のプラットフォーム
/// コンパイルをそのまま受け取る。
pub enum ArtifactInput {
    /// コンパイル済みモジュール（第2世代）
    Compiled(PlatformModule),
    /// 未解決のコンパイル（第1世代。instantiate側で解決する）
    Pending(PendingCompile),
}

impl ArtifactInput {
    /// コンパイル済みモジュールへ解決する。
    /// 未解決の場合の解決はシム実装側の責務で、ここから行う。
    pub async fn resolve(self) -> Result<PlatformModule, BootstrapError> {
        match self {
            ArtifactInput::Compiled(module) => Ok(module),
            ArtifactInput::Pending(pending) => pending.await,
        }
    }
}

// ---------------------------------------------------------------------------
// ケイパビリティ型
// ---------------------------------------------------------------------------

/// シムのストリーミングコンパイル（第2・第3世代）。
pub type CompileStreamingFn =
    Box<dyn FnOnce(PendingFetch) -> BoxFuture<Result<CompiledArtifact, BootstrapError>> + Send>;

/// シムの2引数instantiate（第1・第2世代）。
pub type InstantiateFn = Box<
    dyn FnOnce(ArtifactInput, Imports) -> BoxFuture<Result<InstanceHandle, BootstrapError>> + Send,
>;

/// シムのinvoke（第1・第2世代）。エントリポイントの完了まで中断する。
pub type InvokeFn =
    Box<dyn FnOnce(InstanceHandle) -> BoxFuture<Result<(), BootstrapError>> + Send>;

/// 成果物の自己instantiate（第3世代）。
pub type SelfInstantiateFn =
    Box<dyn FnOnce(PlatformModule) -> BoxFuture<Result<InstantiatedModule, BootstrapError>> + Send>;

/// 実行可能モジュールのエントリポイント起動（第3世代）。
pub type InvokeMainFn = Box<dyn FnOnce() -> BoxFuture<Result<(), BootstrapError>> + Send>;

// ---------------------------------------------------------------------------
// 成果物・インスタンス
// ---------------------------------------------------------------------------

/// シムのストリーミングコンパイルが返す成果物。
pub struct CompiledArtifact {
    /// コンパイル済みモジュール本体
    pub module: PlatformModule,
    /// 自己インスタンス化ケイパビリティ。
    /// 第3世代の判別点で、第2世代の成果物には存在しない。
    pub instantiate: Option<SelfInstantiateFn>,
}

impl std::fmt::Debug for CompiledArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledArtifact")
            .field("module", &self.module)
            .field("instantiate", &self.instantiate.is_some())
            .finish()
    }
}

/// 第3世代の自己instantiateが返す実行可能モジュール。
pub struct InstantiatedModule {
    /// エントリポイントを起動する
    pub invoke_main: InvokeMainFn,
}

// ---------------------------------------------------------------------------
// ロード済みシム
// ---------------------------------------------------------------------------

/// ロード済みシムのエクスポート形状。
///
/// どのスロットが埋まっているかが世代判定のキーになる。判定の優先順位は
/// `bootstrap` モジュールが規定する。
#[derive(Default)]
pub struct ShimExports {
    /// ストリーミングコンパイル（第2・第3世代）
    pub compile_streaming: Option<CompileStreamingFn>,
    /// 2引数instantiate（第1・第2世代）
    pub instantiate: Option<InstantiateFn>,
    /// invoke（第1・第2世代）
    pub invoke: Option<InvokeFn>,
}

/// シムモジュールをロードするコラボレータ。
///
/// ロードはシム自身の初期化が完了するまで中断する。
pub trait ShimLoader: Send + Sync {
    /// shim_urlのシムモジュールをロードし、エクスポート形状を返す。
    fn load<'a>(
        &'a self,
        shim_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ShimExports, String>> + Send + 'a>>;
}
