//! # プラットフォームコンパイル (wasmtime)
//!
//! ホスト環境自身が備える汎用ストリーミングコンパイル。
//! コンパイル手段を持たない最古世代のシムへのフォールバックで使われる。

use hibana_core::{BootstrapError, PendingCompile, PendingFetch, PlatformCompiler, PlatformModule};
use wasmtime::{Engine, Module};

/// wasmtimeエンジンによる汎用ストリーミングコンパイル。
pub struct WasmtimePlatform {
    engine: Engine,
}

impl WasmtimePlatform {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// 既定構成のエンジンで作成する。
    pub fn with_default_engine() -> Self {
        Self::new(Engine::default())
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl PlatformCompiler for WasmtimePlatform {
    fn compile_streaming(&self, fetch: PendingFetch) -> PendingCompile {
        let engine = self.engine.clone();
        Box::pin(async move {
            let module = compile_from(&engine, fetch).await?;
            Ok(PlatformModule::new(module))
        })
    }
}

/// 取得ストリームを到着順に読み切り、wasmtimeモジュールへコンパイルする。
pub(crate) async fn compile_from(
    engine: &Engine,
    fetch: PendingFetch,
) -> Result<Module, BootstrapError> {
    let bytes = fetch.await?.collect().await?;
    tracing::debug!(len = bytes.len(), "WASMバイナリを受信、コンパイル開始");
    Module::new(engine, &bytes).map_err(|e| BootstrapError::Compile(e.to_string()))
}
