//! # ネイティブシムリビジョン
//!
//! 歴代リビジョンのランタイムサポートをケイパビリティとして束ねる。
//!
//! - 最新リビジョンのストリーミングコンパイルは、自らインスタンス化できる
//!   成果物を返す
//! - 中間リビジョンは素の成果物を返し、2引数instantiateとinvokeで起動する
//! - 最古リビジョンはコンパイル手段を持たず、未解決のプラットフォーム
//!   コンパイルを2引数instantiateが自身で解決する

use hibana_core::shim::{
    ArtifactInput, BoxFuture, CompileStreamingFn, CompiledArtifact, Imports, InstantiateFn,
    InstantiatedModule, InvokeFn, InvokeMainFn, SelfInstantiateFn, ShimExports,
};
use hibana_core::{BootstrapError, InstanceHandle, PendingFetch, PlatformModule};
use hibana_types::{capability, ShimManifest};
use wasmtime::{Engine, Module};

use crate::platform::compile_from;
use crate::runtime::{self, RunningModule};

/// マニフェストの宣言名にランタイムサポートを束ねる。
///
/// 対応は機械的で、世代の判定はしない。未知の宣言名は警告して無視する
/// （より新しいマニフェストを古いホストが読んだ場合の前方互換）。
pub fn bind(manifest: &ShimManifest, engine: Engine) -> ShimExports {
    let self_instantiating = manifest
        .artifact_exports
        .iter()
        .any(|name| name == capability::INSTANTIATE);

    let mut exports = ShimExports::default();
    for name in &manifest.exports {
        match name.as_str() {
            capability::COMPILE_STREAMING => {
                exports.compile_streaming =
                    Some(compile_streaming_fn(engine.clone(), self_instantiating));
            }
            capability::INSTANTIATE => {
                exports.instantiate = Some(instantiate_fn(engine.clone()));
            }
            capability::INVOKE => {
                exports.invoke = Some(invoke_fn());
            }
            unknown => {
                tracing::warn!(capability = %unknown, "未知のシムケイパビリティ宣言を無視");
            }
        }
    }
    exports
}

/// シムのストリーミングコンパイル。
/// マニフェストが成果物のinstantiateを宣言していれば、自己インスタンス化
/// ケイパビリティ付きの成果物を返す。
fn compile_streaming_fn(engine: Engine, self_instantiating: bool) -> CompileStreamingFn {
    Box::new(
        move |fetch: PendingFetch| -> BoxFuture<Result<CompiledArtifact, BootstrapError>> {
            Box::pin(async move {
                let module = compile_from(&engine, fetch).await?;
                let instantiate = self_instantiating.then(|| self_instantiate_fn(engine.clone()));
                Ok(CompiledArtifact {
                    module: PlatformModule::new(module),
                    instantiate,
                })
            })
        },
    )
}

/// 成果物の自己instantiate（最新リビジョン）。
fn self_instantiate_fn(engine: Engine) -> SelfInstantiateFn {
    Box::new(
        move |module: PlatformModule| -> BoxFuture<Result<InstantiatedModule, BootstrapError>> {
            Box::pin(async move {
                let module = module.downcast::<Module>()?;
                let mut running = runtime::instantiate(&engine, &module)?;
                let invoke_main: InvokeMainFn =
                    Box::new(move || -> BoxFuture<Result<(), BootstrapError>> {
                        Box::pin(async move { running.invoke_entry() })
                    });
                Ok(InstantiatedModule { invoke_main })
            })
        },
    )
}

/// 2引数instantiate（最古・中間リビジョン）。
/// 未解決のコンパイルを受け取った場合はここで解決する。
fn instantiate_fn(engine: Engine) -> InstantiateFn {
    Box::new(
        move |input: ArtifactInput,
              _imports: Imports|
              -> BoxFuture<Result<InstanceHandle, BootstrapError>> {
            Box::pin(async move {
                let module = input.resolve().await?.downcast::<Module>()?;
                let running = runtime::instantiate(&engine, &module)?;
                Ok(InstanceHandle::new(running))
            })
        },
    )
}

/// invoke（最古・中間リビジョン）。エントリポイントの完了まで実行する。
fn invoke_fn() -> InvokeFn {
    Box::new(
        move |handle: InstanceHandle| -> BoxFuture<Result<(), BootstrapError>> {
            Box::pin(async move {
                let mut running = handle.downcast::<RunningModule>()?;
                running.invoke_entry()
            })
        },
    )
}
