//! # モジュールランタイム
//!
//! 標準ホストインポートの登録、インスタンス化、エントリポイント起動。
//! どのシムリビジョンも最終的にはここを通ってモジュールを動かす。

use hibana_core::BootstrapError;
use hibana_types::ENTRY_EXPORT;
use wasmtime::{Caller, Engine, Extern, Instance, Linker, Module, Store};

/// ストアに保持する実行時状態。
#[derive(Default)]
pub struct HostState {}

/// インスタンス化済みモジュールと、その実行に必要なストア。
pub struct RunningModule {
    store: Store<HostState>,
    instance: Instance,
}

impl std::fmt::Debug for RunningModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningModule").finish_non_exhaustive()
    }
}

impl RunningModule {
    /// エントリポイントを起動し、戻るまで実行する。
    pub fn invoke_entry(&mut self) -> Result<(), BootstrapError> {
        let entry = self
            .instance
            .get_typed_func::<(), ()>(&mut self.store, ENTRY_EXPORT)
            .map_err(|e| {
                BootstrapError::Invoke(format!(
                    "エントリポイント {ENTRY_EXPORT} の取得に失敗: {e}"
                ))
            })?;
        entry
            .call(&mut self.store, ())
            .map_err(|e| BootstrapError::Invoke(e.to_string()))
    }
}

/// 標準ホストインポートを備えたリンカーでモジュールをインスタンス化する。
pub fn instantiate(engine: &Engine, module: &Module) -> Result<RunningModule, BootstrapError> {
    let mut linker: Linker<HostState> = Linker::new(engine);
    register_host_imports(&mut linker)
        .map_err(|e| BootstrapError::Instantiate(format!("ホストインポートの登録に失敗: {e}")))?;

    let mut store = Store::new(engine, HostState::default());
    let instance = linker
        .instantiate(&mut store, module)
        .map_err(|e| BootstrapError::Instantiate(e.to_string()))?;

    Ok(RunningModule { store, instance })
}

/// 標準ホストインポートを登録する。
///
/// `env.log(ptr, len)`: モジュールの線形メモリからメッセージを読み、
/// ホストのログへ流す。
fn register_host_imports(linker: &mut Linker<HostState>) -> wasmtime::Result<()> {
    linker.func_wrap(
        "env",
        "log",
        |mut caller: Caller<'_, HostState>, ptr: u32, len: u32| {
            let Some(Extern::Memory(memory)) = caller.get_export("memory") else {
                tracing::warn!("memoryエクスポートが無いためモジュールログを読めません");
                return;
            };
            let mut buf = vec![0u8; len as usize];
            match memory.read(&caller, ptr as usize, &mut buf) {
                Ok(()) => {
                    tracing::info!(text = %String::from_utf8_lossy(&buf), "モジュールログ");
                }
                Err(e) => tracing::warn!(error = %e, "モジュールログの読み取りに失敗"),
            }
        },
    )?;
    Ok(())
}
