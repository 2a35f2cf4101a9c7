//! # ブートストラップディスパッチャ
//!
//! シムAPI世代の判定と、世代ごとの起動シーケンスの駆動。
//!
//! 判定は構造的（どのケイパビリティが存在するか）で、優先順位は固定:
//!
//! 1. シムモジュールをロードする
//! 2. ストリーミングコンパイルがあり、その成果物が自らinstantiateを
//!    公開するなら第3世代
//! 3. ストリーミングコンパイルはあるが成果物が自己instantiateしないなら
//!    第2世代
//! 4. ストリーミングコンパイルが無ければ第1世代
//!    （プラットフォームの汎用コンパイルで代替する）
//!
//! この優先順位自体が契約で、複数の形状を同時に満たすシムも必ずこの順で
//! 判定される。第3世代と第2世代の真の判別点はコンパイル成果物の形状にある。

use std::fmt;

use hibana_types::LoadDescriptor;

use crate::error::BootstrapError;
use crate::fetch::ArtifactFetcher;
use crate::handle::PlatformModule;
use crate::platform::{PendingCompile, PlatformCompiler};
use crate::shim::{
    ArtifactInput, CompiledArtifact, Imports, InstantiateFn, InvokeFn, SelfInstantiateFn,
    ShimExports, ShimLoader,
};

// ---------------------------------------------------------------------------
// 世代
// ---------------------------------------------------------------------------

/// 判定されたシムAPI世代。3世代で閉じており、第4のフォールバックはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimGeneration {
    /// 第3世代: コンパイル成果物が自らインスタンス化する
    SelfInstantiating,
    /// 第2世代: シムのストリーミングコンパイル + 2引数instantiate + invoke
    Assisted,
    /// 第1世代: プラットフォームコンパイル + 2引数instantiate + invoke
    Legacy,
}

impl fmt::Display for ShimGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShimGeneration::SelfInstantiating => "self-instantiating",
            ShimGeneration::Assisted => "assisted",
            ShimGeneration::Legacy => "legacy",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// 起動プラン
// ---------------------------------------------------------------------------

/// 判定結果。各バリアントはその世代の残り手順に必要なケイパビリティだけを
/// 保持し、以降は網羅的なmatch一回で駆動する（形状の再プローブはしない）。
enum LaunchPlan {
    /// 第3世代
    SelfInstantiating {
        module: PlatformModule,
        instantiate: SelfInstantiateFn,
    },
    /// 第2世代
    Assisted {
        module: PlatformModule,
        instantiate: InstantiateFn,
        invoke: InvokeFn,
    },
    /// 第1世代
    Legacy {
        pending: PendingCompile,
        instantiate: InstantiateFn,
        invoke: InvokeFn,
    },
}

impl LaunchPlan {
    fn generation(&self) -> ShimGeneration {
        match self {
            LaunchPlan::SelfInstantiating { .. } => ShimGeneration::SelfInstantiating,
            LaunchPlan::Assisted { .. } => ShimGeneration::Assisted,
            LaunchPlan::Legacy { .. } => ShimGeneration::Legacy,
        }
    }
}

// ---------------------------------------------------------------------------
// ディスパッチャ
// ---------------------------------------------------------------------------

/// ブートストラップディスパッチャ。
///
/// 1回の `run` でロード・判定・起動のシーケンスを最後まで駆動する。
/// どの段階の失敗も捕捉・変換・再試行せず、そのまま呼び出し元へ伝播する。
pub struct Bootstrap {
    /// シムモジュールのロード
    shim_loader: Box<dyn ShimLoader>,
    /// WASMバイナリの取得
    fetcher: Box<dyn ArtifactFetcher>,
    /// プラットフォームの汎用ストリーミングコンパイル（第1世代用）
    platform: Box<dyn PlatformCompiler>,
}

impl Bootstrap {
    pub fn new(
        shim_loader: Box<dyn ShimLoader>,
        fetcher: Box<dyn ArtifactFetcher>,
        platform: Box<dyn PlatformCompiler>,
    ) -> Self {
        Self {
            shim_loader,
            fetcher,
            platform,
        }
    }

    /// 1回のロード・実行シーケンスを駆動する。
    ///
    /// 各段階の中断が完了してから次の段階へ進み、順序の入れ替えや段階の
    /// スキップはない。2回目の呼び出しは未定義（1実行につき1回が契約）。
    pub async fn run(&self, descriptor: &LoadDescriptor) -> Result<(), BootstrapError> {
        tracing::info!(shim_url = %descriptor.shim_url, "シムモジュールをロード");
        let shim = self
            .shim_loader
            .load(&descriptor.shim_url)
            .await
            .map_err(BootstrapError::ShimLoad)?;

        let plan = self.classify(shim, &descriptor.wasm_url).await?;
        tracing::info!(generation = %plan.generation(), "シムAPI世代を判定");

        launch(plan).await?;
        tracing::info!("エントリポイントが完了");
        Ok(())
    }

    /// エクスポート形状から起動プランを構築する。
    ///
    /// 第3世代の判別点はコンパイル成果物の形状にあるため、ストリーミング
    /// コンパイルを持つシムはここでコンパイルまで進めてから確定する。
    /// 形状がどの世代の要件も満たさない場合はケイパビリティ欠落エラー。
    async fn classify(
        &self,
        shim: ShimExports,
        wasm_url: &str,
    ) -> Result<LaunchPlan, BootstrapError> {
        let ShimExports {
            compile_streaming,
            instantiate,
            invoke,
        } = shim;

        if let Some(compile) = compile_streaming {
            // 第2・第3世代: コンパイルはシム側で行う
            let fetch = self.fetcher.fetch(wasm_url);
            let CompiledArtifact {
                module,
                instantiate: self_instantiate,
            } = compile(fetch).await?;

            if let Some(self_instantiate) = self_instantiate {
                // 第3世代: 成果物が自己instantiateを公開している
                Ok(LaunchPlan::SelfInstantiating {
                    module,
                    instantiate: self_instantiate,
                })
            } else {
                // 第2世代
                Ok(LaunchPlan::Assisted {
                    module,
                    instantiate: instantiate
                        .ok_or(BootstrapError::MissingCapability("instantiate"))?,
                    invoke: invoke.ok_or(BootstrapError::MissingCapability("invoke"))?,
                })
            }
        } else {
            // 第1世代: プラットフォームの汎用コンパイルで代替する。
            // 未解決のコンパイルをそのままinstantiateへ渡し、解決はシム側。
            let fetch = self.fetcher.fetch(wasm_url);
            let pending = self.platform.compile_streaming(fetch);
            Ok(LaunchPlan::Legacy {
                pending,
                instantiate: instantiate.ok_or(BootstrapError::MissingCapability("instantiate"))?,
                invoke: invoke.ok_or(BootstrapError::MissingCapability("invoke"))?,
            })
        }
    }
}

/// プランに従って残りのシーケンスを駆動する。
async fn launch(plan: LaunchPlan) -> Result<(), BootstrapError> {
    match plan {
        LaunchPlan::SelfInstantiating {
            module,
            instantiate,
        } => {
            let instance = instantiate(module).await?;
            (instance.invoke_main)().await
        }
        LaunchPlan::Assisted {
            module,
            instantiate,
            invoke,
        } => {
            let handle = instantiate(ArtifactInput::Compiled(module), Imports::empty()).await?;
            invoke(handle).await
        }
        LaunchPlan::Legacy {
            pending,
            instantiate,
            invoke,
        } => {
            let handle = instantiate(ArtifactInput::Pending(pending), Imports::empty()).await?;
            invoke(handle).await
        }
    }
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
