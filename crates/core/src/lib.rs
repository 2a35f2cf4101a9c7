//! # Hibana ブートストラップディスパッチャ
//!
//! コンパイル済みWASMモジュールを取得・コンパイル・インスタンス化・起動する
//! 1回限りのロードシーケンスを駆動する。
//!
//! 中核はシムAPIの**世代判定とディスパッチ**にある。シムモジュールは
//! 互いに非互換な3世代のローダーAPIのいずれかを公開しており、バージョン
//! 番号を自己申告しない。ロード済みインターフェースの形状（どの
//! ケイパビリティが存在するか）だけを手掛かりに、固定された優先順位で
//! 世代を判定し、その世代の手順で非同期ステップを順に駆動する。
//!
//! 取得・シムロード・プラットフォームコンパイルは外部コラボレータとして
//! トレイトで分離されている。実装は `hibana-wasm-host` が提供する。

pub mod bootstrap;
pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod handle;
pub mod platform;
pub mod shim;

pub use bootstrap::{Bootstrap, ShimGeneration};
pub use error::{BootstrapError, DescriptorError};
pub use fetch::{ArtifactFetcher, ArtifactStream, ByteSource, PendingFetch};
pub use handle::{InstanceHandle, PlatformModule};
pub use platform::{PendingCompile, PlatformCompiler};
pub use shim::{
    ArtifactInput, CompiledArtifact, Imports, InstantiatedModule, ShimExports, ShimLoader,
};
