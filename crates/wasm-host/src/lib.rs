//! # Hibana WASM実行サポート
//!
//! wasmtimeを直接使用した実行基盤と、ディスパッチャのコラボレータ実装を
//! 提供する。
//!
//! - `platform`: プラットフォームの汎用ストリーミングコンパイル
//! - `runtime`: ホストインポート登録・インスタンス化・エントリ起動
//! - `shim`: マニフェスト駆動のシムローダーとネイティブリビジョン群
//! - `fetch`: HTTP/ファイルのWASMバイナリフェッチャ

pub mod fetch;
pub mod platform;
pub mod runtime;
pub mod shim;

pub use fetch::{FileFetcher, HttpFetcher};
pub use platform::WasmtimePlatform;
pub use shim::{FileShimLoader, HttpShimLoader};
