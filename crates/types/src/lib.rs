//! # Hibana 共有型定義
//!
//! ブートストラップローダーの各クレートが共有するデータ構造を提供する。
//!
//! - `LoadDescriptor`: ページマークアップから読み取る起動記述子
//! - `ShimManifest`: シムモジュールが公開するケイパビリティの構造宣言

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 起動記述子
// ---------------------------------------------------------------------------

/// 起動記述子。ページマークアップの起動情報要素から一度だけ読み取られ、
/// ブートストラップ実行に即座に消費される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDescriptor {
    /// WASMバイナリのURL
    pub wasm_url: String,
    /// シムモジュール（マニフェスト）のURL
    pub shim_url: String,
}

// ---------------------------------------------------------------------------
// シムマニフェスト
// ---------------------------------------------------------------------------

/// シムモジュールのマニフェスト。
///
/// シムが公開するケイパビリティを**名前の列挙**として宣言する。
/// バージョン番号は持たない。どの世代のシムかはこの形状から
/// ディスパッチャ側が構造的に判定する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShimManifest {
    /// シム自身が公開するケイパビリティ名
    pub exports: Vec<String>,
    /// ストリーミングコンパイルの成果物が公開するケイパビリティ名。
    /// 旧世代のマニフェストには存在しないため省略可。
    #[serde(default)]
    pub artifact_exports: Vec<String>,
}

/// マニフェストに現れるケイパビリティ名。
pub mod capability {
    /// ストリーミングコンパイル（第2・第3世代）
    pub const COMPILE_STREAMING: &str = "compile_streaming";
    /// 2引数instantiate（第1・第2世代）
    pub const INSTANTIATE: &str = "instantiate";
    /// invoke（第1・第2世代）
    pub const INVOKE: &str = "invoke";
}

/// 標準エントリポイントのエクスポート名。
/// 実行対象のWASMモジュールはこの名前でエントリ関数をエクスポートする。
pub const ENTRY_EXPORT: &str = "main";
