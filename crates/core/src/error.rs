//! # エラー型
//!
//! ブートストラップシーケンスのエラーは捕捉も再試行もされず、
//! `?` でそのまま呼び出し元（最終的にはバイナリのトップレベル）へ伝播する。

/// ブートストラップ実行のエラー型。
///
/// シーケンスのどの段階で失敗したかをバリアントで表す。
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// シムモジュールのロードに失敗
    #[error("シムモジュールのロードに失敗: {0}")]
    ShimLoad(String),
    /// WASMバイナリの取得に失敗
    #[error("WASMバイナリの取得に失敗: {0}")]
    Fetch(String),
    /// WASMコンパイルに失敗
    #[error("WASMコンパイルに失敗: {0}")]
    Compile(String),
    /// インスタンス化に失敗
    #[error("インスタンス化に失敗: {0}")]
    Instantiate(String),
    /// エントリポイントの実行に失敗
    #[error("エントリポイントの実行に失敗: {0}")]
    Invoke(String),
    /// 判定された世代に必要なケイパビリティがシムに存在しない。
    /// 未知の形状のシムはここで失敗する（第4の世代へのフォールバックはない）。
    #[error("シムにケイパビリティ {0} がありません")]
    MissingCapability(&'static str),
    /// 不透明ハンドルの中身が期待した型ではなかった
    #[error("不透明ハンドルの型が一致しません (期待: {0})")]
    HandleType(&'static str),
}

/// 起動記述子の読み取りエラー。
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// 起動情報要素がマークアップ中に存在しない
    #[error("起動情報要素 (id=\"{0}\") が見つかりません")]
    ElementNotFound(&'static str),
    /// 起動情報要素に必要な属性がない
    #[error("起動情報要素に属性 {0} がありません")]
    MissingAttribute(&'static str),
}
