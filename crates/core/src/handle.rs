//! # 不透明ハンドル
//!
//! ディスパッチャはコンパイル成果物やインスタンスの中身を一切検査せず、
//! 生成した側（プラットフォーム実装またはシム実装）へそのまま受け渡す。
//! 具象型を知るのは生成側だけなので、型消去したハンドルで運搬する。

use std::any::Any;

use crate::error::BootstrapError;

/// コンパイル済みモジュールの不透明ハンドル。
///
/// 所有権はインスタンス化呼び出しへ即座に移り、ディスパッチャが
/// 保持し続けることはない。
pub struct PlatformModule(Box<dyn Any + Send>);

impl std::fmt::Debug for PlatformModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PlatformModule").finish()
    }
}

impl PlatformModule {
    /// 具象型を包んでハンドルにする。
    pub fn new<T: Any + Send>(inner: T) -> Self {
        Self(Box::new(inner))
    }

    /// 生成側の具象型へ戻す。型が一致しなければハンドル型エラー。
    pub fn downcast<T: Any + Send>(self) -> Result<T, BootstrapError> {
        self.0
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| BootstrapError::HandleType(std::any::type_name::<T>()))
    }
}

/// インスタンス化済みモジュールの不透明ハンドル（第1・第2世代）。
/// シムのinstantiateが生成し、同じシムのinvokeだけが中身を知っている。
pub struct InstanceHandle(Box<dyn Any + Send>);

impl InstanceHandle {
    /// 具象型を包んでハンドルにする。
    pub fn new<T: Any + Send>(inner: T) -> Self {
        Self(Box::new(inner))
    }

    /// 生成側の具象型へ戻す。型が一致しなければハンドル型エラー。
    pub fn downcast<T: Any + Send>(self) -> Result<T, BootstrapError> {
        self.0
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| BootstrapError::HandleType(std::any::type_name::<T>()))
    }
}
