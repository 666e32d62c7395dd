//! 字段注入

use crate::resolver::ComponentResolver;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// 注入字段
///
/// 在实例创建之后由容器赋值。用于容器不负责构造、但需要依赖的对象（例如数据填充器）。
pub struct Inject<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Inject<T> {
    /// 创建未注入的字段
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// 获取已注入的依赖
    pub fn get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    /// 是否已注入
    pub fn is_injected(&self) -> bool {
        self.cell.get().is_some()
    }

    /// 字段需要的类型
    pub fn type_info() -> TypeInfo {
        TypeInfo::of::<T>()
    }

    /// 解析依赖并赋值
    ///
    /// 已注入的字段保持不变。解析失败时返回 `FieldInjectionFailed`, 携带所属类型和字段名。
    pub fn inject(
        &self,
        resolver: &dyn ComponentResolver,
        owner: &str,
        field: &str,
    ) -> DependencyResult<()> {
        if self.is_injected() {
            return Ok(());
        }

        let instance =
            resolver
                .resolve::<T>()
                .map_err(|source| DependencyError::FieldInjectionFailed {
                    type_name: owner.to_string(),
                    field: field.to_string(),
                    source: Box::new(source),
                })?;
        // 并发注入时保留先写入的实例
        let _ = self.cell.set(instance);
        Ok(())
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("type", &std::any::type_name::<T>())
            .field("injected", &self.cell.get().is_some())
            .finish()
    }
}
