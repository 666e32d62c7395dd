//! 组件解析器抽象接口
//!
//! 提供依赖解析和循环依赖检测的能力

use crate::component::{downcast, ErasedInstance};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::sync::Arc;

/// 组件解析器 trait
///
/// 负责把类型标识解析为组件实例。构造函数和注入字段通过它获取依赖。
pub trait ComponentResolver {
    /// 解析指定类型的组件（类型擦除形式）
    fn resolve_erased(&self, type_info: &TypeInfo) -> DependencyResult<ErasedInstance>;

    /// 检查是否可以解析指定类型
    fn can_resolve(&self, type_info: &TypeInfo) -> bool;
}

impl dyn ComponentResolver + '_ {
    /// 解析指定类型的组件
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> DependencyResult<Arc<T>> {
        let instance = self.resolve_erased(&TypeInfo::of::<T>())?;
        downcast::<T>(&instance).ok_or_else(|| DependencyError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
        })
    }
}

/// 解析上下文
///
/// 记录当前调用栈上正在构造的类型, 用于检测循环依赖。
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前解析链
    resolution_chain: Vec<TypeInfo>,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加类型到解析链
    ///
    /// 类型已在链上时返回 `CircularDependency`, 错误中包含完整的环路径。
    pub fn push_type(&mut self, type_info: TypeInfo) -> DependencyResult<()> {
        if let Some(start) = self.resolution_chain.iter().position(|t| *t == type_info) {
            let dependency_chain = self.resolution_chain[start..]
                .iter()
                .chain(std::iter::once(&type_info))
                .map(TypeInfo::short_name)
                .collect::<Vec<_>>()
                .join(" -> ");

            return Err(DependencyError::CircularDependency {
                type_name: type_info.name.to_string(),
                dependency_chain,
            });
        }
        self.resolution_chain.push(type_info);
        Ok(())
    }

    /// 从解析链中移除类型
    pub fn pop_type(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 解析链是否为空
    pub fn is_empty(&self) -> bool {
        self.resolution_chain.is_empty()
    }
}
