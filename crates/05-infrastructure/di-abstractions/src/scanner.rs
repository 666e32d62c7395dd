//! 组件扫描器抽象接口
//!
//! 提供按命名空间发现组件的能力

use crate::component::ComponentDescriptor;

/// 组件扫描器 trait
///
/// 用于发现命名空间内带标记的组件
pub trait ComponentScanner: Send + Sync {
    /// 扫描指定命名空间中的组件
    fn scan(&self, namespace: &str) -> Vec<ComponentDescriptor>;

    /// 获取扫描器名称
    fn name(&self) -> &str;
}

/// 判断模块路径是否属于命名空间
///
/// 空命名空间匹配所有模块; 否则模块路径必须等于命名空间或以 `命名空间::` 开头。
pub fn namespace_matches(module_path: &str, namespace: &str) -> bool {
    let namespace = namespace.trim_end_matches("::");
    if namespace.is_empty() {
        return true;
    }
    module_path == namespace
        || module_path
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with("::"))
}
