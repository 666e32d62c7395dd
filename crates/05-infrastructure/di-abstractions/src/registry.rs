//! 组件清单
//!
//! 组件宏在程序启动时把描述符提交到全局清单, 扫描器按命名空间读取清单,
//! 取代运行时的注解扫描。

use crate::component::{ComponentDescriptor, Injectable};
use crate::scanner::namespace_matches;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

/// 全局组件清单
static GLOBAL_COMPONENT_MANIFEST: Lazy<RwLock<ComponentManifest>> =
    Lazy::new(|| RwLock::new(ComponentManifest::new()));

/// 组件清单
///
/// 按提交顺序保存组件描述符, 同一类型重复提交时后者覆盖前者。
#[derive(Debug, Clone, Default)]
pub struct ComponentManifest {
    descriptors: Vec<ComponentDescriptor>,
}

impl ComponentManifest {
    /// 创建空清单
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交组件描述符
    pub fn submit(&mut self, descriptor: ComponentDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|existing| existing.type_info == descriptor.type_info)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    /// 以构建器方式添加组件
    pub fn with<T: Injectable>(mut self) -> Self {
        self.submit(ComponentDescriptor::of::<T>());
        self
    }

    /// 所有描述符
    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    /// 命名空间内所有带标记的组件, 保持提交顺序
    pub fn components_in(&self, namespace: &str) -> Vec<ComponentDescriptor> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.is_marked())
            .filter(|descriptor| namespace_matches(descriptor.module_path, namespace))
            .cloned()
            .collect()
    }

    /// 描述符数量
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// 清单是否为空
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// 提交组件到全局清单
///
/// 由 `#[service]` / `#[repository]` 宏生成的启动函数调用。
pub fn submit_component(descriptor: ComponentDescriptor) {
    debug!(
        "提交组件到全局清单: {} ({})",
        descriptor.type_info.name, descriptor.module_path
    );
    GLOBAL_COMPONENT_MANIFEST.write().submit(descriptor);
}

/// 获取全局组件清单的快照
pub fn global_component_manifest() -> ComponentManifest {
    GLOBAL_COMPONENT_MANIFEST.read().clone()
}
