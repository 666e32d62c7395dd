//! 基于组件清单的组件扫描
//!
//! `#[service]` / `#[repository]` 在程序启动时把组件提交到全局清单,
//! 扫描器按命名空间读取清单, 注册并立即构造每个组件。

use di_abstractions::{
    global_component_manifest, ComponentDescriptor, ComponentManifest, ComponentScanner,
};
use di_impl::Container;
use infrastructure_common::DependencyResult;
use tracing::{debug, info};

/// 组件扫描器
///
/// 默认读取全局组件清单, 也可以使用显式提供的清单。
#[derive(Debug, Clone, Default)]
pub struct ManifestComponentScanner {
    manifest: Option<ComponentManifest>,
}

impl ManifestComponentScanner {
    /// 读取全局组件清单的扫描器
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取指定清单的扫描器
    pub fn with_manifest(manifest: ComponentManifest) -> Self {
        Self {
            manifest: Some(manifest),
        }
    }

    /// 注册命名空间内的组件并逐个构造
    ///
    /// 按清单顺序解析, 第一个失败的组件中止扫描, 错误原样返回。
    /// 返回加载的组件数量。
    pub fn scan_namespace(&self, container: &Container, root: &str) -> DependencyResult<usize> {
        info!("开始扫描组件, 命名空间: '{}'", root);
        let descriptors = self.register_namespace(container, root);

        for descriptor in &descriptors {
            container.resolve_by_type(&descriptor.type_info)?;
            debug!(
                "组件已加载: {} ({})",
                descriptor.name(),
                descriptor
                    .marker
                    .map_or("unmarked", |marker| marker.as_str())
            );
        }

        info!("组件扫描完成, 加载 {} 个组件", descriptors.len());
        Ok(descriptors.len())
    }

    /// 只注册命名空间内的组件, 不构造
    ///
    /// 注册后组件可以在扫描之前被按需解析, 例如数据填充器的字段注入。
    pub fn register_namespace(
        &self,
        container: &Container,
        root: &str,
    ) -> Vec<ComponentDescriptor> {
        let descriptors = self.scan(root);
        for descriptor in &descriptors {
            container.register_descriptor(descriptor.clone());
        }
        debug!("已注册 {} 个组件描述符", descriptors.len());
        descriptors
    }
}

impl ComponentScanner for ManifestComponentScanner {
    fn scan(&self, namespace: &str) -> Vec<ComponentDescriptor> {
        match &self.manifest {
            Some(manifest) => manifest.components_in(namespace),
            None => global_component_manifest().components_in(namespace),
        }
    }

    fn name(&self) -> &str {
        "manifest"
    }
}
