//! # 依赖注入具体实现
//!
//! 提供组件注册表 [`Container`]: 保存接口到实现的绑定和单例实例,
//! 把请求的类型解析为完成构造函数注入和字段注入的单例, 并检测循环依赖。

use di_abstractions::{
    downcast, erase, ComponentDescriptor, ComponentResolver, ErasedInstance, InjectFields,
    Injectable, ResolveContext,
};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use parking_lot::RwLock;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

type Upcast = Arc<dyn Fn(&ErasedInstance) -> Option<ErasedInstance> + Send + Sync>;

/// 接口到实现的绑定
#[derive(Clone)]
struct Binding {
    /// 实现类型
    implementation: TypeInfo,
    /// 把实现实例转换为接口实例
    upcast: Upcast,
}

/// 依赖注入容器
///
/// 内部锁只在读写映射表时短暂持有, 构造组件期间不持锁, 因此构造函数可以递归解析依赖。
/// 依赖图应在启动阶段单线程构建完成, 之后的解析只是查表。
pub struct Container {
    /// 绑定表: 接口类型 -> 实现
    bindings: RwLock<HashMap<TypeInfo, Binding>>,
    /// 已知的组件描述符
    descriptors: RwLock<HashMap<TypeInfo, ComponentDescriptor>>,
    /// 单例缓存: 实现类型 -> 实例
    singletons: RwLock<HashMap<TypeInfo, ErasedInstance>>,
}

impl Container {
    /// 创建新的容器
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            descriptors: RwLock::new(HashMap::new()),
            singletons: RwLock::new(HashMap::new()),
        }
    }

    /// 绑定接口到实现
    ///
    /// 覆盖已有绑定, 不触发解析。实现类型无需组件标记即可被构造。
    ///
    /// ```ignore
    /// container.bind::<dyn PaymentGateway, StripeGateway>(|gateway| gateway as Arc<dyn PaymentGateway>);
    /// ```
    pub fn bind<A, I>(&self, upcast: fn(Arc<I>) -> Arc<A>)
    where
        A: ?Sized + Send + Sync + 'static,
        I: Injectable,
    {
        let abstraction = TypeInfo::of::<A>();
        let implementation = TypeInfo::of::<I>();
        info!("绑定组件: {} -> {}", abstraction.name, implementation.name);

        let upcast: Upcast =
            Arc::new(move |instance| downcast::<I>(instance).map(|typed| erase(upcast(typed))));
        self.descriptors
            .write()
            .entry(implementation)
            .or_insert_with(ComponentDescriptor::of::<I>);
        self.bindings.write().insert(
            abstraction,
            Binding {
                implementation,
                upcast,
            },
        );
    }

    /// 注册组件类型
    ///
    /// 只登记描述符, 解析时仍然检查组件标记。
    pub fn register<T: Injectable>(&self) {
        self.register_descriptor(ComponentDescriptor::of::<T>());
    }

    /// 注册组件描述符
    pub fn register_descriptor(&self, descriptor: ComponentDescriptor) {
        debug!("注册组件: {}", descriptor.type_info.name);
        self.descriptors
            .write()
            .insert(descriptor.type_info, descriptor);
    }

    /// 直接注册单例实例, 跳过构造
    ///
    /// 覆盖该类型已有的实例, 实例的类型不需要组件标记。
    pub fn register_instance<T>(&self, instance: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<T>();
        info!("注册单例实例: {}", type_info.name);
        self.singletons.write().insert(type_info, erase(instance));
    }

    /// 解析组件
    ///
    /// 返回该类型的单例, 不存在时构造它。
    pub fn resolve<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let resolver: &dyn ComponentResolver = self;
        resolver.resolve::<T>()
    }

    /// 按类型信息解析组件（类型擦除形式）
    pub fn resolve_by_type(&self, type_info: &TypeInfo) -> DependencyResult<ErasedInstance> {
        self.resolve_erased(type_info)
    }

    /// 对容器外创建的对象执行字段注入, 不缓存该对象
    pub fn inject_fields<T>(&self, target: &T) -> DependencyResult<()>
    where
        T: InjectFields + ?Sized,
    {
        let resolution = Resolution::new(self);
        target.inject_fields(&resolution)
    }

    /// 清空绑定、描述符和单例缓存
    pub fn clear(&self) {
        self.bindings.write().clear();
        self.descriptors.write().clear();
        self.singletons.write().clear();
        debug!("容器已清空");
    }

    /// 检查类型是否已注册（描述符、绑定或实例）
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        let type_info = TypeInfo::of::<T>();
        self.descriptors.read().contains_key(&type_info)
            || self.bindings.read().contains_key(&type_info)
            || self.singletons.read().contains_key(&type_info)
    }

    /// 检查类型是否已有单例实例
    pub fn has_instance<T: ?Sized + 'static>(&self) -> bool {
        self.singletons.read().contains_key(&TypeInfo::of::<T>())
    }

    /// 单例数量
    pub fn singleton_count(&self) -> usize {
        self.singletons.read().len()
    }

    /// 已缓存单例的类型, 按名称排序
    pub fn singleton_types(&self) -> Vec<TypeInfo> {
        let mut types: Vec<_> = self.singletons.read().keys().copied().collect();
        types.sort_by_key(|type_info| type_info.name);
        types
    }

    /// 已注册的组件描述符, 按名称排序
    pub fn registered_components(&self) -> Vec<ComponentDescriptor> {
        let mut components: Vec<_> = self.descriptors.read().values().cloned().collect();
        components.sort_by_key(|descriptor| descriptor.type_info.name);
        components
    }

    fn resolve_in(
        &self,
        resolution: &Resolution<'_>,
        requested: &TypeInfo,
    ) -> DependencyResult<ErasedInstance> {
        // 绑定只替换一层
        let binding = self.bindings.read().get(requested).cloned();
        let target = binding
            .as_ref()
            .map_or(*requested, |binding| binding.implementation);

        let cached = self.singletons.read().get(&target).cloned();
        if let Some(instance) = cached {
            return project(instance, binding.as_ref(), requested);
        }

        let descriptor = self.descriptors.read().get(&target).cloned();
        let descriptor = match descriptor {
            Some(descriptor) if descriptor.is_marked() || binding.is_some() => descriptor,
            _ => return Err(DependencyError::not_registered(target.name)),
        };

        let _guard = resolution.enter(target)?;
        debug!("构造组件: {}", target.name);

        let created = descriptor.construct(resolution)?;
        let (instance, inserted) = match self.singletons.write().entry(target) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => (entry.insert(created).clone(), true),
        };

        if let Err(error) = descriptor.inject_fields(&instance, resolution) {
            warn!("组件字段注入失败: {}: {}", target.name, error);
            if inserted {
                self.singletons.write().remove(&target);
            }
            return Err(error);
        }

        project(instance, binding.as_ref(), requested)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.bindings.read().len())
            .field("descriptors", &self.descriptors.read().len())
            .field("singletons", &self.singletons.read().len())
            .finish()
    }
}

impl ComponentResolver for Container {
    fn resolve_erased(&self, type_info: &TypeInfo) -> DependencyResult<ErasedInstance> {
        let resolution = Resolution::new(self);
        resolution.resolve_erased(type_info)
    }

    fn can_resolve(&self, type_info: &TypeInfo) -> bool {
        self.bindings.read().contains_key(type_info)
            || self.singletons.read().contains_key(type_info)
            || self
                .descriptors
                .read()
                .get(type_info)
                .is_some_and(ComponentDescriptor::is_marked)
    }
}

/// 把实现实例转换为请求的接口类型
fn project(
    instance: ErasedInstance,
    binding: Option<&Binding>,
    requested: &TypeInfo,
) -> DependencyResult<ErasedInstance> {
    match binding {
        None => Ok(instance),
        Some(binding) => (binding.upcast)(&instance).ok_or_else(|| DependencyError::TypeMismatch {
            expected: requested.name.to_string(),
        }),
    }
}

/// 一次顶层解析调用
///
/// 持有本次调用的解析链, 调用结束时解析链随之销毁。
struct Resolution<'c> {
    container: &'c Container,
    context: RefCell<ResolveContext>,
}

impl<'c> Resolution<'c> {
    fn new(container: &'c Container) -> Self {
        Self {
            container,
            context: RefCell::new(ResolveContext::new()),
        }
    }

    /// 把类型加入解析链, 守卫销毁时移除
    fn enter(&self, type_info: TypeInfo) -> DependencyResult<InProgressGuard<'_>> {
        self.context.borrow_mut().push_type(type_info)?;
        Ok(InProgressGuard {
            context: &self.context,
        })
    }
}

impl ComponentResolver for Resolution<'_> {
    fn resolve_erased(&self, type_info: &TypeInfo) -> DependencyResult<ErasedInstance> {
        self.container.resolve_in(self, type_info)
    }

    fn can_resolve(&self, type_info: &TypeInfo) -> bool {
        self.container.can_resolve(type_info)
    }
}

struct InProgressGuard<'r> {
    context: &'r RefCell<ResolveContext>,
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.context.borrow_mut().pop_type();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{ComponentMarker, Constructor};

    struct Leaf;

    impl InjectFields for Leaf {}

    impl Injectable for Leaf {
        fn marker() -> Option<ComponentMarker> {
            Some(ComponentMarker::Repository)
        }

        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new(|()| Leaf)]
        }
    }

    #[test]
    fn test_resolution_guard_pops_on_drop() {
        let container = Container::new();
        let resolution = Resolution::new(&container);
        {
            let _guard = resolution.enter(TypeInfo::of::<Leaf>()).unwrap();
            assert_eq!(resolution.context.borrow().depth(), 1);
        }
        assert!(resolution.context.borrow().is_empty());
    }

    #[test]
    fn test_registered_components_are_listed() {
        let container = Container::new();
        container.register::<Leaf>();

        assert!(container.is_registered::<Leaf>());
        assert!(!container.has_instance::<Leaf>());

        container.resolve::<Leaf>().unwrap();
        assert!(container.has_instance::<Leaf>());
        assert_eq!(container.singleton_types(), vec![TypeInfo::of::<Leaf>()]);
        assert_eq!(container.registered_components()[0].name(), "Leaf");
    }
}
