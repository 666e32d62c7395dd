//! 组件模型定义
//!
//! 组件是可以由容器构造并缓存为单例的类型。构造函数以显式的依赖参数列表声明,
//! 容器不需要任何运行时反射。

use crate::factory::{select_constructor, Constructor};
use crate::resolver::ComponentResolver;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的组件实例
///
/// 内部保存的是 `Arc<T>`, 因此 `T` 可以是 `dyn Trait` 这样的非 Sized 类型。
pub type ErasedInstance = Arc<dyn Any + Send + Sync>;

/// 擦除组件实例的类型
pub fn erase<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> ErasedInstance {
    Arc::new(instance)
}

/// 还原类型擦除的组件实例
pub fn downcast<T: ?Sized + Send + Sync + 'static>(instance: &ErasedInstance) -> Option<Arc<T>> {
    instance.downcast_ref::<Arc<T>>().cloned()
}

/// 组件标记
///
/// 只有带标记的组件（或被显式绑定的实现）才会被容器构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentMarker {
    /// 业务服务
    Service,
    /// 数据仓储
    Repository,
}

impl ComponentMarker {
    /// 标记名称
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentMarker::Service => "service",
            ComponentMarker::Repository => "repository",
        }
    }
}

impl fmt::Display for ComponentMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 字段注入 trait
///
/// 实现者为每个 [`Inject`](crate::Inject) 字段解析依赖并赋值。
/// 没有注入字段的类型可以直接使用默认实现。
pub trait InjectFields: Send + Sync {
    /// 解析并赋值所有注入字段
    fn inject_fields(&self, resolver: &dyn ComponentResolver) -> DependencyResult<()> {
        let _ = resolver;
        Ok(())
    }
}

/// 可注入组件 trait
///
/// 通常由 `#[service]` / `#[repository]` 宏生成, 也可以手动实现。
pub trait Injectable: InjectFields + Sized + 'static {
    /// 组件标记, 未标记的类型只能通过绑定或手动注册进入容器
    fn marker() -> Option<ComponentMarker> {
        None
    }

    /// 声明的构造函数列表
    fn constructors() -> Vec<Constructor<Self>>;

    /// 注入字段列表, 仅用于诊断
    fn injectable_fields() -> Vec<FieldInfo> {
        Vec::new()
    }
}

/// 注入字段信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// 字段名称
    pub name: &'static str,
    /// 字段需要的类型
    pub type_info: TypeInfo,
}

impl FieldInfo {
    /// 创建字段信息
    pub fn new<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            name,
            type_info: TypeInfo::of::<T>(),
        }
    }
}

type ConstructFn = fn(&dyn ComponentResolver) -> DependencyResult<ErasedInstance>;
type InjectFn = fn(&ErasedInstance, &dyn ComponentResolver) -> DependencyResult<()>;

/// 组件描述符
///
/// 描述一个可请求的组件类型: 类型标识、标记、声明模块、构造依赖和注入字段。
#[derive(Clone)]
pub struct ComponentDescriptor {
    /// 组件类型
    pub type_info: TypeInfo,
    /// 组件标记
    pub marker: Option<ComponentMarker>,
    /// 声明组件的模块路径, 用作命名空间
    pub module_path: &'static str,
    /// 注入构造函数的参数类型（按声明顺序）
    pub dependencies: Vec<TypeInfo>,
    /// 注入字段
    pub fields: Vec<FieldInfo>,
    construct: ConstructFn,
    inject: InjectFn,
}

impl ComponentDescriptor {
    /// 从组件类型创建描述符
    pub fn of<T: Injectable>() -> Self {
        let type_info = TypeInfo::of::<T>();
        let dependencies = select_constructor(type_info.name, T::constructors())
            .map(|constructor| constructor.parameters().to_vec())
            .unwrap_or_default();

        Self {
            type_info,
            marker: T::marker(),
            module_path: type_info.module_path(),
            dependencies,
            fields: T::injectable_fields(),
            construct: construct_erased::<T>,
            inject: inject_erased::<T>,
        }
    }

    /// 设置声明模块路径
    pub fn with_module_path(mut self, module_path: &'static str) -> Self {
        self.module_path = module_path;
        self
    }

    /// 组件简短名称
    pub fn name(&self) -> &'static str {
        self.type_info.short_name()
    }

    /// 是否带有组件标记
    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    /// 选择构造函数、解析参数并创建实例
    pub fn construct(&self, resolver: &dyn ComponentResolver) -> DependencyResult<ErasedInstance> {
        (self.construct)(resolver)
    }

    /// 对已创建的实例执行字段注入
    pub fn inject_fields(
        &self,
        instance: &ErasedInstance,
        resolver: &dyn ComponentResolver,
    ) -> DependencyResult<()> {
        (self.inject)(instance, resolver)
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("type_info", &self.type_info.name)
            .field("marker", &self.marker)
            .field("module_path", &self.module_path)
            .field("dependencies", &self.dependencies)
            .field("fields", &self.fields)
            .finish()
    }
}

fn construct_erased<T: Injectable>(
    resolver: &dyn ComponentResolver,
) -> DependencyResult<ErasedInstance> {
    let constructor = select_constructor(std::any::type_name::<T>(), T::constructors())?;
    let instance = constructor.invoke(resolver)?;
    Ok(erase(Arc::new(instance)))
}

fn inject_erased<T: Injectable>(
    instance: &ErasedInstance,
    resolver: &dyn ComponentResolver,
) -> DependencyResult<()> {
    let typed = downcast::<T>(instance).ok_or_else(|| DependencyError::TypeMismatch {
        expected: std::any::type_name::<T>().to_string(),
    })?;
    typed.inject_fields(resolver)
}
