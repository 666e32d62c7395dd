//! 组件构造函数
//!
//! 构造函数是接收已解析依赖并返回实例的类型化闭包,
//! 依赖以 `Arc` 元组的形式声明, 元组顺序即参数顺序。

use crate::resolver::ComponentResolver;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::fmt;
use std::sync::Arc;

type FactoryFn<T> = Box<dyn Fn(&dyn ComponentResolver) -> DependencyResult<T> + Send + Sync>;

/// 构造函数依赖列表
///
/// 为 `()` 和最多八个元素的 `(Arc<A>, Arc<B>, ...)` 元组实现。
pub trait Dependencies: Sized {
    /// 参数类型（按声明顺序）
    fn parameters() -> Vec<TypeInfo>;

    /// 依次解析每个参数
    fn resolve(resolver: &dyn ComponentResolver) -> DependencyResult<Self>;
}

impl Dependencies for () {
    fn parameters() -> Vec<TypeInfo> {
        Vec::new()
    }

    fn resolve(_resolver: &dyn ComponentResolver) -> DependencyResult<Self> {
        Ok(())
    }
}

macro_rules! impl_dependencies {
    ($($dep:ident),+) => {
        impl<$($dep),+> Dependencies for ($(Arc<$dep>,)+)
        where
            $($dep: ?Sized + Send + Sync + 'static),+
        {
            fn parameters() -> Vec<TypeInfo> {
                vec![$(TypeInfo::of::<$dep>()),+]
            }

            fn resolve(resolver: &dyn ComponentResolver) -> DependencyResult<Self> {
                Ok(($(resolver.resolve::<$dep>()?,)+))
            }
        }
    };
}

impl_dependencies!(A);
impl_dependencies!(A, B);
impl_dependencies!(A, B, C);
impl_dependencies!(A, B, C, D);
impl_dependencies!(A, B, C, D, E);
impl_dependencies!(A, B, C, D, E, F);
impl_dependencies!(A, B, C, D, E, F, G);
impl_dependencies!(A, B, C, D, E, F, G, H);

/// 组件构造函数
pub struct Constructor<T> {
    parameters: Vec<TypeInfo>,
    injection_point: bool,
    factory: FactoryFn<T>,
}

impl<T: 'static> Constructor<T> {
    /// 从依赖元组到实例的闭包创建构造函数
    ///
    /// ```ignore
    /// Constructor::new(|(repository,): (Arc<OrderRepository>,)| OrderService { repository })
    /// ```
    pub fn new<D, F>(factory: F) -> Self
    where
        D: Dependencies,
        F: Fn(D) -> T + Send + Sync + 'static,
    {
        Self {
            parameters: D::parameters(),
            injection_point: false,
            factory: Box::new(move |resolver| {
                let dependencies = D::resolve(resolver)?;
                Ok(factory(dependencies))
            }),
        }
    }

    /// 创建可能失败的构造函数, 失败时返回 `ComponentCreationFailed`
    pub fn try_new<D, E, F>(factory: F) -> Self
    where
        D: Dependencies,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn(D) -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            parameters: D::parameters(),
            injection_point: false,
            factory: Box::new(move |resolver| {
                let dependencies = D::resolve(resolver)?;
                factory(dependencies).map_err(|source| {
                    DependencyError::creation_failed(std::any::type_name::<T>(), source)
                })
            }),
        }
    }
}

impl<T> Constructor<T> {
    /// 标记为注入点
    pub fn inject(mut self) -> Self {
        self.injection_point = true;
        self
    }

    /// 是否为注入点
    pub fn is_injection_point(&self) -> bool {
        self.injection_point
    }

    /// 参数类型
    pub fn parameters(&self) -> &[TypeInfo] {
        &self.parameters
    }

    /// 解析参数并调用构造函数
    ///
    /// 参数解析的错误原样返回。
    pub fn invoke(&self, resolver: &dyn ComponentResolver) -> DependencyResult<T> {
        (self.factory)(resolver)
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .field("injection_point", &self.injection_point)
            .finish()
    }
}

/// 选择注入构造函数
///
/// 恰好一个注入点时使用它; 多个注入点报 `AmbiguousInjectionPoint`;
/// 没有注入点时要求只声明了一个构造函数, 否则报 `AmbiguousConstructor`。
pub fn select_constructor<T>(
    type_name: &str,
    constructors: Vec<Constructor<T>>,
) -> DependencyResult<Constructor<T>> {
    let (mut marked, mut unmarked): (Vec<_>, Vec<_>) = constructors
        .into_iter()
        .partition(Constructor::is_injection_point);

    if marked.len() > 1 {
        return Err(DependencyError::AmbiguousInjectionPoint {
            type_name: type_name.to_string(),
        });
    }
    if let Some(constructor) = marked.pop() {
        return Ok(constructor);
    }

    match unmarked.len() {
        1 => Ok(unmarked.remove(0)),
        count => Err(DependencyError::AmbiguousConstructor {
            type_name: type_name.to_string(),
            count,
        }),
    }
}
