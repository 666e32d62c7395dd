//! 元数据定义
//!
//! 提供组件和类型的标识信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
///
/// 以 [`TypeId`] 作为唯一标识, 名称仅用于诊断输出。
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（包含模块路径）
    pub name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息, 支持 `dyn Trait` 等非 Sized 类型
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }

    /// 获取类型所在的模块路径
    pub fn module_path(&self) -> &'static str {
        let name = self.name.strip_prefix("dyn ").unwrap_or(self.name);
        let head = name.split('<').next().unwrap_or(name);
        head.rfind("::").map_or("", |index| &head[..index])
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// 去掉模块路径, 保留泛型参数部分
///
/// `app::orders::OrderService` -> `OrderService`,
/// `dyn app::billing::PaymentGateway` -> `PaymentGateway`
pub fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(index) => &full[index + 2..],
        None => full.strip_prefix("dyn ").unwrap_or(full),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Gateway {}
    struct Stripe;

    #[test]
    fn test_type_info_equality_uses_type_id() {
        assert_eq!(TypeInfo::of::<Stripe>(), TypeInfo::of::<Stripe>());
        assert_ne!(TypeInfo::of::<Stripe>(), TypeInfo::of::<dyn Gateway>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<Stripe>().short_name(), "Stripe");
        assert_eq!(TypeInfo::of::<dyn Gateway>().short_name(), "Gateway");
        assert_eq!(short_type_name("Plain"), "Plain");
        assert_eq!(short_type_name("alloc::vec::Vec<u8>"), "Vec<u8>");
    }

    #[test]
    fn test_module_path() {
        let info = TypeInfo::of::<Stripe>();
        assert_eq!(info.module_path(), module_path!());
        assert_eq!(TypeInfo::of::<u8>().module_path(), "");
    }
}
