//! 宏工具函数

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    Error, Expr, Fields, GenericArgument, Ident, ItemStruct, Lit, Member, PathArguments, Result,
    Type, UnOp,
};

/// 字段的赋值方式
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// `Arc<T>` 字段, 作为构造函数参数
    Dependency(Type),
    /// `Inject<T>` 字段, 构造后由容器赋值, 保存 `T`
    Injected(Type),
    /// 其他字段, 使用 `Default::default()`
    Defaulted,
}

/// 结构体字段
#[derive(Debug, Clone)]
pub struct StructField {
    pub member: Member,
    pub name: String,
    pub kind: FieldKind,
}

/// 按声明顺序收集结构体字段
pub fn collect_fields(item: &ItemStruct) -> Vec<StructField> {
    item.fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let (member, name) = match &field.ident {
                Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
                None => (Member::Unnamed(index.into()), index.to_string()),
            };
            let kind = if wrapped_type(&field.ty, "Arc").is_some() {
                FieldKind::Dependency(field.ty.clone())
            } else if let Some(inner) = wrapped_type(&field.ty, "Inject") {
                FieldKind::Injected(inner.clone())
            } else {
                FieldKind::Defaulted
            };
            StructField {
                member,
                name,
                kind,
            }
        })
        .collect()
}

/// 提取 `Wrapper<T>` 中的 `T`, 只比较路径最后一段
pub fn wrapped_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// 注册的类型必须是具体类型
pub fn reject_generics(item: &ItemStruct, attribute: &str) -> Result<()> {
    if item.generics.params.is_empty() {
        Ok(())
    } else {
        Err(Error::new_spanned(
            &item.generics,
            format!("#[{}] 不支持泛型结构体", attribute),
        ))
    }
}

/// 属性不接受参数时的检查
pub fn reject_arguments(args: &TokenStream, attribute: &str) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::new_spanned(
            args,
            format!("#[{}] 不接受参数", attribute),
        ))
    }
}

/// 生成构造表达式, `value` 决定每个字段的值
pub fn construct_expr<F>(item: &ItemStruct, fields: &[StructField], mut value: F) -> TokenStream
where
    F: FnMut(usize, &StructField) -> TokenStream,
{
    let name = &item.ident;
    let values: Vec<TokenStream> = fields
        .iter()
        .enumerate()
        .map(|(index, field)| value(index, field))
        .collect();

    match &item.fields {
        Fields::Unit => quote! { #name },
        Fields::Unnamed(_) => quote! { #name ( #(#values),* ) },
        Fields::Named(_) => {
            let members = fields.iter().map(|field| &field.member);
            quote! { #name { #(#members: #values),* } }
        }
    }
}

/// 非依赖字段的默认值
pub fn default_value(field: &StructField) -> TokenStream {
    match field.kind {
        FieldKind::Injected(_) => quote! { ::di_abstractions::Inject::new() },
        _ => quote! { ::std::default::Default::default() },
    }
}

/// 生成 `InjectFields` 实现
pub fn inject_fields_impl(item: &ItemStruct, fields: &[StructField]) -> TokenStream {
    let name = &item.ident;
    let type_name = name.to_string();
    let injections: Vec<TokenStream> = fields
        .iter()
        .filter(|field| matches!(field.kind, FieldKind::Injected(_)))
        .map(|field| {
            let member = &field.member;
            let field_name = &field.name;
            quote! { self.#member.inject(resolver, #type_name, #field_name)?; }
        })
        .collect();

    if injections.is_empty() {
        return quote! {
            impl ::di_abstractions::InjectFields for #name {}
        };
    }

    quote! {
        impl ::di_abstractions::InjectFields for #name {
            fn inject_fields(
                &self,
                resolver: &dyn ::di_abstractions::ComponentResolver,
            ) -> ::di_abstractions::DependencyResult<()> {
                #(#injections)*
                Ok(())
            }
        }
    }
}

/// 生成注册函数名, 例如 `__register_service_order_service`
pub fn registration_fn_name(kind: &str, ident: &Ident) -> Ident {
    Ident::new(
        &format!("__register_{}_{}", kind, snake_case(&ident.to_string())),
        Span::call_site(),
    )
}

/// 生成工厂函数名
pub fn factory_fn_name(kind: &str, ident: &Ident) -> Ident {
    Ident::new(
        &format!("__{}_factory_{}", kind, snake_case(&ident.to_string())),
        Span::call_site(),
    )
}

/// 驼峰转下划线
pub fn snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (index, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if index > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// 解析整数参数, 支持负数
pub fn int_value(expr: &Expr) -> Result<i32> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Int(lit_int) => lit_int.base10_parse(),
            other => Err(Error::new_spanned(other, "需要整数")),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => Ok(-int_value(&unary.expr)?),
        other => Err(Error::new_spanned(other, "需要整数")),
    }
}

/// 解析字符串参数
pub fn str_value(expr: &Expr) -> Result<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Ok(lit_str.value()),
            other => Err(Error::new_spanned(other, "需要字符串")),
        },
        other => Err(Error::new_spanned(other, "需要字符串")),
    }
}
