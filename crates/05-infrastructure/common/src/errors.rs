//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {type_name} (需要 #[service] / #[repository] 标记, 或通过 bind / register_instance 手动注册)")]
    ComponentNotRegistered { type_name: String },

    #[error("组件 {type_name} 有多个构造函数被标记为注入点, 只允许一个")]
    AmbiguousInjectionPoint { type_name: String },

    #[error("组件 {type_name} 声明了 {count} 个构造函数, 请将要使用的构造函数标记为注入点")]
    AmbiguousConstructor { type_name: String, count: usize },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency {
        type_name: String,
        dependency_chain: String,
    },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("字段注入失败: {type_name}.{field}, 原因: {source}")]
    FieldInjectionFailed {
        type_name: String,
        field: String,
        source: Box<DependencyError>,
    },

    #[error("类型不匹配: 期望 {expected}")]
    TypeMismatch { expected: String },
}

impl DependencyError {
    /// 创建组件未注册错误
    pub fn not_registered(type_name: impl Into<String>) -> Self {
        Self::ComponentNotRegistered {
            type_name: type_name.into(),
        }
    }

    /// 创建组件创建失败错误
    pub fn creation_failed(
        type_name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ComponentCreationFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }
}

/// 数据库错误类型
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("不支持的数据库类型: {dialect} (可选: sqlite, mysql, postgresql)")]
    UnsupportedDialect { dialect: String },

    #[error("数据库连接失败: {message}")]
    ConnectionFailed { message: String },

    #[error("SQL 执行失败: {statement}, 原因: {message}")]
    StatementFailed { statement: String, message: String },

    #[error("事务操作失败: {message}")]
    TransactionFailed { message: String },
}

impl DatabaseError {
    /// 创建 SQL 执行失败错误
    pub fn statement(statement: impl Into<String>, message: impl ToString) -> Self {
        Self::StatementFailed {
            statement: statement.into(),
            message: message.to_string(),
        }
    }
}

/// 迁移错误类型
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("迁移执行失败: {migration}, 原因: {source}")]
    MigrationFailed {
        migration: String,
        source: Box<MigrationError>,
    },

    #[error("迁移标识重复: {id}")]
    DuplicateIdentity { id: String },

    #[error("数据库错误: {source}")]
    Database {
        #[from]
        source: DatabaseError,
    },

    #[error("{message}")]
    Custom { message: String },
}

impl MigrationError {
    /// 创建自定义迁移错误
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    /// 包装为指定迁移的执行失败
    pub fn failed(migration: impl Into<String>, source: MigrationError) -> Self {
        Self::MigrationFailed {
            migration: migration.into(),
            source: Box::new(source),
        }
    }
}

/// 数据填充错误类型
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("数据填充失败: {seeder}, 原因: {message}")]
    SeederFailed { seeder: String, message: String },

    #[error("依赖注入错误: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },

    #[error("数据库错误: {source}")]
    Database {
        #[from]
        source: DatabaseError,
    },
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("数据库错误: {source}")]
    DatabaseError {
        #[from]
        source: DatabaseError,
    },

    #[error("迁移错误: {source}")]
    MigrationError {
        #[from]
        source: MigrationError,
    },

    #[error("数据填充错误: {source}")]
    SeedError {
        #[from]
        source: SeedError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type MigrationResult<T> = Result<T, MigrationError>;
pub type SeedResult<T> = Result<T, SeedError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
