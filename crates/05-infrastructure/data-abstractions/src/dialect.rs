//! 数据库类型定义

use infrastructure_common::DatabaseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 数据库类型
///
/// 封闭枚举: 嵌入式 SQLite 和两种网络数据库, 每种都有各自的 DDL 写法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// 嵌入式文件数据库
    Sqlite,
    /// MySQL
    #[serde(rename = "mysql")]
    MySql,
    /// PostgreSQL
    #[serde(rename = "postgresql")]
    PostgreSql,
}

impl Dialect {
    /// 所有支持的数据库类型
    pub const ALL: [Dialect; 3] = [Dialect::Sqlite, Dialect::MySql, Dialect::PostgreSql];

    /// 类型名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgresql",
        }
    }

    /// 默认端口, 嵌入式数据库没有端口
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Dialect::Sqlite => None,
            Dialect::MySql => Some(3306),
            Dialect::PostgreSql => Some(5432),
        }
    }

    /// 是否支持 `ALTER TABLE ... DROP COLUMN`
    pub fn supports_drop_column(&self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }

    /// 自增主键的列类型
    pub fn auto_increment_primary_key(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::MySql => "INT AUTO_INCREMENT PRIMARY KEY",
            Dialect::PostgreSql => "SERIAL PRIMARY KEY",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DatabaseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Dialect::Sqlite),
            "mysql" => Ok(Dialect::MySql),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            _ => Err(DatabaseError::UnsupportedDialect {
                dialect: value.to_string(),
            }),
        }
    }
}
