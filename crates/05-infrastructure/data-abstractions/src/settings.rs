//! 数据库连接配置

use crate::dialect::Dialect;
use infrastructure_common::DatabaseResult;
use serde::{Deserialize, Serialize};

/// 数据库连接配置
///
/// 字段名与环境变量 `DB_TYPE`、`DB_PATH`、`DB_HOST`、`DB_PORT`、`DB_NAME`、
/// `DB_USER`、`DB_PASSWORD` 一一对应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// 数据库类型名称
    #[serde(rename = "type")]
    pub db_type: String,
    /// SQLite 文件路径
    pub path: String,
    /// 网络数据库主机
    pub host: String,
    /// 网络数据库端口, 未设置时使用数据库类型的默认端口
    pub port: Option<u16>,
    /// 数据库名称
    pub name: Option<String>,
    /// 用户名
    pub user: Option<String>,
    /// 密码
    pub password: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            db_type: Dialect::Sqlite.as_str().to_string(),
            path: "data.db".to_string(),
            host: "localhost".to_string(),
            port: None,
            name: None,
            user: None,
            password: None,
        }
    }
}

impl DatabaseSettings {
    /// SQLite 文件数据库配置
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// SQLite 内存数据库配置
    pub fn sqlite_in_memory() -> Self {
        Self::sqlite(":memory:")
    }

    /// 解析数据库类型
    pub fn dialect(&self) -> DatabaseResult<Dialect> {
        self.db_type.parse()
    }

    /// 实际使用的端口
    pub fn effective_port(&self) -> DatabaseResult<Option<u16>> {
        let dialect = self.dialect()?;
        Ok(self.port.or_else(|| dialect.default_port()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure_common::DatabaseError;

    #[test]
    fn test_defaults_follow_sqlite_file() {
        let settings = DatabaseSettings::default();
        assert_eq!(settings.dialect().unwrap(), Dialect::Sqlite);
        assert_eq!(settings.path, "data.db");
        assert_eq!(settings.effective_port().unwrap(), None);
    }

    #[test]
    fn test_network_databases_use_default_ports() {
        let mysql = DatabaseSettings {
            db_type: "mysql".to_string(),
            ..DatabaseSettings::default()
        };
        assert_eq!(mysql.effective_port().unwrap(), Some(3306));

        let postgres = DatabaseSettings {
            db_type: "PostgreSQL".to_string(),
            port: Some(6543),
            ..DatabaseSettings::default()
        };
        assert_eq!(postgres.effective_port().unwrap(), Some(6543));
    }

    #[test]
    fn test_unsupported_type_fails() {
        let settings = DatabaseSettings {
            db_type: "oracle".to_string(),
            ..DatabaseSettings::default()
        };
        assert!(matches!(
            settings.effective_port(),
            Err(DatabaseError::UnsupportedDialect { .. })
        ));
    }
}
