//! 连接地址构建

use data_abstractions::{DatabaseSettings, Dialect};
use infrastructure_common::{DatabaseError, DatabaseResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// SQLite 文件路径中保留原样的字符, 其余字符由 sqlx 解码还原
const SQLITE_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 内存数据库序号, 每个连接池拥有独立的共享缓存数据库
static IN_MEMORY_SEQUENCE: AtomicUsize = AtomicUsize::new(0);

/// 按配置构建连接地址
///
/// SQLite 内存数据库使用命名的共享缓存, 同一连接池内的所有连接看到同一个数据库。
pub fn connection_url(settings: &DatabaseSettings) -> DatabaseResult<Url> {
    match settings.dialect()? {
        Dialect::Sqlite if settings.path == ":memory:" => {
            let sequence = IN_MEMORY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
            parse(&format!(
                "sqlite:file:obsidian-memory-{}?mode=memory&cache=shared",
                sequence
            ))
        }
        Dialect::Sqlite => {
            let path = utf8_percent_encode(&settings.path, SQLITE_PATH);
            let mut url = parse(&format!("sqlite://{}", path))?;
            url.query_pairs_mut().append_pair("mode", "rwc");
            Ok(url)
        }
        dialect @ (Dialect::MySql | Dialect::PostgreSql) => {
            let mut url = parse(match dialect {
                Dialect::MySql => "mysql://localhost",
                _ => "postgres://localhost",
            })?;
            url.set_host(Some(&settings.host))
                .map_err(|error| invalid(format!("主机 {}: {}", settings.host, error)))?;
            url.set_port(settings.effective_port()?)
                .map_err(|_| invalid("端口".to_string()))?;
            if let Some(user) = &settings.user {
                url.set_username(user)
                    .map_err(|_| invalid("用户名".to_string()))?;
                url.set_password(settings.password.as_deref())
                    .map_err(|_| invalid("密码".to_string()))?;
            }
            url.set_path(settings.name.as_deref().unwrap_or_default());
            Ok(url)
        }
    }
}

/// 隐藏密码后的地址, 用于日志
pub fn redacted(url: &Url) -> String {
    let mut redacted = url.clone();
    if redacted.password().is_some() {
        redacted.set_password(Some("***")).ok();
    }
    redacted.to_string()
}

fn parse(input: &str) -> DatabaseResult<Url> {
    Url::parse(input).map_err(|error| invalid(error.to_string()))
}

fn invalid(message: String) -> DatabaseError {
    DatabaseError::ConnectionFailed {
        message: format!("无效的连接地址: {}", message),
    }
}
