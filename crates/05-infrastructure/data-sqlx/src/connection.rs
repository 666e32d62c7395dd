//! 连接和事务实现

use async_trait::async_trait;
use data_abstractions::{Connection, Dialect, SqlValue, Transaction};
use infrastructure_common::{DatabaseError, DatabaseResult};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Any, AnyConnection, Row};
use std::borrow::Cow;
use tracing::debug;

/// 连接池中的一个连接
pub struct SqlxConnection {
    inner: PoolConnection<Any>,
    dialect: Dialect,
}

impl SqlxConnection {
    pub(crate) fn new(inner: PoolConnection<Any>, dialect: Dialect) -> Self {
        Self { inner, dialect }
    }
}

#[async_trait]
impl Connection for SqlxConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> DatabaseResult<u64> {
        let sql = numbered_placeholders(sql, self.dialect);
        execute_on(&mut self.inner, &sql, params).await
    }

    async fn query_scalar(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> DatabaseResult<Option<SqlValue>> {
        let sql = numbered_placeholders(sql, self.dialect);
        query_scalar_on(&mut self.inner, &sql, params).await
    }
}

/// 数据库事务
///
/// 未提交就被丢弃时, sqlx 会在连接归还连接池前回滚。
pub struct SqlxTransaction {
    inner: sqlx::Transaction<'static, Any>,
    dialect: Dialect,
}

impl SqlxTransaction {
    pub(crate) fn new(inner: sqlx::Transaction<'static, Any>, dialect: Dialect) -> Self {
        Self { inner, dialect }
    }
}

#[async_trait]
impl Connection for SqlxTransaction {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> DatabaseResult<u64> {
        let sql = numbered_placeholders(sql, self.dialect);
        execute_on(&mut self.inner, &sql, params).await
    }

    async fn query_scalar(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> DatabaseResult<Option<SqlValue>> {
        let sql = numbered_placeholders(sql, self.dialect);
        query_scalar_on(&mut self.inner, &sql, params).await
    }
}

#[async_trait]
impl Transaction for SqlxTransaction {
    fn as_connection(&mut self) -> &mut dyn Connection {
        self
    }

    async fn commit(self: Box<Self>) -> DatabaseResult<()> {
        debug!("提交事务");
        self.inner
            .commit()
            .await
            .map_err(|error| DatabaseError::TransactionFailed {
                message: error.to_string(),
            })
    }

    async fn rollback(self: Box<Self>) -> DatabaseResult<()> {
        debug!("回滚事务");
        self.inner
            .rollback()
            .await
            .map_err(|error| DatabaseError::TransactionFailed {
                message: error.to_string(),
            })
    }
}

/// PostgreSQL 使用 `$1, $2, ...` 占位符, 其余数据库保持 `?`
fn numbered_placeholders(sql: &str, dialect: Dialect) -> Cow<'_, str> {
    if dialect != Dialect::PostgreSql || !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let mut rewritten = String::with_capacity(sql.len() + 8);
    let mut in_literal = false;
    let mut index = 0;
    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                rewritten.push(ch);
            }
            '?' if !in_literal => {
                index += 1;
                rewritten.push('$');
                rewritten.push_str(&index.to_string());
            }
            _ => rewritten.push(ch),
        }
    }
    Cow::Owned(rewritten)
}

fn bind_params<'q>(sql: &'q str, params: &[SqlValue]) -> Query<'q, Any, AnyArguments<'q>> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, param| match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(value) => query.bind(*value),
            SqlValue::Real(value) => query.bind(*value),
            SqlValue::Text(value) => query.bind(value.clone()),
            SqlValue::Bool(value) => query.bind(*value),
        })
}

async fn execute_on(
    connection: &mut AnyConnection,
    sql: &str,
    params: &[SqlValue],
) -> DatabaseResult<u64> {
    debug!(sql, params = params.len(), "执行语句");
    let result = bind_params(sql, params)
        .execute(&mut *connection)
        .await
        .map_err(|error| DatabaseError::statement(sql, error))?;
    Ok(result.rows_affected())
}

async fn query_scalar_on(
    connection: &mut AnyConnection,
    sql: &str,
    params: &[SqlValue],
) -> DatabaseResult<Option<SqlValue>> {
    debug!(sql, params = params.len(), "执行标量查询");
    let row = bind_params(sql, params)
        .fetch_optional(&mut *connection)
        .await
        .map_err(|error| DatabaseError::statement(sql, error))?;
    Ok(row.as_ref().map(first_column))
}

/// 按整数、浮点、文本、布尔的顺序解码第一列
fn first_column(row: &AnyRow) -> SqlValue {
    if let Ok(value) = row.try_get::<Option<i64>, _>(0) {
        return value.into();
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(0) {
        return value.into();
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(0) {
        return value.into();
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(0) {
        return value.into();
    }
    SqlValue::Null
}
