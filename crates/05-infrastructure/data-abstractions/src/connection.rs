//! 连接、事务和数据库抽象接口

use crate::dialect::Dialect;
use crate::value::SqlValue;
use async_trait::async_trait;
use infrastructure_common::DatabaseResult;

/// 数据库连接 trait
///
/// 提供执行单条语句和读取单个标量值的能力
#[async_trait]
pub trait Connection: Send {
    /// 连接的数据库类型
    fn dialect(&self) -> Dialect;

    /// 执行语句, 返回受影响的行数
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> DatabaseResult<u64>;

    /// 执行查询, 返回第一行第一列, 没有结果时返回 `None`
    async fn query_scalar(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> DatabaseResult<Option<SqlValue>>;
}

/// 数据库事务 trait
///
/// 事务未提交就被丢弃时由驱动回滚。
#[async_trait]
pub trait Transaction: Connection {
    /// 以普通连接的形式使用事务
    fn as_connection(&mut self) -> &mut dyn Connection;

    /// 提交事务
    async fn commit(self: Box<Self>) -> DatabaseResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> DatabaseResult<()>;
}

/// 数据库 trait
///
/// 连接和事务的来源
#[async_trait]
pub trait Database: Send + Sync {
    /// 数据库类型
    fn dialect(&self) -> Dialect;

    /// 获取一个连接
    async fn connection(&self) -> DatabaseResult<Box<dyn Connection>>;

    /// 开启事务
    async fn begin(&self) -> DatabaseResult<Box<dyn Transaction>>;

    /// 关闭数据库, 释放所有连接
    async fn close(&self);
}
