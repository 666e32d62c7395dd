//! 表结构描述 DSL
//!
//! `Blueprint` 按数据库类型生成列定义, 由 [`Schema::create_table`](crate::Schema::create_table)
//! 拼接成 `CREATE TABLE IF NOT EXISTS` 语句。

use data_abstractions::Dialect;

/// 表结构描述
///
/// 每个列方法追加一条列定义, `not_null` / `unique` / `default_value` 修饰最后一条定义。
#[derive(Debug, Clone)]
pub struct Blueprint {
    dialect: Dialect,
    columns: Vec<String>,
}

impl Blueprint {
    /// 创建指定数据库类型的空描述
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            columns: Vec::new(),
        }
    }

    /// 数据库类型
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 已生成的列定义
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 名为 `id` 的自增主键
    pub fn id(&mut self) -> &mut Self {
        self.id_named("id")
    }

    /// 自增主键
    pub fn id_named(&mut self, name: &str) -> &mut Self {
        let definition = format!("{name} {}", self.dialect.auto_increment_primary_key());
        self.push(definition)
    }

    /// 长度为 255 的字符串列
    pub fn string(&mut self, name: &str) -> &mut Self {
        self.string_with_length(name, 255)
    }

    /// 指定长度的字符串列, SQLite 下为 `TEXT`
    pub fn string_with_length(&mut self, name: &str, length: u32) -> &mut Self {
        let definition = match self.dialect {
            Dialect::Sqlite => format!("{name} TEXT"),
            Dialect::MySql | Dialect::PostgreSql => format!("{name} VARCHAR({length})"),
        };
        self.push(definition)
    }

    /// 长文本列
    pub fn text(&mut self, name: &str) -> &mut Self {
        self.push(format!("{name} TEXT"))
    }

    /// 整数列
    pub fn integer(&mut self, name: &str) -> &mut Self {
        let sql_type = match self.dialect {
            Dialect::PostgreSql => "INTEGER",
            Dialect::Sqlite | Dialect::MySql => "INT",
        };
        self.push(format!("{name} {sql_type}"))
    }

    /// 64 位整数列
    pub fn big_integer(&mut self, name: &str) -> &mut Self {
        self.push(format!("{name} BIGINT"))
    }

    /// 定点小数列
    pub fn decimal(&mut self, name: &str, precision: u32, scale: u32) -> &mut Self {
        self.push(format!("{name} DECIMAL({precision},{scale})"))
    }

    /// 布尔列, SQLite 下以整数保存
    pub fn boolean(&mut self, name: &str) -> &mut Self {
        let sql_type = match self.dialect {
            Dialect::Sqlite => "INTEGER",
            Dialect::MySql | Dialect::PostgreSql => "BOOLEAN",
        };
        self.push(format!("{name} {sql_type}"))
    }

    /// 日期列
    pub fn date(&mut self, name: &str) -> &mut Self {
        self.push(format!("{name} DATE"))
    }

    /// 日期时间列
    pub fn date_time(&mut self, name: &str) -> &mut Self {
        let sql_type = match self.dialect {
            Dialect::PostgreSql => "TIMESTAMP",
            Dialect::MySql => "DATETIME",
            Dialect::Sqlite => "TEXT",
        };
        self.push(format!("{name} {sql_type}"))
    }

    /// 时间戳列
    pub fn timestamp(&mut self, name: &str) -> &mut Self {
        self.push(format!("{name} TIMESTAMP"))
    }

    /// `created_at` 和 `updated_at` 两列
    pub fn timestamps(&mut self) -> &mut Self {
        let (created_at, updated_at) = match self.dialect {
            Dialect::MySql => (
                "created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
                "updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP",
            ),
            Dialect::PostgreSql => (
                "created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
                "updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
            ),
            Dialect::Sqlite => (
                "created_at TEXT DEFAULT CURRENT_TIMESTAMP",
                "updated_at TEXT DEFAULT CURRENT_TIMESTAMP",
            ),
        };
        self.push(created_at.to_string());
        self.push(updated_at.to_string())
    }

    /// 最后一列不可为空
    pub fn not_null(&mut self) -> &mut Self {
        self.amend_last(" NOT NULL")
    }

    /// 最后一列唯一
    pub fn unique(&mut self) -> &mut Self {
        self.amend_last(" UNIQUE")
    }

    /// 最后一列的默认值, 原样写入 SQL
    pub fn default_value(&mut self, value: &str) -> &mut Self {
        self.amend_last(&format!(" DEFAULT {value}"))
    }

    /// 列默认即可为空, 不追加任何内容
    pub fn nullable(&mut self) -> &mut Self {
        self
    }

    /// 拼接成列定义列表
    pub(crate) fn to_sql(&self) -> String {
        self.columns.join(", ")
    }

    fn push(&mut self, definition: String) -> &mut Self {
        self.columns.push(definition);
        self
    }

    fn amend_last(&mut self, suffix: &str) -> &mut Self {
        if let Some(last) = self.columns.last_mut() {
            last.push_str(suffix);
        }
        self
    }
}
