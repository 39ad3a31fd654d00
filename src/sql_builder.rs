//! Parameterized SELECT builder.
//!
//! Values are always bound through `?` placeholders; only table and column
//! names supplied by the crate itself are interpolated.
//!
//! ```rust
//! use wastemarket_sdk::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("catalog")
//!     .where_eq("category", "metal")
//!     .where_like("name", "%besi%")
//!     .order_by(&["\"basePrice\" DESC"])
//!     .limit(5)
//!     .build();
//! assert_eq!(params, vec!["metal".to_string(), "%besi%".to_string()]);
//! assert!(sql.ends_with("LIMIT 5"));
//! ```

pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Replace the default `*` projection.
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a raw condition; `params` bind its `?` placeholders in order.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// `{column} = ?`
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clause(&format!("{} = ?", column), &[value])
    }

    /// Case-insensitive `LIKE`.
    pub fn where_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.where_clause(&format!("LOWER({}) LIKE LOWER(?)", column), &[pattern])
    }

    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols.extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Produce the SQL text and its bound parameters.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];
        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }
        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }
        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }
        (parts.join("\n"), self.params.clone())
    }
}
