/// Filter expressions
///
/// A composable predicate tree rendered into a WHERE-clause fragment. Literal
/// values never appear in the rendered text: each one becomes a named
/// placeholder (`:p0`, `:p1`, ...) and is returned by [`Expression::bindings`].
use crate::value::Value;
use std::fmt;

/// Boolean expression used as a query filter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Expression {
    /// No filter; renders nothing
    #[default]
    Null,
    /// Column reference
    Column(String),
    /// Literal value, always bound as a placeholder
    Literal(Value),
    /// Pre-rendered SQL, inserted verbatim
    Raw(String),
    /// Binary comparison: column = value, column > value, etc.
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    /// Logical AND/OR
    LogicalOp {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },
    /// NOT expression
    Not(Box<Expression>),
    /// LIKE pattern matching
    Like {
        expr: Box<Expression>,
        pattern: String,
    },
    /// IN (value1, value2, ...)
    In {
        expr: Box<Expression>,
        values: Vec<Value>,
    },
    /// BETWEEN min AND max
    Between {
        expr: Box<Expression>,
        min: Box<Expression>,
        max: Box<Expression>,
    },
}

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq, // =
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl Expression {
    /// Column reference
    pub fn col(name: impl Into<String>) -> Self {
        Expression::Column(name.into())
    }

    /// Literal value
    pub fn value(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Raw SQL fragment. The caller is responsible for its escaping.
    pub fn raw(sql: impl Into<String>) -> Self {
        Expression::Raw(sql.into())
    }

    /// True when this expression is the empty filter
    pub fn is_null(&self) -> bool {
        matches!(self, Expression::Null)
    }

    pub fn eq(self, value: impl Into<Expression>) -> Self {
        self.binary(BinaryOperator::Eq, value.into())
    }

    pub fn ne(self, value: impl Into<Expression>) -> Self {
        self.binary(BinaryOperator::Ne, value.into())
    }

    pub fn lt(self, value: impl Into<Expression>) -> Self {
        self.binary(BinaryOperator::Lt, value.into())
    }

    pub fn le(self, value: impl Into<Expression>) -> Self {
        self.binary(BinaryOperator::Le, value.into())
    }

    pub fn gt(self, value: impl Into<Expression>) -> Self {
        self.binary(BinaryOperator::Gt, value.into())
    }

    pub fn ge(self, value: impl Into<Expression>) -> Self {
        self.binary(BinaryOperator::Ge, value.into())
    }

    pub fn like(self, pattern: impl Into<String>) -> Self {
        Expression::Like {
            expr: Box::new(self),
            pattern: pattern.into(),
        }
    }

    pub fn in_list<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Expression::In {
            expr: Box::new(self),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn between(self, min: impl Into<Expression>, max: impl Into<Expression>) -> Self {
        Expression::Between {
            expr: Box::new(self),
            min: Box::new(min.into()),
            max: Box::new(max.into()),
        }
    }

    /// Conjunction. A null side yields the other side unchanged.
    pub fn and(self, other: Expression) -> Self {
        self.logical(LogicalOperator::And, other)
    }

    /// Disjunction. A null side yields the other side unchanged.
    pub fn or(self, other: Expression) -> Self {
        self.logical(LogicalOperator::Or, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        if self.is_null() {
            return self;
        }
        Expression::Not(Box::new(self))
    }

    fn binary(self, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    fn logical(self, op: LogicalOperator, other: Expression) -> Self {
        match (self.is_null(), other.is_null()) {
            (true, _) => other,
            (_, true) => self,
            _ => Expression::LogicalOp {
                left: Box::new(self),
                op,
                right: Box::new(other),
            },
        }
    }

    /// Render the SQL fragment with named placeholders
    pub fn render(&self) -> String {
        self.compile().0
    }

    /// Placeholder bindings, in the order they appear in [`render`](Self::render)
    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.compile().1
    }

    /// Render the fragment and collect its bindings in one pass
    pub fn compile(&self) -> (String, Vec<(String, Value)>) {
        let mut out = Renderer::default();
        out.expr(self);
        (out.sql, out.bindings)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Literal(value)
    }
}

macro_rules! literal_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expression {
                fn from(v: $t) -> Self {
                    Expression::Literal(Value::from(v))
                }
            }
        )*
    };
}

literal_from!(i64, i32, u32, f64, bool, &str, String, Vec<u8>);

#[derive(Default)]
struct Renderer {
    sql: String,
    bindings: Vec<(String, Value)>,
}

impl Renderer {
    fn bind(&mut self, value: &Value) {
        let name = format!(":p{}", self.bindings.len());
        self.sql.push_str(&name);
        self.bindings.push((name, value.clone()));
    }

    fn expr(&mut self, expr: &Expression) {
        match expr {
            Expression::Null => {}
            Expression::Column(name) => self.sql.push_str(name),
            Expression::Literal(value) => self.bind(value),
            Expression::Raw(sql) => self.sql.push_str(sql),
            Expression::BinaryOp { left, op, right } => {
                self.operand(left);
                if is_null_operand(right) {
                    match op {
                        BinaryOperator::Eq => self.sql.push_str(" IS NULL"),
                        BinaryOperator::Ne => self.sql.push_str(" IS NOT NULL"),
                        _ => self.sql.push_str(&format!(" {} NULL", op)),
                    }
                } else {
                    self.sql.push_str(&format!(" {} ", op));
                    self.operand(right);
                }
            }
            Expression::LogicalOp { left, op, right } => {
                self.operand(left);
                self.sql.push_str(&format!(" {} ", op));
                self.operand(right);
            }
            Expression::Not(inner) => {
                self.sql.push_str("NOT (");
                if inner.is_null() {
                    self.sql.push_str("NULL");
                } else {
                    self.expr(inner);
                }
                self.sql.push(')');
            }
            Expression::Like { expr, pattern } => {
                self.operand(expr);
                self.sql.push_str(" LIKE ");
                self.bind(&Value::String(pattern.clone()));
            }
            Expression::In { expr, values } => {
                self.operand(expr);
                self.sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.bind(value);
                }
                self.sql.push(')');
            }
            Expression::Between { expr, min, max } => {
                self.operand(expr);
                self.sql.push_str(" BETWEEN ");
                self.operand(min);
                self.sql.push_str(" AND ");
                self.operand(max);
            }
        }
    }

    // Nested AND/OR keeps its grouping; a null operand renders as NULL
    fn operand(&mut self, expr: &Expression) {
        match expr {
            Expression::Null => self.sql.push_str("NULL"),
            Expression::LogicalOp { .. } => {
                self.sql.push('(');
                self.expr(expr);
                self.sql.push(')');
            }
            _ => self.expr(expr),
        }
    }
}

fn is_null_operand(expr: &Expression) -> bool {
    matches!(expr, Expression::Null | Expression::Literal(Value::Null))
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Eq => write!(f, "="),
            BinaryOperator::Ne => write!(f, "!="),
            BinaryOperator::Lt => write!(f, "<"),
            BinaryOperator::Le => write!(f, "<="),
            BinaryOperator::Gt => write!(f, ">"),
            BinaryOperator::Ge => write!(f, ">="),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}
