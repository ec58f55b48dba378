//! Request-driven list queries: keyword search, field filters and pagination.
//!
//! [`ListQuery`] is a plain value built from the request parameters in three
//! chainable steps. It knows nothing about the store; [`ListQuery::apply`]
//! translates it into a SeaORM select for any entity that describes its
//! searchable and filterable columns through [`Filterable`].

use std::{collections::HashMap, str::FromStr};

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, Select, Value,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Raw query-string parameters, e.g. `{"keyword": "pizza", "price[gte]": "10"}`.
pub type QueryParams = HashMap<String, String>;

/// Parameters consumed by `search` and `paginate`; never treated as filters.
pub const RESERVED_PARAMS: [&str; 3] = ["keyword", "page", "limit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FromStr for Comparison {
    type Err = AppError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "gt" => Ok(Comparison::Gt),
            "gte" => Ok(Comparison::Gte),
            "lt" => Ok(Comparison::Lt),
            "lte" => Ok(Comparison::Lte),
            other => Err(AppError::bad_request(format!(
                "Unsupported filter operator: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldFilter {
    pub field: String,
    pub op: Comparison,
    pub value: String,
}

impl FieldFilter {
    /// Parses `field` or `field[op]` into a filter on `value`.
    pub fn parse(key: &str, value: &str) -> AppResult<Self> {
        let malformed = || AppError::bad_request(format!("Malformed filter: {key}"));

        let (field, op) = match key.find('[') {
            None => {
                if key.contains(']') {
                    return Err(malformed());
                }
                (key, Comparison::Eq)
            }
            Some(open) => {
                let token = key[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(malformed)?;
                if token.contains(['[', ']']) {
                    return Err(malformed());
                }
                (&key[..open], token.parse()?)
            }
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            field: field.to_string(),
            op,
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
    pub offset: u64,
}

impl Page {
    /// Page `number` (1-based) of `size` rows.
    ///
    /// Number, size and offset stay within `i64` so they bind as SQL
    /// `BIGINT`; a page beyond that range selects nothing.
    pub fn new(number: u64, size: u64) -> Self {
        const MAX: u64 = i64::MAX as u64;
        let number = number.clamp(1, MAX);
        let size = size.min(MAX);
        Self {
            number,
            size,
            offset: size.saturating_mul(number - 1).min(MAX),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub keyword: Option<String>,
    pub filters: Vec<FieldFilter>,
    pub page: Option<Page>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a case-insensitive substring match on `name` when `keyword` is set.
    pub fn search(mut self, params: &QueryParams) -> Self {
        if let Some(keyword) = params.get("keyword").map(|k| k.trim()).filter(|k| !k.is_empty()) {
            self.keyword = Some(keyword.to_string());
        }
        self
    }

    /// Turns every non-reserved parameter into a field filter.
    ///
    /// Filters are kept sorted by field so the resulting value does not depend
    /// on the iteration order of the parameter map.
    pub fn filter(mut self, params: &QueryParams) -> AppResult<Self> {
        let mut parsed = params
            .iter()
            .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
            .map(|(key, value)| FieldFilter::parse(key, value))
            .collect::<AppResult<Vec<_>>>()?;
        self.filters.append(&mut parsed);
        self.filters.sort();
        Ok(self)
    }

    /// Fixed-size page selected by the 1-based `page` parameter.
    ///
    /// Anything that is not a positive integer selects the first page.
    pub fn paginate(mut self, params: &QueryParams, page_size: u64) -> Self {
        let number = params
            .get("page")
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        self.page = Some(Page::new(number, page_size));
        self
    }

    /// Conjunction of the keyword predicate and every field filter.
    pub fn condition<E: Filterable>(&self) -> AppResult<Condition> {
        let mut condition = Condition::all();

        if let Some(keyword) = &self.keyword {
            let pattern = format!("%{}%", escape_like(keyword));
            condition = condition.add(Expr::col((E::default(), E::search_column())).ilike(pattern));
        }

        for filter in &self.filters {
            let (column, kind) = E::filter_column(&filter.field).ok_or_else(|| {
                AppError::bad_request(format!("Unknown filter field: {}", filter.field))
            })?;
            let value = kind.parse(&filter.field, &filter.value)?;
            if kind == FieldKind::Id && filter.op != Comparison::Eq {
                return Err(AppError::bad_request(format!(
                    "Field {} only supports equality",
                    filter.field
                )));
            }
            condition = condition.add(match filter.op {
                Comparison::Eq => column.eq(value),
                Comparison::Gt => column.gt(value),
                Comparison::Gte => column.gte(value),
                Comparison::Lt => column.lt(value),
                Comparison::Lte => column.lte(value),
            });
        }

        Ok(condition)
    }

    /// Applies the predicates, then the page window.
    pub fn apply<E: Filterable>(&self, select: Select<E>) -> AppResult<Select<E>> {
        let mut select = select.filter(self.condition::<E>()?);
        if let Some(page) = self.page {
            select = select.limit(page.size).offset(page.offset);
        }
        Ok(select)
    }
}

// `%`, `_` and `\` are wildcard/escape characters for ILIKE.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Id,
}

impl FieldKind {
    fn parse(&self, field: &str, raw: &str) -> AppResult<Value> {
        let invalid = || AppError::bad_request(format!("Invalid value for {field}: {raw}"));
        let raw = raw.trim();
        Ok(match self {
            FieldKind::Text => Value::from(raw.to_string()),
            FieldKind::Integer => Value::from(raw.parse::<i64>().map_err(|_| invalid())?),
            FieldKind::Float => {
                let number = raw.parse::<f64>().map_err(|_| invalid())?;
                if !number.is_finite() {
                    return Err(invalid());
                }
                Value::from(number)
            }
            FieldKind::Id => Value::from(Uuid::parse_str(raw).map_err(|_| invalid())?),
        })
    }
}

/// How a catalog entity exposes itself to [`ListQuery`].
pub trait Filterable: EntityTrait {
    /// Column matched by `keyword`.
    fn search_column() -> Self::Column;

    /// Maps a public filter name to its column, or `None` if it is not filterable.
    fn filter_column(field: &str) -> Option<(Self::Column, FieldKind)>;
}

impl Filterable for crate::entity::restaurants::Entity {
    fn search_column() -> Self::Column {
        crate::entity::restaurants::Column::Name
    }

    fn filter_column(field: &str) -> Option<(Self::Column, FieldKind)> {
        use crate::entity::restaurants::Column;
        match field {
            "name" => Some((Column::Name, FieldKind::Text)),
            "address" => Some((Column::Address, FieldKind::Text)),
            "rating" => Some((Column::Rating, FieldKind::Float)),
            _ => None,
        }
    }
}

impl Filterable for crate::entity::dishes::Entity {
    fn search_column() -> Self::Column {
        crate::entity::dishes::Column::Name
    }

    fn filter_column(field: &str) -> Option<(Self::Column, FieldKind)> {
        use crate::entity::dishes::Column;
        match field {
            "name" => Some((Column::Name, FieldKind::Text)),
            "description" => Some((Column::Description, FieldKind::Text)),
            "rating" => Some((Column::Rating, FieldKind::Float)),
            "price" => Some((Column::Price, FieldKind::Integer)),
            "restaurant" => Some((Column::RestaurantId, FieldKind::Id)),
            _ => None,
        }
    }
}
