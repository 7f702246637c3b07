//! Per-column feature records used for role inference.

use std::collections::HashSet;

use serde::Serialize;

use crate::{
    config::AnalyticsConfig,
    data::{Column, Table, Value},
    roles::Role,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Numeric,
    Text,
    Unknown,
}

impl DeclaredType {
    /// Type implied by the cell variants alone. A column with no present cells
    /// has no type.
    pub fn of(column: &Column) -> Self {
        let mut saw_number = false;
        for value in &column.values {
            match value {
                Value::Text(_) => return DeclaredType::Text,
                Value::Number(_) => saw_number = true,
                Value::Missing => {}
            }
        }
        if saw_number {
            DeclaredType::Numeric
        } else {
            DeclaredType::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeclaredType::Numeric => "numeric",
            DeclaredType::Text => "text",
            DeclaredType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KeywordFlags {
    pub quantity: bool,
    pub sales: bool,
    pub product: bool,
    pub date: bool,
    pub gender: bool,
}

impl KeywordFlags {
    pub fn get(&self, role: Role) -> bool {
        match role {
            Role::Quantity => self.quantity,
            Role::Sales => self.sales,
            Role::Product => self.product,
            Role::Date => self.date,
            Role::Gender => self.gender,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredLabel {
    Quantity,
    NotQuantity,
}

impl InferredLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferredLabel::Quantity => "quantity",
            InferredLabel::NotQuantity => "not_quantity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFeature {
    pub name: String,
    pub declared_type: DeclaredType,
    pub sample_value: Option<String>,
    pub is_numeric: bool,
    pub mean_value: Option<f64>,
    pub unique_count: usize,
    pub keyword_flags: KeywordFlags,
    pub inferred_label: InferredLabel,
}

pub fn extract_features(table: &Table, config: &AnalyticsConfig) -> Vec<ColumnFeature> {
    table
        .columns()
        .iter()
        .map(|column| column_feature(column, config))
        .collect()
}

fn column_feature(column: &Column, config: &AnalyticsConfig) -> ColumnFeature {
    let declared_type = DeclaredType::of(column);
    let is_numeric = declared_type == DeclaredType::Numeric;
    let keywords = &config.keywords;
    ColumnFeature {
        name: column.name.clone(),
        declared_type,
        sample_value: column.values.first().and_then(Value::group_key),
        is_numeric,
        mean_value: if is_numeric { mean(column) } else { None },
        unique_count: unique_count(column),
        keyword_flags: KeywordFlags {
            quantity: keywords.matches(Role::Quantity, &column.name),
            sales: keywords.matches(Role::Sales, &column.name),
            product: keywords.matches(Role::Product, &column.name),
            date: keywords.matches(Role::Date, &column.name),
            gender: keywords.matches(Role::Gender, &column.name),
        },
        inferred_label: if config.is_quantity_label(&column.name) {
            InferredLabel::Quantity
        } else {
            InferredLabel::NotQuantity
        },
    }
}

fn mean(column: &Column) -> Option<f64> {
    let (sum, count) = column
        .values
        .iter()
        .filter_map(|value| match value {
            Value::Number(n) => Some(*n),
            _ => None,
        })
        .fold((0.0, 0usize), |(sum, count), n| (sum + n, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Distinct cells, with missing counted as one value when present.
fn unique_count(column: &Column) -> usize {
    column
        .values
        .iter()
        .map(Value::distinct_key)
        .collect::<HashSet<_>>()
        .len()
}
