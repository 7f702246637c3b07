//! Categorical cross-tabulation: the leading entry of each group.

use std::collections::HashMap;

use log::warn;
use serde::Serialize;

use crate::{
    aggregate::{GroupedSums, stable_argmax},
    coerce::{Coerced, coerce_numeric},
    data::Table,
    error::Result,
    roles::{Role, RoleMap},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntry {
    pub group: String,
    pub value: String,
    pub measure: f64,
}

/// For each distinct `group_col` value (first-seen order), the `value_col`
/// entry with the largest measure. The measure is the sum of `measure_col`
/// when given, otherwise the number of occurrences. Ties go to the entry seen
/// first within the group.
pub fn top_entry_per_group(
    table: &Table,
    group_col: &str,
    value_col: &str,
    measure_col: Option<&str>,
) -> Result<Vec<TopEntry>> {
    let groups = table.require_column(group_col)?;
    let values = table.require_column(value_col)?;
    let measures: Option<Coerced<f64>> = match measure_col {
        Some(name) => match table.column(name) {
            Some(column) => Some(coerce_numeric(column)),
            None => {
                warn!("Measure column '{name}' not found; counting occurrences instead");
                None
            }
        },
        None => None,
    };

    let mut group_order: Vec<String> = Vec::new();
    let mut per_group: HashMap<String, GroupedSums<String>> = HashMap::new();
    for (row, (group, value)) in groups.values.iter().zip(&values.values).enumerate() {
        let Some(group) = group.group_key() else {
            continue;
        };
        let Some(value) = value.group_key() else {
            continue;
        };
        let measure = match &measures {
            Some(coerced) => coerced.get(row).copied().unwrap_or(0.0),
            None => 1.0,
        };
        per_group
            .entry(group.clone())
            .or_insert_with(|| {
                group_order.push(group);
                GroupedSums::new()
            })
            .add(value, measure);
    }

    Ok(group_order
        .into_iter()
        .filter_map(|group| {
            let entries = per_group.remove(&group)?.into_table();
            let best = stable_argmax(entries.iter().map(|row| row.measure))?;
            let row = &entries.rows()[best];
            Some(TopEntry {
                value: row.key.clone(),
                measure: row.measure,
                group,
            })
        })
        .collect())
}

/// Most purchased product per gender. Quantities are summed when a quantity
/// column was resolved, otherwise purchases are counted.
pub fn top_product_by_gender(table: &Table, roles: &RoleMap) -> Result<Vec<TopEntry>> {
    let gender_col = roles.require(Role::Gender)?;
    let product_col = roles.require(Role::Product)?;
    top_entry_per_group(table, gender_col, product_col, roles.get(Role::Quantity))
}
