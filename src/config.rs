//! Heuristic tables that drive role inference and calendar ordering.
//!
//! [`AnalyticsConfig::default`] is the built-in configuration and the only one
//! the analytics need. A YAML file may override individual lists, e.g.
//!
//! ```yaml
//! keywords:
//!   sales: [revenue, turnover]
//! quantity_labels: [qty]
//! ```
//!
//! Lists that are not named keep their defaults.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::roles::Role;

const QUANTITY_KEYWORDS: &[&str] = &["quantity", "count", "item"];
const SALES_KEYWORDS: &[&str] = &["amount", "price", "total", "value", "sales"];
const PRODUCT_KEYWORDS: &[&str] = &["product", "item", "category", "name"];
const DATE_KEYWORDS: &[&str] = &["date", "order", "invoice", "sale", "placed"];
const GENDER_KEYWORDS: &[&str] = &["gender", "sex"];
const QUANTITY_LABELS: &[&str] = &["quantity", "items", "count", "number_of_items"];
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleKeywords {
    pub quantity: Vec<String>,
    pub sales: Vec<String>,
    pub product: Vec<String>,
    pub date: Vec<String>,
    pub gender: Vec<String>,
}

impl Default for RoleKeywords {
    fn default() -> Self {
        Self {
            quantity: owned(QUANTITY_KEYWORDS),
            sales: owned(SALES_KEYWORDS),
            product: owned(PRODUCT_KEYWORDS),
            date: owned(DATE_KEYWORDS),
            gender: owned(GENDER_KEYWORDS),
        }
    }
}

impl RoleKeywords {
    pub fn for_role(&self, role: Role) -> &[String] {
        match role {
            Role::Quantity => &self.quantity,
            Role::Sales => &self.sales,
            Role::Product => &self.product,
            Role::Date => &self.date,
            Role::Gender => &self.gender,
        }
    }

    /// Case-insensitive substring match of `column_name` against the role's list.
    pub fn matches(&self, role: Role, column_name: &str) -> bool {
        let lowered = column_name.to_lowercase();
        self.for_role(role)
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()))
    }
}

/// Canonical January..December ordering used for month-name aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct MonthCalendar {
    names: Vec<String>,
}

impl Default for MonthCalendar {
    fn default() -> Self {
        Self {
            names: owned(&MONTH_NAMES),
        }
    }
}

impl TryFrom<Vec<String>> for MonthCalendar {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        if names.len() != 12 {
            return Err(format!(
                "Month calendar needs exactly 12 names, found {}",
                names.len()
            ));
        }
        Ok(Self { names })
    }
}

impl From<MonthCalendar> for Vec<String> {
    fn from(calendar: MonthCalendar) -> Self {
        calendar.names
    }
}

impl MonthCalendar {
    /// Name of a 1-based month number.
    pub fn name(&self, month: u32) -> Option<&str> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub keywords: RoleKeywords,
    /// Exact, case-folded column names that label a column as a quantity.
    pub quantity_labels: Vec<String>,
    #[serde(rename = "months")]
    pub calendar: MonthCalendar,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            keywords: RoleKeywords::default(),
            quantity_labels: owned(QUANTITY_LABELS),
            calendar: MonthCalendar::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: AnalyticsConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config file {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: AnalyticsConfig =
            serde_yaml::from_str(contents).context("Parsing analytics config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for role in Role::ALL {
            ensure!(
                self.keywords
                    .for_role(role)
                    .iter()
                    .all(|k| !k.trim().is_empty()),
                "Keyword list for role '{role}' contains an empty keyword"
            );
        }
        Ok(())
    }

    pub fn is_quantity_label(&self, column_name: &str) -> bool {
        let lowered = column_name.to_lowercase();
        self.quantity_labels
            .iter()
            .any(|label| label.to_lowercase() == lowered)
    }
}
