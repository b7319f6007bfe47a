use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for top-level spending categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Food,
    Transport,
    Housing,
    Utilities,
    Health,
    Entertainment,
    Shopping,
    Education,
    Savings,
    Other,
}

impl CategoryId {
    /// Category that absorbs every unmapped name or subcategory.
    pub const FALLBACK: CategoryId = CategoryId::Other;

    pub const ALL: [CategoryId; 10] = [
        CategoryId::Food,
        CategoryId::Transport,
        CategoryId::Housing,
        CategoryId::Utilities,
        CategoryId::Health,
        CategoryId::Entertainment,
        CategoryId::Shopping,
        CategoryId::Education,
        CategoryId::Savings,
        CategoryId::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryId::Food => "food",
            CategoryId::Transport => "transport",
            CategoryId::Housing => "housing",
            CategoryId::Utilities => "utilities",
            CategoryId::Health => "health",
            CategoryId::Entertainment => "entertainment",
            CategoryId::Shopping => "shopping",
            CategoryId::Education => "education",
            CategoryId::Savings => "savings",
            CategoryId::Other => "other",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier for a subcategory, unique across the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubCategoryId(pub String);

impl SubCategoryId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubCategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-level category reference data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub is_active: bool,
    pub sort_order: u32,
    /// Share of the total budget suggested for this category, in percent.
    pub budget_allocation_percent: f64,
    pub is_default: bool,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon: String::new(),
            color: String::new(),
            is_active: true,
            sort_order: 0,
            budget_allocation_percent: 0.0,
            is_default: id == CategoryId::FALLBACK,
        }
    }

    pub fn with_style(mut self, icon: impl Into<String>, color: impl Into<String>) -> Self {
        self.icon = icon.into();
        self.color = color.into();
        self
    }

    pub fn with_allocation(mut self, percent: f64) -> Self {
        self.budget_allocation_percent = percent;
        self
    }

    pub fn with_sort_order(mut self, sort_order: u32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// Second-level category; always owned by exactly one [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub category_id: CategoryId,
    pub name: String,
    pub icon: String,
    pub is_active: bool,
    pub sort_order: u32,
    pub is_default: bool,
}

impl SubCategory {
    pub fn new(id: impl Into<String>, category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id: SubCategoryId::new(id),
            category_id,
            name: name.into(),
            icon: String::new(),
            is_active: true,
            sort_order: 0,
            is_default: false,
        }
    }
}
