//! Static category reference data and name resolution.

pub mod category;

use std::collections::HashMap;

use once_cell::sync::Lazy;

pub use category::{Category, CategoryId, SubCategory, SubCategoryId};

static STANDARD: Lazy<Taxonomy> = Lazy::new(Taxonomy::build_standard);

/// Read-only lookup tables for categories and subcategories.
///
/// Names are normalized once when the taxonomy is built so that aggregation code
/// only ever sees [`CategoryId`] values.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<Category>,
    subcategories: Vec<SubCategory>,
    by_name: HashMap<String, CategoryId>,
    parents: HashMap<SubCategoryId, CategoryId>,
}

impl Taxonomy {
    /// Builds a taxonomy from caller-supplied reference data.
    ///
    /// Subcategories pointing to a category that is not present are re-parented
    /// to [`CategoryId::FALLBACK`]. The fallback category is added when the
    /// caller did not supply one, so every lookup resolves to a stored category.
    pub fn from_parts(mut categories: Vec<Category>, subcategories: Vec<SubCategory>) -> Self {
        if !categories.iter().any(|c| c.id == CategoryId::FALLBACK) {
            tracing::debug!("fallback category missing, adding default");
            categories.push(Category::new(CategoryId::FALLBACK, "Other"));
        }

        let mut by_name = HashMap::new();
        for category in &categories {
            by_name.insert(normalize(&category.name), category.id);
            by_name.insert(category.id.as_str().to_string(), category.id);
        }

        let mut parents = HashMap::new();
        let mut subs = Vec::with_capacity(subcategories.len());
        for mut sub in subcategories {
            if !categories.iter().any(|c| c.id == sub.category_id) {
                tracing::warn!(
                    subcategory = %sub.id,
                    parent = %sub.category_id,
                    "subcategory parent missing, using fallback category"
                );
                sub.category_id = CategoryId::FALLBACK;
            }
            by_name
                .entry(normalize(&sub.name))
                .or_insert(sub.category_id);
            parents.insert(sub.id.clone(), sub.category_id);
            subs.push(sub);
        }

        Self {
            categories,
            subcategories: subs,
            by_name,
            parents,
        }
    }

    /// Shared default taxonomy.
    pub fn standard() -> &'static Taxonomy {
        &STANDARD
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn subcategory(&self, id: &SubCategoryId) -> Option<&SubCategory> {
        self.subcategories.iter().find(|s| &s.id == id)
    }

    /// Active categories ordered for display.
    pub fn active_categories(&self) -> Vec<&Category> {
        let mut active: Vec<&Category> = self.categories.iter().filter(|c| c.is_active).collect();
        active.sort_by_key(|c| (c.sort_order, c.id));
        active
    }

    pub fn subcategories_of(&self, id: CategoryId) -> Vec<&SubCategory> {
        let mut subs: Vec<&SubCategory> = self
            .subcategories
            .iter()
            .filter(|s| s.category_id == id)
            .collect();
        subs.sort_by_key(|s| s.sort_order);
        subs
    }

    /// Returns the parent category of a subcategory, or the fallback category.
    pub fn parent_of(&self, id: &SubCategoryId) -> CategoryId {
        self.parents.get(id).copied().unwrap_or(CategoryId::FALLBACK)
    }

    /// Resolves a display or subcategory name to a category id.
    pub fn resolve_name(&self, name: &str) -> CategoryId {
        match self.by_name.get(&normalize(name)) {
            Some(id) => *id,
            None => {
                tracing::debug!(name, "unmapped category name, using fallback");
                CategoryId::FALLBACK
            }
        }
    }

    /// Sum of the allocation percentages of the active categories.
    pub fn total_allocation_percent(&self) -> f64 {
        self.categories
            .iter()
            .filter(|c| c.is_active)
            .map(|c| c.budget_allocation_percent)
            .sum()
    }

    fn build_standard() -> Taxonomy {
        let categories = vec![
            Category::new(CategoryId::Food, "Food & Dining")
                .with_style("fork.knife", "#FF9500")
                .with_allocation(15.0)
                .with_sort_order(0),
            Category::new(CategoryId::Transport, "Transportation")
                .with_style("car", "#007AFF")
                .with_allocation(10.0)
                .with_sort_order(1),
            Category::new(CategoryId::Housing, "Housing")
                .with_style("house", "#5856D6")
                .with_allocation(30.0)
                .with_sort_order(2),
            Category::new(CategoryId::Utilities, "Utilities")
                .with_style("bolt", "#FFCC00")
                .with_allocation(8.0)
                .with_sort_order(3),
            Category::new(CategoryId::Health, "Health")
                .with_style("heart", "#FF2D55")
                .with_allocation(5.0)
                .with_sort_order(4),
            Category::new(CategoryId::Entertainment, "Entertainment")
                .with_style("film", "#AF52DE")
                .with_allocation(5.0)
                .with_sort_order(5),
            Category::new(CategoryId::Shopping, "Shopping")
                .with_style("bag", "#FF3B30")
                .with_allocation(7.0)
                .with_sort_order(6),
            Category::new(CategoryId::Education, "Education")
                .with_style("book", "#34C759")
                .with_allocation(5.0)
                .with_sort_order(7),
            Category::new(CategoryId::Savings, "Savings")
                .with_style("banknote", "#30B0C7")
                .with_allocation(10.0)
                .with_sort_order(8),
            Category::new(CategoryId::Other, "Other")
                .with_style("ellipsis", "#8E8E93")
                .with_allocation(5.0)
                .with_sort_order(9),
        ];

        let subcategories = vec![
            SubCategory::new("groceries", CategoryId::Food, "Groceries"),
            SubCategory::new("restaurants", CategoryId::Food, "Restaurants"),
            SubCategory::new("coffee", CategoryId::Food, "Coffee"),
            SubCategory::new("fuel", CategoryId::Transport, "Fuel"),
            SubCategory::new("public_transit", CategoryId::Transport, "Public Transit"),
            SubCategory::new("taxi", CategoryId::Transport, "Taxi"),
            SubCategory::new("rent", CategoryId::Housing, "Rent"),
            SubCategory::new("maintenance", CategoryId::Housing, "Maintenance"),
            SubCategory::new("electricity", CategoryId::Utilities, "Electricity"),
            SubCategory::new("internet", CategoryId::Utilities, "Internet"),
            SubCategory::new("phone", CategoryId::Utilities, "Phone"),
            SubCategory::new("pharmacy", CategoryId::Health, "Pharmacy"),
            SubCategory::new("fitness", CategoryId::Health, "Fitness"),
            SubCategory::new("streaming", CategoryId::Entertainment, "Streaming"),
            SubCategory::new("events", CategoryId::Entertainment, "Events"),
            SubCategory::new("clothing", CategoryId::Shopping, "Clothing"),
            SubCategory::new("electronics", CategoryId::Shopping, "Electronics"),
            SubCategory::new("courses", CategoryId::Education, "Courses"),
            SubCategory::new("books", CategoryId::Education, "Books"),
            SubCategory::new("emergency_fund", CategoryId::Savings, "Emergency Fund"),
            SubCategory::new("investments", CategoryId::Savings, "Investments"),
            SubCategory::new("miscellaneous", CategoryId::Other, "Miscellaneous"),
        ];

        Taxonomy::from_parts(categories, subcategories)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
