//! Keyword buckets for the dishes of combination slots (lunch and dinner).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::Dish;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishCategory {
    Salad,
    Accompaniment,
    RotiRice,
    VegetableCurry,
    Other,
}

impl DishCategory {
    /// Order the buckets are printed in.
    pub const DISPLAY_ORDER: [DishCategory; 5] = [
        DishCategory::Salad,
        DishCategory::Accompaniment,
        DishCategory::RotiRice,
        DishCategory::VegetableCurry,
        DishCategory::Other,
    ];

    /// Heading of a bucket holding `count` dishes.
    pub fn heading(&self, count: usize) -> &'static str {
        match self {
            DishCategory::Salad => "Salad Options (Choose Any 1 Option)",
            DishCategory::Accompaniment => "Accompaniments Options (Choose Any 1 Option)",
            DishCategory::RotiRice => "Roti/Rice & Sides Options (Choose Any 1 Option)",
            DishCategory::VegetableCurry => "Vegetable/Dal & Curries Options (Choose Any 1 Option)",
            DishCategory::Other if count > 1 => "Choose Any 1 Option",
            DishCategory::Other => "Option",
        }
    }
}

impl fmt::Display for DishCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DishCategory::Salad => write!(f, "salad"),
            DishCategory::Accompaniment => write!(f, "accompaniment"),
            DishCategory::RotiRice => write!(f, "roti_rice"),
            DishCategory::VegetableCurry => write!(f, "vegetable_curry"),
            DishCategory::Other => write!(f, "other"),
        }
    }
}

impl FromStr for DishCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "salad" => Ok(DishCategory::Salad),
            "accompaniment" | "accompaniments" => Ok(DishCategory::Accompaniment),
            "roti_rice" | "roti" | "rice" => Ok(DishCategory::RotiRice),
            "vegetable_curry" | "vegetable" | "curry" => Ok(DishCategory::VegetableCurry),
            "other" => Ok(DishCategory::Other),
            _ => Err(format!(
                "Invalid category '{}'. Valid options: salad, accompaniment, roti_rice, vegetable_curry, other",
                s
            )),
        }
    }
}

const SALAD_KEYWORDS: &[&str] = &["salad", "kachumber", "greens", "kosambari", "slaw", "lettuce"];

const ACCOMPANIMENT_KEYWORDS: &[&str] = &[
    "raita", "curd", "yogurt", "chutney", "pickle", "dahi", "buttermilk", "chaas", "dip", "sauce",
    "hummus", "salsa", "guacamole", "soup", "shorba",
];

const ROTI_RICE_KEYWORDS: &[&str] = &[
    "roti", "rice", "bhaat", "khichdi", "pulao", "biryani", "chapati", "phulka", "bhakri", "thepla",
    "paratha", "naan", "kulcha", "rotla", "bread", "toast", "sandwich", "wrap", "frankie", "taco",
    "quesadilla", "dosa", "idli", "uttapam", "quinoa", "oats", "poha", "upma",
];

const VEGETABLE_CURRY_KEYWORDS: &[&str] = &[
    "sabzi", "bharta", "subzi", "curry", "saag", "korma", "dal", "daal", "amti", "kadhi", "gravy",
    "paneer", "kofta", "bhaji", "bhindi", "tofu", "stir-fry", "masala", "vegetable", "veg", "aloo",
    "gobi", "gobhi", "corn", "mushroom", "soya", "rajma", "chana", "chole", "lobia", "matar",
    "mutter", "palak", "methi", "baingan", "capsicum", "egg", "chicken", "fish", "mutton", "meat",
    "cheela", "chilla", "besan", "spinach", "fenugreek", "gawar", "cluster bean", "lentil",
    "legume", "bean", "cabbage",
];

/// One rule of a [`CategoryTable`]: any keyword match puts a dish in `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: DishCategory,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: DishCategory, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }
}

/// Keyword rules tried in order; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(vec![
            CategoryRule::new(DishCategory::RotiRice, ROTI_RICE_KEYWORDS),
            CategoryRule::new(DishCategory::Salad, SALAD_KEYWORDS),
            CategoryRule::new(DishCategory::Accompaniment, ACCOMPANIMENT_KEYWORDS),
            CategoryRule::new(DishCategory::VegetableCurry, VEGETABLE_CURRY_KEYWORDS),
        ])
    }
}

impl CategoryTable {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Appends keywords to the rule for `category`, adding the rule at the
    /// end when the table has none for it.
    pub fn with_keywords<S: AsRef<str>>(mut self, category: DishCategory, keywords: &[S]) -> Self {
        let keywords = keywords.iter().map(|k| k.as_ref().trim().to_lowercase()).filter(|k| !k.is_empty());
        match self.rules.iter_mut().find(|rule| rule.category == category) {
            Some(rule) => rule.keywords.extend(keywords),
            None => self.rules.push(CategoryRule {
                category,
                keywords: keywords.collect(),
            }),
        }
        self
    }

    /// Extends the table with a category name to keywords map, as found in
    /// configuration. Unknown category names are ignored.
    pub fn with_extra_keywords(self, extra: &BTreeMap<String, Vec<String>>) -> Self {
        extra.iter().fold(self, |table, (name, keywords)| match name.parse() {
            Ok(category) => table.with_keywords(category, keywords.as_slice()),
            Err(_) => {
                tracing::debug!(category = %name, "ignoring keywords for unknown category");
                table
            }
        })
    }

    /// Matches against the dish's name and description, case-insensitively.
    pub fn classify(&self, dish: &Dish) -> DishCategory {
        let text = format!(
            "{} {}",
            dish.name().unwrap_or_default(),
            dish.description().unwrap_or_default()
        )
        .to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| rule.category)
            .unwrap_or(DishCategory::Other)
    }

    /// Buckets `dishes` in display order, skipping empty buckets. Dishes keep
    /// their relative order within a bucket.
    pub fn group(&self, dishes: &[Dish]) -> Vec<(DishCategory, Vec<Dish>)> {
        let mut buckets: BTreeMap<DishCategory, Vec<Dish>> = BTreeMap::new();
        for dish in dishes {
            buckets.entry(self.classify(dish)).or_default().push(dish.clone());
        }
        DishCategory::DISPLAY_ORDER
            .iter()
            .filter_map(|category| buckets.remove(category).map(|dishes| (*category, dishes)))
            .collect()
    }
}
