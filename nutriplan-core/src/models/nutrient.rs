use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Calorie and macro totals for a dish, an option, a slot or a whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fats: f64,
}

impl NutrientTotals {
    pub fn new(calories: f64, protein: f64, carbohydrates: f64, fats: f64) -> Self {
        Self {
            calories,
            protein,
            carbohydrates,
            fats,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Formats a nutrient amount the way every printed figure is shown: one decimal.
pub fn one_decimal(value: f64) -> String {
    let value = if value == 0.0 || !value.is_finite() {
        0.0
    } else {
        value
    };
    format!("{:.1}", value)
}

impl Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, rhs: Self) -> Self::Output {
        NutrientTotals {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbohydrates: self.carbohydrates + rhs.carbohydrates,
            fats: self.fats + rhs.fats,
        }
    }
}

impl AddAssign for NutrientTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for NutrientTotals {
    type Output = NutrientTotals;

    fn sub(self, rhs: Self) -> Self::Output {
        NutrientTotals {
            calories: self.calories - rhs.calories,
            protein: self.protein - rhs.protein,
            carbohydrates: self.carbohydrates - rhs.carbohydrates,
            fats: self.fats - rhs.fats,
        }
    }
}

impl Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::default(), |acc, t| acc + t)
    }
}

impl fmt::Display for NutrientTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "calories: {} kcal, protein: {} g, carbohydrates: {} g, fats: {} g",
            one_decimal(self.calories),
            one_decimal(self.protein),
            one_decimal(self.carbohydrates),
            one_decimal(self.fats)
        )
    }
}
