use serde::{Deserialize, Serialize};
use std::fmt;

/// Dietary classification of a single menu item as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishAnalysis {
    pub name: String,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    /// Percentage, nominally 0-100. Not validated; see [`DishAnalysis::display_confidence`].
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl DishAnalysis {
    /// Vegan implies vegetarian, whatever the raw field says.
    pub fn is_effectively_vegetarian(&self) -> bool {
        self.is_vegetarian || self.is_vegan
    }

    pub fn category(&self) -> DietCategory {
        if self.is_vegan {
            DietCategory::Vegan
        } else if self.is_vegetarian {
            DietCategory::Vegetarian
        } else {
            DietCategory::NonVegetarian
        }
    }

    /// Confidence clamped into 0-100 and rounded for display. NaN shows as 0.
    pub fn display_confidence(&self) -> u8 {
        if self.confidence.is_nan() {
            return 0;
        }
        self.confidence.clamp(0.0, 100.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DietCategory {
    Vegan,
    Vegetarian,
    NonVegetarian,
}

impl DietCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DietCategory::Vegan => "Vegan",
            DietCategory::Vegetarian => "Vegetarian",
            DietCategory::NonVegetarian => "Non-Vegetarian",
        }
    }
}

impl fmt::Display for DietCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Results split into the three display sections, each ordered by
/// descending confidence. Ties keep their input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedResults {
    pub vegan: Vec<DishAnalysis>,
    pub vegetarian: Vec<DishAnalysis>,
    pub non_vegetarian: Vec<DishAnalysis>,
}

impl GroupedResults {
    pub fn from_dishes(dishes: &[DishAnalysis]) -> Self {
        let mut grouped = GroupedResults::default();
        for dish in dishes {
            match dish.category() {
                DietCategory::Vegan => grouped.vegan.push(dish.clone()),
                DietCategory::Vegetarian => grouped.vegetarian.push(dish.clone()),
                DietCategory::NonVegetarian => grouped.non_vegetarian.push(dish.clone()),
            }
        }

        for section in [
            &mut grouped.vegan,
            &mut grouped.vegetarian,
            &mut grouped.non_vegetarian,
        ] {
            // sort_by is stable
            section.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        }

        grouped
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.vegan.len() + self.vegetarian.len() + self.non_vegetarian.len()
    }

    /// Sections in display order, including empty ones.
    pub fn sections(&self) -> [(DietCategory, &[DishAnalysis]); 3] {
        [
            (DietCategory::Vegan, self.vegan.as_slice()),
            (DietCategory::Vegetarian, self.vegetarian.as_slice()),
            (DietCategory::NonVegetarian, self.non_vegetarian.as_slice()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish(name: &str, vegetarian: bool, vegan: bool, confidence: f64) -> DishAnalysis {
        DishAnalysis {
            name: name.to_string(),
            is_vegetarian: vegetarian,
            is_vegan: vegan,
            confidence,
            reasoning: String::new(),
            ingredients: Vec::new(),
        }
    }

    #[test]
    fn test_vegan_implies_vegetarian() {
        let burger = dish("Veggie Burger", false, true, 90.0);
        assert!(burger.is_effectively_vegetarian());
        assert_eq!(burger.category(), DietCategory::Vegan);
    }

    #[test]
    fn test_grouping_places_vegan_only_under_vegan() {
        let dishes = vec![
            dish("Caesar Salad", true, false, 80.0),
            dish("Veggie Burger", false, true, 90.0),
            dish("Steak", false, false, 99.0),
        ];
        let grouped = GroupedResults::from_dishes(&dishes);

        assert_eq!(grouped.vegan.len(), 1);
        assert_eq!(grouped.vegan[0].name, "Veggie Burger");
        assert_eq!(grouped.vegetarian.len(), 1);
        assert_eq!(grouped.vegetarian[0].name, "Caesar Salad");
        assert_eq!(grouped.non_vegetarian[0].name, "Steak");
        assert_eq!(grouped.len(), 3);
    }

    #[test]
    fn test_sort_descending_and_stable() {
        let dishes = vec![
            dish("A", true, false, 70.0),
            dish("B", true, false, 95.0),
            dish("C", true, false, 70.0),
            dish("D", true, false, 85.0),
            dish("E", true, false, 70.0),
        ];
        let grouped = GroupedResults::from_dishes(&dishes);
        let names: Vec<&str> = grouped.vegetarian.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "A", "C", "E"]);
    }

    #[test]
    fn test_empty_grouping() {
        let grouped = GroupedResults::from_dishes(&[]);
        assert!(grouped.is_empty());
        assert!(grouped.sections().iter().all(|(_, d)| d.is_empty()));
    }

    #[test]
    fn test_display_confidence_clamps() {
        assert_eq!(dish("x", true, false, 150.0).display_confidence(), 100);
        assert_eq!(dish("x", true, false, -3.0).display_confidence(), 0);
        assert_eq!(dish("x", true, false, 87.6).display_confidence(), 88);
        assert_eq!(dish("x", true, false, f64::NAN).display_confidence(), 0);
    }

    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let json = r#"{"name":"Soup","is_vegetarian":true,"is_vegan":true,"confidence":75}"#;
        let parsed: DishAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.name, "Soup");
        assert_eq!(parsed.confidence, 75.0);
        assert!(parsed.reasoning.is_empty());
        assert!(parsed.ingredients.is_empty());
    }
}
