//! Plain-text presentation of [`AnalysisState`].

use std::fmt::Write;

use crate::model::{DietCategory, DishAnalysis, GroupedResults};
use crate::pipeline::AnalysisState;

const DEFAULT_ERROR: &str = "An error occurred while analyzing the menu";

/// Render any state as the text a user should see
pub fn render_state(state: &AnalysisState) -> String {
    match state {
        AnalysisState::Idle => "Upload a menu photo to identify vegetarian and vegan dishes\n\
                                Supports JPEG and PNG formats\n"
            .to_string(),
        AnalysisState::Uploading => {
            "Uploading your menu...\nThis should only take a moment\n".to_string()
        }
        AnalysisState::Processing => {
            "Analyzing menu contents...\nWe're identifying vegetarian and vegan dishes\n"
                .to_string()
        }
        AnalysisState::Complete { results } => render_results(&GroupedResults::from_dishes(results)),
        AnalysisState::Error { message } => {
            let message = if message.trim().is_empty() {
                DEFAULT_ERROR
            } else {
                message.as_str()
            };
            format!("{}\nTry again with a new photo of the menu.\n", message)
        }
    }
}

/// Grouped results, empty sections omitted
pub fn render_results(grouped: &GroupedResults) -> String {
    let mut out = String::from("Analysis Results\n");

    if grouped.is_empty() {
        out.push_str("\nNo dishes found to analyze.\n");
        return out;
    }

    for (category, dishes) in grouped.sections() {
        if dishes.is_empty() {
            continue;
        }
        let _ = write!(out, "\n{} Dishes\n", category.label());
        for dish in dishes {
            out.push_str(&render_dish(dish));
        }
    }

    out
}

fn render_dish(dish: &DishAnalysis) -> String {
    let marker = match dish.category() {
        DietCategory::Vegan | DietCategory::Vegetarian => '+',
        DietCategory::NonVegetarian => '-',
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {} {} [{}] ({}% confident)",
        marker,
        dish.name,
        dish.category(),
        dish.display_confidence()
    );
    if !dish.reasoning.trim().is_empty() {
        let _ = writeln!(out, "    Reasoning: {}", dish.reasoning.trim());
    }
    if !dish.ingredients.is_empty() {
        let _ = writeln!(out, "    Likely ingredients: {}", dish.ingredients.join(", "));
    }
    out
}
