/// The system prompt shared by every provider.
///
/// Sets up the dietary-expert persona and the conservative vegan rule.
/// Loaded from `prompt.txt` at compile time so it can be edited without
/// dealing with Rust string syntax.
pub const MENU_ANALYSIS_PROMPT: &str = include_str!("prompt.txt");

/// Literal example of the expected response, embedded in every user prompt.
pub const RESPONSE_SCHEMA_EXAMPLE: &str = r#"{
  "dishes": [
    {
      "name": "Dish Name",
      "is_vegetarian": true,
      "is_vegan": false,
      "confidence": 95,
      "reasoning": "Brief explanation",
      "ingredients": ["ingredient1", "ingredient2"]
    }
  ]
}"#;

/// Build the user message carrying the OCR'd menu text.
pub fn build_user_prompt(menu_text: &str) -> String {
    format!(
        "Analyze these menu items and determine which are vegetarian/vegan. \
         Return ONLY the JSON object in this exact format, with no markdown formatting or code blocks:\n\
         {RESPONSE_SCHEMA_EXAMPLE}\n\n\
         Menu text:\n\
         {}",
        menu_text.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!MENU_ANALYSIS_PROMPT.is_empty());
        assert!(MENU_ANALYSIS_PROMPT.contains("culinary expert"));
        assert!(MENU_ANALYSIS_PROMPT.contains("if in doubt, mark as vegetarian only"));
    }

    #[test]
    fn test_schema_example_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(RESPONSE_SCHEMA_EXAMPLE).unwrap();
        assert!(value["dishes"].is_array());
    }

    #[test]
    fn test_user_prompt_embeds_menu_text() {
        let prompt = build_user_prompt("  Caesar Salad, Veggie Burger \n");
        assert!(prompt.ends_with("Menu text:\nCaesar Salad, Veggie Burger"));
        assert!(prompt.contains("\"dishes\""));
        assert!(prompt.contains("\"is_vegan\""));
    }
}
