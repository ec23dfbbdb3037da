//! Mock weather lookup

use super::{required_str, Tool, ToolError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::info;

/// Weather reports keyed by normalized city name
pub struct WeatherTool {
    reports: HashMap<&'static str, &'static str>,
}

impl WeatherTool {
    pub fn new() -> Self {
        let reports = HashMap::from([
            ("newyork", "The weather in New York is sunny with a temperature of 25°C."),
            ("london", "It's cloudy in London with a temperature of 15°C."),
            ("tokyo", "Tokyo is experiencing light rain and a temperature of 18°C."),
        ]);
        Self { reports }
    }

    /// Lowercase and strip spaces, so "New York" matches "newyork"
    fn normalize(city: &str) -> String {
        city.to_lowercase().replace(' ', "")
    }

    pub fn report(&self, city: &str) -> Option<&'static str> {
        self.reports.get(Self::normalize(city).as_str()).copied()
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn description(&self) -> &'static str {
        "Retrieves the current weather report for a specified city"
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let city = required_str(&input, "city")?;
        info!("get_weather called for city: {}", city);

        match self.report(city) {
            Some(report) => Ok(json!({ "status": "success", "report": report })),
            None => Err(ToolError::Failed(format!(
                "Sorry, I don't have weather information for '{}'.",
                city
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_lookup() {
        let tool = WeatherTool::new();
        assert!(tool.report("New York").unwrap().contains("sunny"));
        assert!(tool.report("LONDON").unwrap().contains("cloudy"));
        assert!(tool.report("Paris").is_none());
    }

    #[tokio::test]
    async fn test_invoke_known_city() {
        let out = WeatherTool::new()
            .invoke(json!({ "city": "Tokyo" }))
            .await
            .unwrap();
        assert_eq!(
            out,
            json!({
                "status": "success",
                "report": "Tokyo is experiencing light rain and a temperature of 18°C."
            })
        );
    }

    #[tokio::test]
    async fn test_invoke_unknown_city() {
        let err = WeatherTool::new()
            .invoke(json!({ "city": "Paris" }))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Sorry, I don't have weather information for 'Paris'."
        );
    }
}
