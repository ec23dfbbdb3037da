//! Current time lookup

use super::{required_str, Tool, ToolError};
use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Value};
use tracing::info;

/// Reports the host's current local time, tagged with the requested city
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &'static str {
        "get_current_time"
    }

    fn description(&self) -> &'static str {
        "Returns the current time in a specified city"
    }

    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let city = required_str(&input, "city")?;
        info!("city: {}", city);

        Ok(json!({
            "status": "success",
            "city": city,
            "time": Local::now().to_rfc3339(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_time() {
        let out = CurrentTimeTool
            .invoke(json!({ "city": "London" }))
            .await
            .unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["city"], "London");
        let time = out["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
    }

    #[tokio::test]
    async fn test_missing_city() {
        let err = CurrentTimeTool.invoke(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::Invalid(_)));
    }
}
