//! 天气工具（固定格式的模拟数据，不发网络请求）

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

/// Weather 工具：城市名进，模拟天气文本出
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get current weather for a city (mock data). Args: {\"city\": \"London\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": { "type": "string", "description": "City name" }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let city = args.get("city").and_then(|v| v.as_str()).unwrap_or("").trim();
        if city.is_empty() {
            return Err("Missing 'city' argument".to_string());
        }
        Ok(format!(
            "Mock weather data for {}: Sunny, 22°C, Light breeze",
            city
        ))
    }
}
