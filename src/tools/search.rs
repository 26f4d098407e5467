//! Web 搜索工具
//!
//! 走 DuckDuckGo Instant Answer JSON API（无需密钥），整理为最多 N 条
//! (title / snippet / link) 结果。提供方故障与空结果都以文本返回，不会冒泡异常。

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::tools::Tool;

const ENDPOINT: &str = "https://api.duckduckgo.com/";
const USER_AGENT: &str = "wasp-chat/0.1 (+https://github.com/wasp-team/wasp)";

/// Web Search 工具：查询字符串进，格式化结果列表出
pub struct WebSearchTool {
    client: Client,
    max_results: usize,
}

/// Instant Answer API 响应（只取用到的字段）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DdgResponse {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<DdgTopic>,
}

/// RelatedTopics 数组元素：要么是结果，要么是嵌套的分组
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DdgTopic {
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "FirstURL")]
    first_url: String,
    #[serde(rename = "Topics")]
    topics: Vec<DdgTopic>,
}

/// 整理后的单条结果
#[derive(Debug, Clone, PartialEq)]
struct SearchHit {
    title: String,
    snippet: String,
    link: String,
}

impl WebSearchTool {
    pub fn new(timeout_secs: u64, max_results: usize) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client, max_results }
    }

    async fn fetch(&self, query: &str) -> Result<DdgResponse, String> {
        let resp = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| format!("Search request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("Search provider returned HTTP {}", resp.status()));
        }
        resp.json::<DdgResponse>()
            .await
            .map_err(|e| format!("Search response parse failed: {}", e))
    }
}

/// 摊平响应为结果列表：摘要（若有）在前，RelatedTopics（含嵌套分组）随后
fn collect_hits(resp: DdgResponse, max: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    if !resp.abstract_text.is_empty() {
        hits.push(SearchHit {
            title: if resp.heading.is_empty() {
                resp.abstract_url.clone()
            } else {
                resp.heading.clone()
            },
            snippet: resp.abstract_text.clone(),
            link: resp.abstract_url.clone(),
        });
    }
    let mut queue: std::collections::VecDeque<DdgTopic> = resp.related_topics.into();
    while let Some(topic) = queue.pop_front() {
        if hits.len() >= max {
            break;
        }
        if !topic.topics.is_empty() {
            // 分组节点：其子项排到队首，保持原有顺序
            for sub in topic.topics.into_iter().rev() {
                queue.push_front(sub);
            }
            continue;
        }
        if topic.text.is_empty() {
            continue;
        }
        // Text 形如 "Title - description"；没有分隔符时整段作标题
        let (title, snippet) = match topic.text.split_once(" - ") {
            Some((t, s)) => (t.to_string(), s.to_string()),
            None => (topic.text.clone(), String::new()),
        };
        hits.push(SearchHit {
            title,
            snippet,
            link: topic.first_url,
        });
    }
    hits.truncate(max);
    hits
}

fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No search results found.".to_string();
    }
    let mut out = format!("Search results for '{}':\n\n", query);
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, hit.title));
        if !hit.snippet.is_empty() {
            out.push_str(&format!("   {}\n", hit.snippet));
        }
        if !hit.link.is_empty() {
            out.push_str(&format!("   Source: {}\n", hit.link));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web (DuckDuckGo) and return up to 5 results with title, snippet and link. Args: {\"query\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let query = args.get("query").and_then(|v| v.as_str()).unwrap_or("").trim();
        if query.is_empty() {
            return Err("Missing 'query' argument".to_string());
        }
        tracing::info!(query = %query, "web_search execute");
        let resp = self.fetch(query).await?;
        let hits = collect_hits(resp, self.max_results);
        Ok(format_hits(query, &hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(text: &str, url: &str) -> DdgTopic {
        DdgTopic {
            text: text.to_string(),
            first_url: url.to_string(),
            topics: Vec::new(),
        }
    }

    #[test]
    fn test_abstract_comes_first_and_max_is_respected() {
        let resp = DdgResponse {
            heading: "Rust".to_string(),
            abstract_text: "A systems programming language.".to_string(),
            abstract_url: "https://rust-lang.org".to_string(),
            related_topics: (0..10)
                .map(|i| topic(&format!("Topic {} - detail", i), "https://example.com"))
                .collect(),
        };
        let hits = collect_hits(resp, 5);
        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0].title, "Rust");
        assert_eq!(hits[1].title, "Topic 0");
    }

    #[test]
    fn test_nested_groups_are_flattened_in_order() {
        let group = DdgTopic {
            text: String::new(),
            first_url: String::new(),
            topics: vec![topic("Inner A - x", "u1"), topic("Inner B - y", "u2")],
        };
        let resp = DdgResponse {
            related_topics: vec![group, topic("After - z", "u3")],
            ..Default::default()
        };
        let titles: Vec<String> = collect_hits(resp, 5).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["Inner A", "Inner B", "After"]);
    }

    #[test]
    fn test_empty_results_message() {
        assert_eq!(format_hits("q", &[]), "No search results found.");
    }

    #[test]
    fn test_result_formatting() {
        let hits = vec![SearchHit {
            title: "Title".to_string(),
            snippet: "Snippet".to_string(),
            link: "https://x".to_string(),
        }];
        let out = format_hits("rust", &hits);
        assert!(out.starts_with("Search results for 'rust':"));
        assert!(out.contains("1. Title"));
        assert!(out.contains("Source: https://x"));
    }
}
