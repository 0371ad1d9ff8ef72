//! Mock Jolokia agent for testing
//!
//! Serves the agent endpoint over real HTTP with wiremock. Bulk bodies are
//! answered request by request from a small in-memory MBean registry.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use wiremock::{
    matchers::{header, method, path, path_regex, query_param},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

use super::test_data::{auth, error_reply, version_value};

pub const AGENT_PATH: &str = "/jolokia";

/// Answers protocol requests from an attribute table
#[derive(Clone, Default)]
pub struct FakeAgent {
    // mbean → attribute → value
    registry: BTreeMap<String, BTreeMap<String, Value>>,
}

impl FakeAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, mbean: &str, attribute: &str, value: Value) -> Self {
        self.registry
            .entry(mbean.to_string())
            .or_default()
            .insert(attribute.to_string(), value);
        self
    }

    fn ok(&self, request: &Value, value: Value) -> Value {
        json!({
            "status": 200,
            "timestamp": 1700000000,
            "request": request,
            "value": value
        })
    }

    fn not_found(&self, mbean: &str) -> Value {
        error_reply(
            404,
            "javax.management.InstanceNotFoundException",
            &format!("{} not found", mbean),
        )
    }

    fn read(&self, request: &Value) -> Value {
        let mbean = request["mbean"].as_str().unwrap_or_default();
        let Some(attributes) = self.registry.get(mbean) else {
            return self.not_found(mbean);
        };

        match &request["attribute"] {
            Value::Null => {
                let all: Map<String, Value> = attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                self.ok(request, Value::Object(all))
            }
            Value::String(name) => match attributes.get(name) {
                Some(value) => {
                    let mut value = value.clone();
                    if let Some(path) = request["path"].as_str() {
                        for part in path.split('/') {
                            value = value[part].clone();
                        }
                    }
                    self.ok(request, value)
                }
                None => error_reply(
                    404,
                    "javax.management.AttributeNotFoundException",
                    &format!("No attribute {} for {}", name, mbean),
                ),
            },
            Value::Array(names) => {
                let picked: Map<String, Value> = names
                    .iter()
                    .filter_map(|n| n.as_str())
                    .filter_map(|n| attributes.get(n).map(|v| (n.to_string(), v.clone())))
                    .collect();
                self.ok(request, Value::Object(picked))
            }
            _ => error_reply(400, "java.lang.IllegalArgumentException", "bad attribute"),
        }
    }

    fn search(&self, request: &Value) -> Value {
        let pattern = request["mbean"].as_str().unwrap_or_default();
        let domain = pattern.split(':').next().unwrap_or_default();
        let names: Vec<&String> = self
            .registry
            .keys()
            .filter(|name| name.split(':').next() == Some(domain))
            .collect();
        self.ok(request, json!(names))
    }

    fn list(&self, request: &Value) -> Value {
        let mut domains = Map::new();
        for (name, attributes) in &self.registry {
            let Some((domain, keys)) = name.split_once(':') else {
                continue;
            };
            let attr: Map<String, Value> = attributes
                .keys()
                .map(|a| (a.clone(), json!({"desc": a, "rw": false, "type": "java.lang.Object"})))
                .collect();
            let entry = domains
                .entry(domain.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(mbeans) = entry {
                mbeans.insert(
                    keys.to_string(),
                    json!({"desc": name, "attr": attr, "op": {}}),
                );
            }
        }
        self.ok(request, Value::Object(domains))
    }

    pub fn answer(&self, request: &Value) -> Value {
        match request["type"].as_str() {
            Some("read") => self.read(request),
            Some("search") => self.search(request),
            Some("list") => self.list(request),
            Some("version") => self.ok(request, version_value()),
            Some("exec") => self.ok(request, Value::Null),
            Some("write") => self.ok(request, Value::Null),
            _ => error_reply(400, "java.lang.IllegalArgumentException", "unknown request type"),
        }
    }
}

impl Respond for FakeAgent {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match request.body_json::<Value>() {
            Ok(Value::Array(items)) => {
                let replies: Vec<Value> = items.iter().map(|item| self.answer(item)).collect();
                ResponseTemplate::new(200).set_body_json(replies)
            }
            Ok(single) => ResponseTemplate::new(200).set_body_json(self.answer(&single)),
            Err(_) => ResponseTemplate::new(400),
        }
    }
}

/// Mock agent server that simulates a Jolokia endpoint
pub struct MockAgentServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockAgentServer {
    /// Create a new mock agent server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Agent endpoint URL
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, AGENT_PATH)
    }

    /// Answer POSTed batches from a fake agent
    pub async fn mock_agent(&self, agent: FakeAgent) {
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .respond_with(agent)
            .mount(&self.server)
            .await;
    }

    /// Like `mock_agent`, but only for requests with the right credentials
    pub async fn mock_secured_agent(&self, agent: FakeAgent) {
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .and(header("authorization", auth::BASIC_HEADER))
            .respond_with(agent)
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    /// Answer only when the given query parameter is present
    pub async fn mock_agent_with_query(&self, key: &str, value: &str, agent: FakeAgent) {
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .and(query_param(key, value))
            .respond_with(agent)
            .mount(&self.server)
            .await;
    }

    /// Answer GET requests below the agent path
    pub async fn mock_get(&self, reply: Value) {
        Mock::given(method("GET"))
            .and(path_regex(format!("^{}/.+", AGENT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .mount(&self.server)
            .await;
    }

    /// Reply with a fixed body regardless of the request
    pub async fn mock_raw_reply(&self, reply: Value) {
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .mount(&self.server)
            .await;
    }

    /// Mock an HTTP-level failure
    pub async fn mock_http_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("Internal Server Error"))
            .mount(&self.server)
            .await;
    }

    /// Mock a body that is not JSON
    pub async fn mock_garbage(&self) {
        Mock::given(method("POST"))
            .and(path(AGENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.body_json::<Value>().ok())
            .collect()
    }

    /// URLs of every request received so far
    pub async fn received_urls(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.to_string())
            .collect()
    }
}
