use quickstart_core::tool::{Error as ToolError, Tool, ToolResult};
use quickstart_transport::HttpSender;
use reqwest::{Method, Request, Url};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const DEFAULT_ENDPOINT: &str = "https://api.duckduckgo.com/";
const DEFAULT_MAX_RESULTS: usize = 10;

/// Input of [`SearchTool`].
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParameters {
    #[schemars(description = "The search query")]
    query: String,
    #[schemars(
        description = "Maximum number of results to return, 10 by default"
    )]
    #[serde(default)]
    max_results: Option<usize>,
}

/// A single search hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Title of the result.
    pub title: String,
    /// URL of the result.
    pub link: String,
    /// A short description.
    pub description: String,
}

// Fields of the instant answer API we care about.
#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InstantAnswer {
    heading: String,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    results: Vec<Topic>,
    related_topics: Vec<Topic>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct Topic {
    text: String,
    #[serde(rename = "FirstURL")]
    first_url: String,
    // Set on topic groups instead of `Text`.
    topics: Vec<Topic>,
}

/// A web search tool backed by the DuckDuckGo instant answer API.
pub struct SearchTool<S> {
    sender: S,
    endpoint: String,
    parameter_schema: Value,
}

impl<S: HttpSender> SearchTool<S> {
    /// Creates a search tool that sends its requests through `sender`.
    #[inline]
    pub fn new(sender: S) -> Self {
        Self {
            sender,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            parameter_schema: schema_for!(SearchParameters).to_value(),
        }
    }

    /// Replaces the API endpoint.
    #[inline]
    pub fn with_endpoint<E: Into<String>>(mut self, endpoint: E) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl<S: HttpSender + 'static> Tool for SearchTool<S> {
    type Input = SearchParameters;

    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo and return the matching pages"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: SearchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let query = input.query.trim().to_owned();
        let max_results = match input.max_results {
            Some(0) | None => DEFAULT_MAX_RESULTS,
            Some(n) => n,
        };
        let resp_fut = if query.is_empty() {
            Err(ToolError::invalid_input().with_reason("`query` is empty"))
        } else {
            let url = Url::parse_with_params(
                &self.endpoint,
                [
                    ("q", query.as_str()),
                    ("format", "json"),
                    ("no_html", "1"),
                ],
            );
            url.map(|url| self.sender.send(Request::new(Method::GET, url)))
                .map_err(|err| {
                    ToolError::execution_error().with_reason(err.to_string())
                })
        };

        async move {
            debug!("searching for `{query}`");
            let resp = resp_fut?.await.map_err(|err| {
                ToolError::execution_error().with_reason(err.to_string())
            })?;
            let status = resp.status();
            if !status.is_success() {
                let reason = format!("search failed with status {status}");
                return Err(ToolError::execution_error().with_reason(reason));
            }
            let body = resp.bytes().await.map_err(|err| {
                ToolError::execution_error().with_reason(err.to_string())
            })?;
            let answer: InstantAnswer =
                serde_json::from_slice(&body).map_err(|err| {
                    let reason = format!("malformed search response: {err}");
                    ToolError::execution_error().with_reason(reason)
                })?;

            let results = collect_results(answer, max_results);
            debug!("got {} search results", results.len());
            Ok(json!({ "results": results }).to_string())
        }
    }
}

fn collect_results(
    answer: InstantAnswer,
    max_results: usize,
) -> Vec<SearchResult> {
    let mut results = Vec::new();
    if !answer.abstract_url.is_empty() {
        results.push(SearchResult {
            title: answer.heading,
            link: answer.abstract_url,
            description: answer.abstract_text,
        });
    }

    let mut topics = answer.results;
    topics.extend(answer.related_topics);
    let mut stack: Vec<Topic> = topics.into_iter().rev().collect();
    while let Some(topic) = stack.pop() {
        if results.len() >= max_results {
            break;
        }
        if !topic.topics.is_empty() {
            stack.extend(topic.topics.into_iter().rev());
            continue;
        }
        if topic.first_url.is_empty() {
            continue;
        }
        // The title leads the text, separated by a dash.
        let title = match topic.text.split_once(" - ") {
            Some((title, _)) => title.to_owned(),
            None => topic.text.clone(),
        };
        results.push(SearchResult {
            title,
            link: topic.first_url,
            description: topic.text,
        });
    }
    results.truncate(max_results);
    results
}
