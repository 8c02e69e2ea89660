use std::sync::Arc;

use axum::Router;
use http_body_util::BodyExt; // for .collect
use hyper::{header, Request, StatusCode};
use serde_json::{json, Value};
use tokio::time::{timeout, Duration};
use tower::ServiceExt; // for .oneshot

use perplexity_mcp::clients::perplexity::PerplexityRemote;
use perplexity_mcp::infra::config::ApiKey;
use perplexity_mcp::infra::http_app::build_app;
use perplexity_mcp::tools::query_perplexity::PerplexitySvc;

fn app_against(base: String) -> Router {
    let remote = PerplexityRemote::new(base, ApiKey::new("itest-key")).unwrap();
    build_app(PerplexitySvc::new(Arc::new(remote)))
}

fn post(body: Value, session_id: Option<&str>) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::ACCEPT, "application/json, text/event-stream")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(sid) = session_id {
        builder = builder.header("MCP-Session-Id", sid);
    }
    builder.body(axum::body::Body::from(body.to_string())).unwrap()
}

/// Pull the JSON-RPC response for `id` out of an SSE body.
async fn rpc_response(res: axum::response::Response, id: i64) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let s = String::from_utf8_lossy(&bytes);
    s.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter_map(|d| serde_json::from_str::<Value>(d).ok())
        .find(|v| v["id"] == id)
        .unwrap_or_else(|| panic!("no rpc response for id {id} in: {s}"))
}

async fn initialize(app: &Router) -> String {
    let init = json!({
        "jsonrpc":"2.0","id":1,"method":"initialize",
        "params":{ "protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"test","version":"0.1"} }
    });
    let init_res = app.clone().oneshot(post(init, None)).await.unwrap();
    assert!(init_res.status().is_success());
    let session_id = init_res
        .headers()
        .get("MCP-Session-Id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    let init_body = rpc_response(init_res, 1).await;
    assert_eq!(init_body["result"]["serverInfo"]["name"], "perplexity-server");

    let initialized = json!({"jsonrpc":"2.0","method":"notifications/initialized","params":{}});
    let res = app
        .clone()
        .oneshot(post(initialized, Some(&session_id)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    session_id
}

#[tokio::test]
async fn initialize_list_and_call_over_streamable_http() {
    let server = httpmock::MockServer::start();
    let m = server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/chat/completions")
            .header("authorization", "Bearer itest-key")
            .json_body(json!({
                "model": "sonar-reasoning",
                "messages": [
                    {"role": "system", "content": "Be precise and concise."},
                    {"role": "user", "content": "capital of France?"}
                ]
            }));
        then.status(200)
            .json_body(json!({"choices": [{"message": {"content": "Paris"}}]}));
    });

    let app = app_against(server.base_url());
    let session_id = initialize(&app).await;

    // tools/list
    let list = json!({"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}});
    let list_res = timeout(Duration::from_secs(20), app.clone().oneshot(post(list, Some(&session_id))))
        .await
        .unwrap()
        .unwrap();
    assert!(list_res.status().is_success());
    let v = rpc_response(list_res, 2).await;
    let tools = v["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "query_perplexity");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["prompt"]));

    // tools/call
    let call = json!({
        "jsonrpc":"2.0","id":3,"method":"tools/call",
        "params": {"name":"query_perplexity","arguments":{"prompt":"capital of France?"}}
    });
    let call_res = app.clone().oneshot(post(call, Some(&session_id))).await.unwrap();
    assert!(call_res.status().is_success());
    let v = rpc_response(call_res, 3).await;
    m.assert();
    assert_eq!(v["result"]["content"][0]["type"], "text");
    assert_eq!(v["result"]["content"][0]["text"], "Paris");
    assert_ne!(v["result"]["isError"], true);
}

#[tokio::test]
async fn protocol_and_tool_errors_stay_distinct() {
    let server = httpmock::MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::POST).path("/chat/completions");
        then.status(401).json_body(json!({"error": "bad key"}));
    });

    let app = app_against(server.base_url());
    let session_id = initialize(&app).await;

    let unknown = json!({
        "jsonrpc":"2.0","id":10,"method":"tools/call",
        "params": {"name":"nope","arguments":{"prompt":"x"}}
    });
    let res = app.clone().oneshot(post(unknown, Some(&session_id))).await.unwrap();
    let v = rpc_response(res, 10).await;
    assert_eq!(v["error"]["code"], -32601);
    assert!(v.get("result").is_none());

    let bad_args = json!({
        "jsonrpc":"2.0","id":11,"method":"tools/call",
        "params": {"name":"query_perplexity","arguments":{"prompt": 5}}
    });
    let res = app.clone().oneshot(post(bad_args, Some(&session_id))).await.unwrap();
    let v = rpc_response(res, 11).await;
    assert_eq!(v["error"]["code"], -32602);

    let remote_fail = json!({
        "jsonrpc":"2.0","id":12,"method":"tools/call",
        "params": {"name":"query_perplexity","arguments":{"prompt":"x"}}
    });
    let res = app.clone().oneshot(post(remote_fail, Some(&session_id))).await.unwrap();
    let v = rpc_response(res, 12).await;
    assert!(v.get("error").is_none());
    assert_eq!(v["result"]["isError"], true);
    let text = v["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("401"));
    assert!(text.contains(r#"{"error":"bad key"}"#));
}
