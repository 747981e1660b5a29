use crate::error::{Error, Result};
use crate::executor::{Executor, QueryResult};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct Request {
    pub route: String,
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(err: &Error) -> Self {
        Self {
            status: err.status(),
            body: json!({ "error": err.to_string() }),
        }
    }
}

fn text_body<'a>(route: &str, body: &'a Value) -> Result<&'a str> {
    body.as_str()
        .ok_or_else(|| Error::InvalidRequest(format!("{route} expects a plain text body")))
}

fn route(exec: &Executor, request: &Request) -> Result<Value> {
    let body = &request.body;
    match request.route.as_str() {
        "/data/createtable" => exec.create_table(text_body(&request.route, body)?),
        "/data/insertrow" => exec.insert_row(body),
        "/data/deleterow" => exec.delete_row(text_body(&request.route, body)?),
        "/data/fetchtable" => exec.fetch_table(text_body(&request.route, body)?),
        "/data/showtables" => Ok(exec.show_tables()),
        "/server/execute" => {
            let line = body.get("line").and_then(Value::as_str).ok_or_else(|| {
                Error::InvalidRequest("Missing or invalid 'line' field".into())
            })?;
            Ok(match exec.run(line)? {
                QueryResult::Text(text) => Value::String(text),
                QueryResult::Json(value) => value,
            })
        }
        other => Err(Error::InvalidRequest(format!("Unknown route: {other}"))),
    }
}

pub fn handle(exec: &Executor, request: &Request) -> Response {
    match route(exec, request) {
        Ok(body) => Response::ok(body),
        Err(err) => {
            warn!(route = %request.route, error = %err, "request rejected");
            Response::error(&err)
        }
    }
}

/// Decodes and answers one request line.
pub fn handle_line(exec: &Executor, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(exec, &request),
        Err(e) => Response::error(&Error::InvalidRequest(format!("Malformed request: {e}"))),
    }
}
