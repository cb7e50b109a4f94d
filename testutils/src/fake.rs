use httpmock::prelude::*;
use httpmock::{
    Mock,
    Then,
    When,
};
use serde_json::{
    Value,
    json,
};

// A fake apiserver: register one handler per expected request, call build(), then point a
// kube::Client at it.  Requests that no handler matches get printed and answered with a 404 by
// httpmock, which is usually enough to see what went wrong.
pub struct MockServerBuilder {
    server: MockServer,
    handlers: Vec<Box<dyn Fn(When, Then)>>,
    mock_ids: Vec<usize>,
}

fn print_req(req: &HttpMockRequest) -> bool {
    // println, not tracing, so that it shows up under any crate's test harness
    println!("    Received: {} {}", req.method(), req.uri().path());
    true
}

impl MockServerBuilder {
    pub fn new() -> MockServerBuilder {
        MockServerBuilder {
            server: MockServer::start(),
            handlers: vec![],
            mock_ids: vec![],
        }
    }

    // Checks that every registered handler was hit exactly once
    pub fn assert(&self) {
        for id in &self.mock_ids {
            println!("checking assertions for mock {id}");
            Mock::new(*id, &self.server).assert()
        }
    }

    pub fn handle<F: Fn(When, Then) + 'static>(&mut self, f: F) -> &mut Self {
        self.handlers.push(Box::new(move |w, t| {
            let w = w.matches(print_req);
            f(w, t);
        }));
        self
    }

    // Answers every request to `path` with the given Status object
    pub fn handle_status(&mut self, path: String, status: Value) -> &mut Self {
        self.handle(move |when, then| {
            let code = status["code"].as_u64().unwrap_or(500) as u16;
            when.path(&path);
            then.status(code).json_body(status.clone());
        })
    }

    pub fn handle_not_found(&mut self, path: String) -> &mut Self {
        self.handle_status(path, status_not_found())
    }

    pub fn build(&mut self) {
        for f in self.handlers.iter() {
            self.mock_ids.push(self.server.mock(f).id);
        }

        // this goes last so that the real handlers get a chance to match first
        self.server.mock(|when, _| {
            when.matches(print_req);
        });
    }

    pub fn url(&self) -> http::Uri {
        http::Uri::try_from(self.server.url("/")).unwrap()
    }
}

impl Default for MockServerBuilder {
    fn default() -> Self {
        MockServerBuilder::new()
    }
}

pub fn make_fake_apiserver() -> (MockServerBuilder, kube::Client) {
    let builder = MockServerBuilder::new();
    let config = kube::Config::new(builder.url());
    let client = kube::Client::try_from(config).unwrap();
    (builder, client)
}

fn status(code: u16, status: &str, reason: &str, message: &str) -> Value {
    json!({
      "kind": "Status",
      "apiVersion": "v1",
      "metadata": {},
      "status": status,
      "reason": reason,
      "message": message,
      "code": code
    })
}

pub fn status_ok() -> Value {
    status(200, "Success", "", "")
}

pub fn status_not_found() -> Value {
    status(404, "Failure", "NotFound", "not found")
}

pub fn status_conflict() -> Value {
    status(409, "Failure", "AlreadyExists", "already exists")
}

pub fn status_invalid(message: &str) -> Value {
    status(422, "Failure", "Invalid", message)
}
