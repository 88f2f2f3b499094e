//! Expectations declared as JSON.
//!
//! ```json
//! {
//!   "stubs": [
//!     {
//!       "url": "http://api.local/users",
//!       "method": "GET",
//!       "responses": [{ "status": 200, "body": "[]" }]
//!     }
//!   ]
//! }
//! ```
//!
//! `url` and `url_regex` are mutually exclusive; with neither the stub
//! matches any URL. `headers` and `body` narrow the match further.
//! `responses` are served in order, the last one repeating.

use serde::Deserialize;

use crate::error::Error;
use crate::expectation::{Expectation, ExpectationStore, Matcher};
use crate::http::{HttpMethod, HttpResponse};

#[derive(Debug, Deserialize)]
struct FixtureFile {
    stubs: Vec<StubFixture>,
}

#[derive(Debug, Deserialize)]
struct StubFixture {
    url: Option<String>,
    url_regex: Option<String>,
    method: Option<HttpMethod>,
    #[serde(default)]
    headers: Vec<(String, String)>,
    body: Option<String>,
    responses: Vec<HttpResponse>,
}

impl StubFixture {
    fn into_expectation(self, index: usize) -> Result<Expectation, Error> {
        let mut matcher = match (self.url, self.url_regex) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidFixture(format!(
                    "stub #{index}: `url` and `url_regex` are mutually exclusive"
                )))
            }
            (Some(url), None) => Matcher::url(url),
            (None, Some(pattern)) => Matcher::url_regex(&pattern)?,
            (None, None) => Matcher::any(),
        };
        if let Some(method) = self.method {
            matcher = matcher.method(method);
        }
        for (name, value) in self.headers {
            matcher = matcher.header(name, value);
        }
        if let Some(body) = self.body {
            matcher = matcher.body(body);
        }

        if self.responses.is_empty() {
            return Err(Error::InvalidFixture(format!("stub #{index}: `responses` is empty")));
        }
        Ok(Expectation::sequence(matcher, self.responses))
    }
}

/// Parse `json` and append its stubs to `store` in document order. Nothing
/// is registered unless the whole document is valid.
pub fn load(store: &mut ExpectationStore, json: &str) -> Result<usize, Error> {
    let file: FixtureFile = serde_json::from_str(json)?;
    let expectations = file
        .stubs
        .into_iter()
        .enumerate()
        .map(|(index, stub)| stub.into_expectation(index))
        .collect::<Result<Vec<_>, _>>()?;

    let count = expectations.len();
    for expectation in expectations {
        store.register(expectation);
    }
    Ok(count)
}
