//! Declared test doubles and the store they are looked up in.
//!
//! An [`Expectation`] pairs a [`Matcher`] with a [`Responder`]. The store
//! tries expectations in registration order and the first match answers the
//! request; nothing is removed on a match.
//!
//! ```
//! use hookshot_core::{Expectation, ExpectationStore, HttpRequest, HttpResponse, Matcher};
//!
//! let mut store = ExpectationStore::new();
//! store.register(Expectation::new(
//!     Matcher::url("http://x"),
//!     HttpResponse::new(500, "down"),
//! ));
//!
//! assert!(store.find_by(&HttpRequest::get("http://x")).is_some());
//! assert!(store.find_by(&HttpRequest::get("http://y")).is_none());
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use regex::Regex;

use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

type Predicate = Box<dyn Fn(&HttpRequest) -> bool + Send + Sync>;
type Generator = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

/// How a matcher compares the request URL.
#[derive(Debug, Clone, Default)]
pub enum UrlPattern {
    #[default]
    Any,
    Exact(String),
    Regex(Regex),
}

impl UrlPattern {
    fn matches(&self, url: &str) -> bool {
        match self {
            UrlPattern::Any => true,
            UrlPattern::Exact(expected) => expected == url,
            UrlPattern::Regex(pattern) => pattern.is_match(url),
        }
    }
}

/// Predicate over a request's observable properties. Every criterion that
/// is set must hold.
#[derive(Default)]
pub struct Matcher {
    url: UrlPattern,
    method: Option<HttpMethod>,
    headers: Vec<(String, String)>,
    body: Option<String>,
    predicate: Option<Predicate>,
}

impl Matcher {
    /// Matches every request.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: UrlPattern::Exact(url.into()),
            ..Self::default()
        }
    }

    pub fn url_regex(pattern: &str) -> Result<Self, Error> {
        Ok(Self {
            url: UrlPattern::Regex(Regex::new(pattern)?),
            ..Self::default()
        })
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Require a header; the name is compared case-insensitively, the value
    /// exactly.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&HttpRequest) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn matches(&self, request: &HttpRequest) -> bool {
        self.url.matches(&request.url)
            && self.method.map_or(true, |method| method == request.method)
            && self
                .headers
                .iter()
                .all(|(name, value)| request.header(name) == Some(value.as_str()))
            && self
                .body
                .as_deref()
                .map_or(true, |body| request.body.as_deref() == Some(body))
            && self.predicate.as_ref().map_or(true, |predicate| predicate(request))
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// What an expectation answers with.
pub enum Responder {
    /// Canned responses in order; the last one repeats once exhausted.
    Sequence(Vec<HttpResponse>),
    /// Build the response from the request.
    Generator(Generator),
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Responder::Sequence(responses) => f.debug_tuple("Sequence").field(responses).finish(),
            Responder::Generator(_) => f.write_str("Generator"),
        }
    }
}

/// A matcher plus the response to fabricate when it matches.
#[derive(Debug)]
pub struct Expectation {
    matcher: Matcher,
    responder: Responder,
    matched: AtomicUsize,
}

impl Expectation {
    pub fn new(matcher: Matcher, response: HttpResponse) -> Self {
        Self::with_responder(matcher, Responder::Sequence(vec![response]))
    }

    /// Answer with each response in turn, then keep repeating the last.
    /// An empty list answers with a default (status 0, failed) response.
    pub fn sequence(matcher: Matcher, responses: Vec<HttpResponse>) -> Self {
        Self::with_responder(matcher, Responder::Sequence(responses))
    }

    pub fn generated<F>(matcher: Matcher, generator: F) -> Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        Self::with_responder(matcher, Responder::Generator(Box::new(generator)))
    }

    pub fn with_responder(matcher: Matcher, responder: Responder) -> Self {
        Self {
            matcher,
            responder,
            matched: AtomicUsize::new(0),
        }
    }

    /// Queue another canned response after the existing ones. Has no effect
    /// on a generator.
    pub fn and_then(mut self, response: HttpResponse) -> Self {
        if let Responder::Sequence(responses) = &mut self.responder {
            responses.push(response);
        }
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn matches(&self, request: &HttpRequest) -> bool {
        self.matcher.matches(request)
    }

    /// How many executions this expectation has answered.
    pub fn times_matched(&self) -> usize {
        self.matched.load(Ordering::SeqCst)
    }

    /// Produce the response for one execution of `request`.
    pub fn respond(&self, request: &HttpRequest) -> HttpResponse {
        let index = self.matched.fetch_add(1, Ordering::SeqCst);
        match &self.responder {
            Responder::Sequence(responses) => responses
                .get(index)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_default(),
            Responder::Generator(generate) => generate(request),
        }
    }
}

/// Registered expectations, tried first-registered-first.
#[derive(Debug, Default)]
pub struct ExpectationStore {
    expectations: Vec<Expectation>,
}

impl ExpectationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, expectation: Expectation) -> &Expectation {
        let index = self.expectations.len();
        self.expectations.push(expectation);
        &self.expectations[index]
    }

    pub fn find_by(&self, request: &HttpRequest) -> Option<&Expectation> {
        self.expectations.iter().find(|expectation| expectation.matches(request))
    }

    pub fn clear(&mut self) {
        self.expectations.clear();
    }

    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expectation> {
        self.expectations.iter()
    }
}
