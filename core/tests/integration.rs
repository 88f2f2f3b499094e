//! End-to-end execution against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then runs requests through an
//! `InterceptingExecutor` over a real `UreqTransport`. The server's journal
//! shows which requests actually reached the network, so interception can
//! be checked from the outside.

use std::io::{BufRead, BufReader, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hookshot_core::{
    Config, Context, DirectExecutor, Error, Executor, Expectation, HttpMethod, HttpRequest, HttpResponse,
    InterceptingExecutor, Matcher, Request, RequestState, ReturnCode, UreqTransport,
};
use mock_server::{app_with_journal, Journal, RecordedRequest};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Start the mock server on a random port and return its address and
/// journal.
fn start_server() -> (SocketAddr, Journal) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let journal = Journal::default();
    let server_journal = journal.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, app_with_journal(server_journal)).await
        })
        .unwrap();
    });

    (addr, journal)
}

/// Answer exactly one connection with `head` followed by `body`, written
/// verbatim, then close the socket.
fn serve_raw_once(head: &'static str, body: &'static [u8]) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
            line.clear();
        }
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(body).unwrap();
        stream.flush().unwrap();
    });
    addr
}

fn recorded(journal: &Journal) -> Vec<RecordedRequest> {
    journal.blocking_read().clone()
}

fn executor() -> InterceptingExecutor<DirectExecutor<UreqTransport>> {
    InterceptingExecutor::new(DirectExecutor::new(UreqTransport::new()))
}

type Log = Arc<Mutex<Vec<String>>>;

fn record(log: &Log, tag: &'static str) -> impl Fn(Option<&HttpResponse>) -> anyhow::Result<()> {
    let log = Arc::clone(log);
    move |response| {
        let status = response.map_or(0, |r| r.status);
        log.lock().unwrap().push(format!("{tag}:{status}"));
        Ok(())
    }
}

#[test]
fn real_success_runs_process_then_request_callbacks() {
    init_logging();
    let (addr, journal) = start_server();
    let log = Log::default();

    let mut ctx = Context::default();
    ctx.callbacks_mut().on_complete(record(&log, "A"));

    let mut request = Request::new(HttpRequest::get(format!("http://{addr}/status/200")));
    request.on_complete(record(&log, "B")).on_success(record(&log, "C"));

    let response = executor().execute(&ctx, &mut request).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"status":200}"#);
    assert_eq!(response.header("content-type"), Some("application/json"));

    assert_eq!(*log.lock().unwrap(), vec!["A:200", "B:200", "C:200"]);
    assert_eq!(request.state(), RequestState::Delegated);
    assert_eq!(recorded(&journal).len(), 1);
}

#[test]
fn real_error_status_runs_failure_callbacks() {
    init_logging();
    let (addr, _journal) = start_server();
    let log = Log::default();
    let ctx = Context::default();

    let mut request = Request::new(HttpRequest::new(HttpMethod::Delete, format!("http://{addr}/status/404")));
    request.on_success(record(&log, "success")).on_failure(record(&log, "failure"));

    executor().execute(&ctx, &mut request).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["failure:404"]);
}

#[test]
fn stubbed_failure_never_reaches_the_server() {
    init_logging();
    let (addr, journal) = start_server();
    let log = Log::default();
    let url = format!("http://{addr}/status/200");

    let mut ctx = Context::default();
    ctx.stub(Expectation::new(Matcher::url(url.clone()), HttpResponse::new(500, "stubbed")));

    let mut request = Request::new(HttpRequest::get(url));
    request.on_failure(record(&log, "failure"));

    let response = executor().execute(&ctx, &mut request).unwrap();
    assert_eq!(response.body, "stubbed");
    assert_eq!(*log.lock().unwrap(), vec!["failure:500"]);
    assert_eq!(request.state(), RequestState::Intercepted);
    assert!(recorded(&journal).is_empty());
}

#[test]
fn stubbed_and_real_success_look_the_same_to_callbacks() {
    init_logging();
    let (addr, journal) = start_server();
    let real_url = format!("http://{addr}/status/200");
    let stubbed_url = format!("http://{addr}/status/299");

    let mut ctx = Context::default();
    ctx.stub(Expectation::new(
        Matcher::url(stubbed_url.clone()),
        HttpResponse::new(200, r#"{"status":200}"#),
    ));

    let run = |url: String| {
        let log = Log::default();
        let mut request = Request::new(HttpRequest::get(url));
        request
            .on_complete(record(&log, "complete"))
            .on_success(record(&log, "success"))
            .on_failure(record(&log, "failure"));
        let body = executor().execute(&ctx, &mut request).unwrap().body.clone();
        let log = log.lock().unwrap().clone();
        (log, body)
    };

    assert_eq!(run(stubbed_url), run(real_url));
    assert_eq!(recorded(&journal).len(), 1);
}

#[test]
fn request_headers_and_body_reach_the_server() {
    init_logging();
    let (addr, journal) = start_server();
    let ctx = Context::default();

    let options = HttpRequest::post(format!("http://{addr}/echo"), "payload").with_header("x-trace", "abc");
    let mut request = Request::new(options);
    let response = executor().execute(&ctx, &mut request).unwrap();

    let echoed: RecordedRequest = serde_json::from_str(&response.body).unwrap();
    assert_eq!(echoed.method, "POST");
    assert_eq!(echoed.body, "payload");
    assert!(echoed.headers.contains(&("x-trace".to_string(), "abc".to_string())));
    assert_eq!(recorded(&journal).len(), 1);
}

#[test]
fn connection_refused_becomes_a_failed_response() {
    init_logging();
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let log = Log::default();
    let ctx = Context::default();

    let mut request = Request::new(HttpRequest::get(format!("http://{addr}/status/200")));
    request.on_complete(record(&log, "complete")).on_failure(record(&log, "failure"));

    let response = executor().execute(&ctx, &mut request).unwrap();
    assert_eq!(response.status, 0);
    assert_ne!(response.return_code, ReturnCode::Ok);
    assert_eq!(*log.lock().unwrap(), vec!["complete:0", "failure:0"]);
}

#[test]
fn blocked_connection_fails_for_unstubbed_requests() {
    init_logging();
    let (addr, journal) = start_server();
    let ctx = Context::new(Config::blocking());

    let mut request = Request::new(HttpRequest::get(format!("http://{addr}/status/200")));
    let err = executor().execute(&ctx, &mut request).unwrap_err();

    assert!(matches!(err, Error::BlockedConnection { method: HttpMethod::Get, .. }));
    assert!(recorded(&journal).is_empty());
}

#[test]
fn non_utf8_body_keeps_the_real_status() {
    init_logging();
    let addr = serve_raw_once(
        "HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\n",
        &[0xff, 0xfe, 0x00, 0x80],
    );
    let log = Log::default();
    let ctx = Context::default();

    let mut request = Request::new(HttpRequest::get(format!("http://{addr}/binary")));
    request.on_success(record(&log, "success")).on_failure(record(&log, "failure"));

    let response = DirectExecutor::new(UreqTransport::new()).execute(&ctx, &mut request).unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.return_code, ReturnCode::Ok);
    assert_eq!(response.body, String::from_utf8_lossy(&[0xff, 0xfe, 0x00, 0x80]));
    assert!(response.is_success());
    assert_eq!(*log.lock().unwrap(), vec!["success:200"]);
}

#[test]
fn truncated_body_keeps_status_and_reports_the_read_error() {
    init_logging();
    let addr = serve_raw_once(
        "HTTP/1.1 200 OK\r\nContent-Length: 64\r\nConnection: close\r\n\r\n",
        b"short",
    );
    let log = Log::default();
    let ctx = Context::default();

    let mut request = Request::new(HttpRequest::get(format!("http://{addr}/truncated")));
    request.on_success(record(&log, "success")).on_failure(record(&log, "failure"));

    let response = DirectExecutor::new(UreqTransport::new()).execute(&ctx, &mut request).unwrap();
    assert_eq!(response.status, 200);
    assert_ne!(response.return_code, ReturnCode::Ok);
    assert!(!response.is_success());
    assert_eq!(*log.lock().unwrap(), vec!["failure:200"]);
}
