use assert_cmd::Command;
use predicates::prelude::*;
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

const MAX_WAIT: Duration = Duration::from_secs(3);

fn try_bind_localhost(context: &str) -> Option<TcpListener> {
    match TcpListener::bind("127.0.0.1:0") {
        Ok(listener) => Some(listener),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            eprintln!("skipping {context}: cannot bind localhost in this environment: {err}");
            None
        },
        Err(err) => panic!("bind {context}: {err}"),
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let _ = stream.set_read_timeout(Some(MAX_WAIT));
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    let start = Instant::now();
    while start.elapsed() < MAX_WAIT {
        match stream.read(&mut tmp) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&tmp[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            },
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serves `routes` by request path until the test process exits. Unknown paths get a 404.
fn serve(listener: TcpListener, routes: HashMap<String, (&'static str, String)>) {
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else {
                continue;
            };
            let request = read_request(&mut stream);
            let path = request.split_whitespace().nth(1).unwrap_or("/").to_owned();
            let reply = match routes.get(&path) {
                Some((content_type, body)) => response("200 OK", content_type, body),
                None => response("404 Not Found", "text/plain", "not found"),
            };
            let _ = stream.write_all(reply.as_bytes());
            let _ = stream.flush();
        }
    });
}

fn response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Starts a site with one block, one stylesheet and one script. Returns its base URL.
fn start_site(context: &str, with_config: bool) -> Option<String> {
    let listener = try_bind_localhost(context)?;
    let base = format!("http://{}", listener.local_addr().ok()?);

    let config = serde_json::json!({
        "cdn": base,
        "styles": ["/css/site.css"],
        "layout": ["header"],
        "blocks": { "header": "/blocks/header.html" },
        "scripts": ["/js/app.js"]
    });
    let mut routes = HashMap::new();
    if with_config {
        routes.insert("/config.json".to_owned(), ("application/json", config.to_string()));
    }
    routes.insert("/css/site.css".to_owned(), ("text/css", "body{margin:0}".to_owned()));
    routes.insert("/js/app.js".to_owned(), ("text/javascript", "void 0;".to_owned()));
    routes.insert(
        "/blocks/header.html".to_owned(),
        ("text/html", r#"<header><a href="/pricing">Pricing</a></header>"#.to_owned()),
    );

    serve(listener, routes);
    Some(base)
}

fn stager(base: &str) -> Command {
    let mut cmd = Command::cargo_bin("stager").expect("stager binary is built");
    cmd.arg("--url")
        .arg(format!("{base}/config.json"))
        .arg("--quiet")
        .env("STAGER__TIMING__SETTLE_DELAY_MS", "0")
        .env("STAGER__TIMING__REVEAL_DELAY_MS", "0")
        .env("STAGER__TIMING__REMOVAL_DELAY_MS", "0")
        .env("STAGER__FETCH__BACKOFF_STEP_MS", "10")
        .timeout(Duration::from_secs(30));
    cmd
}

#[test]
fn help_lists_options() {
    let mut cmd = Command::cargo_bin("stager").expect("stager binary is built");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--reloads"))
        .stdout(predicate::str::contains("--dump"));
}

#[test]
fn loads_site_and_dumps_surface() -> Result<(), Box<dyn std::error::Error>> {
    let Some(base) = start_site("dump", true) else {
        return Ok(());
    };
    let dir = tempfile::tempdir()?;

    stager(&base)
        .arg("--dump")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Ready in"))
        .stdout(predicate::str::contains("1/1 blocks, 1 scripts (0 failed)"));

    let page = std::fs::read_to_string(dir.path().join("index.html"))?;
    assert!(page.contains(r#"<a href="/gotosite.html">Pricing</a>"#), "{page}");
    assert!(page.contains(&format!(r#"<script src="{base}/js/app.js"></script>"#)), "{page}");
    assert!(!page.contains("siteLoader"), "loader is removed once ready: {page}");

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json"))?)?;
    assert_eq!(report["terminal"]["state"], "ready");
    assert_eq!(report["loaded_blocks"], 1);
    assert!(dir.path().join("surface.json").exists());
    Ok(())
}

#[test]
fn report_flag_prints_json() -> Result<(), Box<dyn std::error::Error>> {
    let Some(base) = start_site("report", true) else {
        return Ok(());
    };

    let output = stager(&base).arg("--report").output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["run"], 1);
    assert_eq!(report["percent"], 100);
    assert_eq!(report["transitions"].as_array().map(Vec::len), Some(7));
    Ok(())
}

#[test]
fn unreachable_config_exits_with_failure() {
    let Some(base) = start_site("failure", false) else {
        return;
    };

    stager(&base)
        .env("STAGER__FETCH__MAX_ATTEMPTS", "1")
        .args(["--reloads", "1"])
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("Failed after 2 run(s): HTTP 404"));
}

#[test]
fn invalid_settings_are_rejected() {
    let mut cmd = Command::cargo_bin("stager").expect("stager binary is built");
    cmd.env("STAGER__FETCH__MAX_ATTEMPTS", "0")
        .arg("--quiet")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_attempts"));
}
