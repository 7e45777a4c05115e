// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use cinelist_app::{CatalogError, CatalogSource, DetailField, MovieId, TitleSummary};
use cinelist_client::Client;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Request, Response, Server};

fn mock_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());
    Ok((server, addr))
}

fn authorization_of(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv("Authorization"))
        .map(|header| header.value.as_str().to_owned())
}

fn json_response(status: u16, body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

#[test]
fn unreachable_service_is_a_transport_error() {
    let client = Client::new("http://127.0.0.1:1", "secret", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .list_titles()
        .expect_err("list should fail for unreachable endpoint");
    match error {
        CatalogError::Transport(message) => assert!(message.contains("127.0.0.1:1")),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn list_titles_sends_credential_and_keeps_server_order() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/movies/titles/");
        assert_eq!(authorization_of(&request).as_deref(), Some("Token abc123"));
        let body = r#"[{"id":3,"title":"Down"},{"id":"1","title":"Up"},{"id":2,"title":"Upstream"}]"#;
        request
            .respond(json_response(200, body))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "Token abc123", Duration::from_secs(1))?;
    let titles = client.list_titles()?;
    assert_eq!(
        titles,
        vec![
            TitleSummary::new(3, "Down"),
            TitleSummary::new(1, "Up"),
            TitleSummary::new(2, "Upstream"),
        ]
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn get_detail_sends_credential_and_decodes_optional_fields() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/movies/1");
        assert_eq!(authorization_of(&request).as_deref(), Some("Token abc123"));
        let body = r#"{"id":1,"title":"Up","director":null,"year":2009,"stars":["Ed Asner"]}"#;
        request
            .respond(json_response(200, body))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "Token abc123", Duration::from_secs(1))?;
    let detail = client.get_detail(&MovieId::from(1))?;
    assert_eq!(detail.title, "Up");
    assert_eq!(
        detail.display_value(DetailField::Director),
        "No found director"
    );
    assert_eq!(detail.display_value(DetailField::Year), "2009");
    assert_eq!(detail.display_value(DetailField::Stars), "Ed Asner");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn missing_detail_maps_to_not_found() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/movies/77");
        request
            .respond(json_response(404, r#"{"error":"no such movie"}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "secret", Duration::from_secs(1))?;
    let error = client
        .get_detail(&MovieId::from(77))
        .expect_err("404 should fail");
    assert_eq!(error, CatalogError::NotFound(MovieId::from(77)));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn server_errors_map_to_transport_errors() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(401, r#"{"message":"invalid credential"}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "wrong", Duration::from_secs(1))?;
    let error = client.list_titles().expect_err("401 should fail");
    assert_eq!(
        error,
        CatalogError::Transport("server error (401): invalid credential".to_owned())
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn detail_server_error_is_a_transport_error_not_missing() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/movies/5");
        request
            .respond(json_response(500, r#"{"detail":"database unavailable"}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "secret", Duration::from_secs(1))?;
    let error = client
        .get_detail(&MovieId::from(5))
        .expect_err("500 should fail");
    assert_eq!(
        error,
        CatalogError::Transport("server error (500): database unavailable".to_owned())
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn malformed_body_is_a_decode_error() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(200, r#"{"titles":"not an array"}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, "secret", Duration::from_secs(1))?;
    let error = client.list_titles().expect_err("object body should fail");
    assert!(matches!(error, CatalogError::Decode(_)), "got {error:?}");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn base_path_prefix_is_kept_for_both_endpoints() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let first = server.recv().expect("request expected");
        assert_eq!(first.url(), "/api/movies/titles/");
        first
            .respond(json_response(200, r#"[{"id":5,"title":"Heat"}]"#))
            .expect("response should succeed");

        let second = server.recv().expect("request expected");
        assert_eq!(second.url(), "/api/movies/5");
        second
            .respond(json_response(200, r#"{"id":5,"title":"Heat"}"#))
            .expect("response should succeed");
    });

    let client = Client::new(&format!("{addr}/api/"), "secret", Duration::from_secs(1))?;
    let titles = client.list_titles()?;
    let detail = client.get_detail(&titles[0].id)?;
    assert_eq!(detail.id, MovieId::from(5));

    handle.join().expect("server thread should join");
    Ok(())
}
