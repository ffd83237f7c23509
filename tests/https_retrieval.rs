use std::io::{Read, Seek, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use catalog_ingest::TransportError;
use catalog_ingest::location::{Credential, Location, Scheme};
use catalog_ingest::transport::{CancelFlag, HttpsRetriever, Retriever, TransportOptions};
use url::Url;

fn read_request_head(stream: &mut TcpStream) {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(0) | Err(_) => break,
            Ok(_) => head.push(byte[0]),
        }
    }
}

/// Accept one connection, read the request head, write `response` verbatim, then close.
fn serve_once(response: Vec<u8>, delay: Duration) -> (Url, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            read_request_head(&mut stream);
            thread::sleep(delay);
            let _ = stream.write_all(&response);
            let _ = stream.flush();
        }
    });
    (Url::parse(&format!("http://{addr}/exports/file.csv")).unwrap(), handle)
}

/// Accept one connection per response, in order, on the same port.
fn serve_each(responses: Vec<Vec<u8>>) -> (Url, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        for response in responses {
            if let Ok((mut stream, _)) = listener.accept() {
                read_request_head(&mut stream);
                let _ = stream.write_all(&response);
                let _ = stream.flush();
            }
        }
    });
    (Url::parse(&format!("http://{addr}/exports/file.csv")).unwrap(), handle)
}

fn ok_response(body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

fn quick_options() -> TransportOptions {
    TransportOptions {
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

#[test]
fn body_round_trips_byte_for_byte_from_offset_zero() {
    let body: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let (url, server) = serve_once(ok_response(&body), Duration::ZERO);

    let opts = TransportOptions {
        spool_threshold: 4096,
        ..quick_options()
    };
    let mut file = HttpsRetriever::new(opts).unwrap().retrieve_url(&url).unwrap();
    server.join().unwrap();

    assert_eq!(file.len(), body.len() as u64);
    assert!(file.is_spilled());
    assert_eq!(file.stream_position().unwrap(), 0);

    let mut out = Vec::new();
    file.read_to_end(&mut out).unwrap();
    assert_eq!(out, body);
}

#[test]
fn empty_body_is_an_empty_buffer_not_an_error() {
    let (url, server) = serve_once(ok_response(b""), Duration::ZERO);
    let file = HttpsRetriever::new(quick_options()).unwrap().retrieve_url(&url).unwrap();
    server.join().unwrap();
    assert!(file.is_empty());
}

#[test]
fn non_success_status_is_reported() {
    let response = b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found".to_vec();
    let (url, server) = serve_once(response, Duration::ZERO);

    let err = HttpsRetriever::new(quick_options()).unwrap().retrieve_url(&url).unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, TransportError::HttpStatus { status: 404, .. }), "got {err:?}");
}

#[test]
fn connection_closed_before_content_length_is_an_error() {
    let mut response =
        b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\nConnection: close\r\n\r\n".to_vec();
    response.extend_from_slice(&[b'x'; 1500]);
    let (url, server) = serve_once(response, Duration::ZERO);

    let result = HttpsRetriever::new(quick_options()).unwrap().retrieve_url(&url);
    server.join().unwrap();
    let err = result.unwrap_err();
    assert!(
        matches!(err, TransportError::Stream(_) | TransportError::Truncated { .. } | TransportError::Http(_)),
        "got {err:?}"
    );
}

#[test]
fn unterminated_chunked_body_is_an_error() {
    let response = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n5\r\nhello\r\n".to_vec();
    let (url, server) = serve_once(response, Duration::ZERO);

    let result = HttpsRetriever::new(quick_options()).unwrap().retrieve_url(&url);
    server.join().unwrap();
    assert!(result.is_err());
}

#[test]
fn connection_refused_is_an_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{addr}/file.csv")).unwrap();
    let err = HttpsRetriever::new(quick_options()).unwrap().retrieve_url(&url).unwrap_err();
    assert!(matches!(err, TransportError::Http(_)), "got {err:?}");
}

#[test]
fn unresponsive_server_times_out() {
    let (url, server) = serve_once(ok_response(b"late"), Duration::from_secs(2));
    let opts = TransportOptions {
        read_timeout: Duration::from_millis(300),
        ..quick_options()
    };

    let err = HttpsRetriever::new(opts).unwrap().retrieve_url(&url).unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, TransportError::Http(ref e) if e.is_timeout()), "got {err:?}");
}

#[test]
fn cancelled_transfer_returns_no_buffer() {
    let (url, server) = serve_once(ok_response(&[1u8; 2048]), Duration::ZERO);
    let cancel = CancelFlag::new();
    cancel.cancel();
    let opts = TransportOptions {
        cancel: Some(cancel),
        ..quick_options()
    };

    let err = HttpsRetriever::new(opts).unwrap().retrieve_url(&url).unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, TransportError::Cancelled { .. }), "got {err:?}");
}

#[test]
fn sftp_location_is_refused_by_the_https_retriever() {
    let loc = Location::resolve("sftp://h/x.csv", Some(Credential::new("u", "p"))).unwrap();
    let err = HttpsRetriever::new(quick_options()).unwrap().retrieve(&loc).unwrap_err();
    assert!(matches!(
        err,
        TransportError::SchemeMismatch {
            expected: Scheme::Https,
            found: Scheme::Sftp
        }
    ));
}

#[test]
fn same_scheme_redirect_is_followed() {
    let redirect = b"HTTP/1.1 302 Found\r\nLocation: /exports/moved.csv\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec();
    let (url, server) = serve_each(vec![redirect, ok_response(b"id,name\n")]);

    let mut file = HttpsRetriever::new(quick_options()).unwrap().retrieve_url(&url).unwrap();
    server.join().unwrap();

    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    assert_eq!(out, "id,name\n");
}
