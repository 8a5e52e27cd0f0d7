//! 3D structure downloads against a local server standing in for PubChem.

use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpListener},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use opioid_db::{ReqError, pubchem::Client};

/// Serve one request with a canned response. The request head is sent back on the channel.
fn serve_once(response: &'static str) -> (SocketAddr, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut head = Vec::new();
        let mut buf = [0; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        let _ = tx.send(String::from_utf8_lossy(&head).into_owned());
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
    });

    (addr, rx)
}

fn client(addr: SocketAddr, timeout: Duration) -> Client {
    Client::new(timeout).with_pug_url(format!("http://{addr}"))
}

#[test]
fn returns_body_on_success() {
    let (addr, rx) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: chemical/x-mdl-sdfile\r\nContent-Length: 13\r\nConnection: close\r\n\r\n5288826\n$$$$\n",
    );
    let sdf = client(addr, Duration::from_secs(5))
        .fetch_3d_structure("5288826")
        .unwrap();
    assert_eq!(sdf, b"5288826\n$$$$\n");

    let head = rx.recv().unwrap();
    assert!(
        head.starts_with(
            "GET /compound/cid/5288826/record/SDF/?record_type=3d&response_type=save HTTP/1.1"
        ),
        "{head}"
    );
}

#[test]
fn not_found_is_none() {
    let (addr, _rx) =
        serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found");
    assert!(client(addr, Duration::from_secs(5)).fetch_3d_structure("0").is_none());

    let (addr, _rx) =
        serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found");
    let err = client(addr, Duration::from_secs(5)).load_sdf("0").unwrap_err();
    assert!(matches!(err, ReqError::Status(404)), "{err}");
}

#[test]
fn empty_body_is_an_error() {
    let (addr, _rx) = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
    let err = client(addr, Duration::from_secs(5)).load_sdf("3345").unwrap_err();
    assert!(matches!(err, ReqError::EmptyBody), "{err}");
}

#[test]
fn refused_connection_is_none() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    assert!(client(addr, Duration::from_secs(5)).fetch_3d_structure("4095").is_none());

    let err = client(addr, Duration::from_secs(5)).load_sdf("4095").unwrap_err();
    assert!(matches!(err, ReqError::Http(_)), "{err}");
}

#[test]
fn stalled_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let _conn = listener.accept();
        thread::sleep(Duration::from_secs(3));
    });

    let start = Instant::now();
    assert!(client(addr, Duration::from_secs(1)).fetch_3d_structure("3345").is_none());
    assert!(start.elapsed() < Duration::from_millis(2500), "{:?}", start.elapsed());
}
