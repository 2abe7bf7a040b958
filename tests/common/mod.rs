// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const MAX_HEAD: usize = 64 * 1024;

pub type BodyMutation = Arc<dyn Fn(Vec<u8>) -> Vec<u8> + Send + Sync>;

/// Minimal forward proxy for tests. It fetches the absolute-form target with
/// its own client and re-emits the response with a fixed Content-Length,
/// passing the body through `mutate` first.
pub struct TestProxy {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl TestProxy {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn spawn_transparent_proxy() -> TestProxy {
    spawn_proxy(Arc::new(|body| body)).await
}

pub async fn spawn_flipping_proxy(offset: usize) -> TestProxy {
    spawn_proxy(Arc::new(move |mut body: Vec<u8>| {
        if let Some(byte) = body.get_mut(offset) {
            *byte ^= 0x01;
        }
        body
    }))
    .await
}

pub async fn spawn_truncating_proxy(cut: usize) -> TestProxy {
    spawn_proxy(Arc::new(move |mut body: Vec<u8>| {
        let keep = body.len().saturating_sub(cut);
        body.truncate(keep);
        body
    }))
    .await
}

pub async fn spawn_proxy(mutate: BodyMutation) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let client = reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let counter = Arc::clone(&requests);
    let task = tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let client = client.clone();
            let mutate = Arc::clone(&mutate);
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = handle(socket, client, mutate).await;
            });
        }
    });

    TestProxy {
        addr,
        requests,
        task,
    }
}

async fn handle(
    mut socket: TcpStream,
    client: reqwest::Client,
    mutate: BodyMutation,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        if buf.len() > MAX_HEAD {
            return Ok(());
        }
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("GET").to_string();
    let target = parts.next().unwrap_or("/").to_string();

    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = buf[head_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap_or(reqwest::Method::GET);
    let upstream = match client.request(method, &target).body(body).send().await {
        Ok(upstream) => upstream,
        Err(_) => {
            socket
                .write_all(b"HTTP/1.1 502 Bad Gateway\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await?;
            return socket.shutdown().await;
        }
    };

    let status = upstream.status();
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    for (name, value) in upstream.headers() {
        let skip = [
            "content-length",
            "transfer-encoding",
            "connection",
            "keep-alive",
        ];
        if skip.contains(&name.as_str()) {
            continue;
        }
        head.push_str(&format!(
            "{}: {}\r\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        ));
    }

    let payload = upstream.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
    let payload = mutate(payload);
    head.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        payload.len()
    ));

    socket.write_all(head.as_bytes()).await?;
    socket.write_all(&payload).await?;
    socket.shutdown().await
}

/// Port that was free a moment ago.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Address on which nothing is listening.
pub fn dead_address() -> String {
    format!("127.0.0.1:{}", free_port())
}

pub fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub fn sample_document(len: usize) -> Vec<u8> {
    let line = b"<p>proxy transparency check</p>\n";
    line.iter().copied().cycle().take(len).collect()
}

pub fn port_is_free(port: u16) -> bool {
    std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
}
