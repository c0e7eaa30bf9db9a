//! Shared fixtures: a stub serving endpoint and multipart body builders

#![allow(dead_code)]

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::time::Duration;

pub const INVOCATIONS: &str = "/serving-endpoints/predict/invocations";
pub const TOKEN: &str = "test-token";
pub const BOUNDARY: &str = "relay-test-boundary";

/// A stub serving endpoint listening on an ephemeral local port
pub struct Upstream {
    pub url: String,
    handle: ServerHandle,
}

impl Upstream {
    /// Serve `handler` on the invocations path
    pub fn spawn<F>(configure: F) -> Upstream
    where
        F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
    {
        let server = HttpServer::new(move || App::new().configure(configure.clone()))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Upstream {
            url: format!("http://{addr}{INVOCATIONS}"),
            handle,
        }
    }

    pub fn predictions() -> Upstream {
        Upstream::spawn(|cfg| {
            cfg.route(
                INVOCATIONS,
                web::post().to(|| async { HttpResponse::Ok().json(json!({ "predictions": [1] })) }),
            );
        })
    }

    pub fn busy() -> Upstream {
        Upstream::spawn(|cfg| {
            cfg.route(
                INVOCATIONS,
                web::post().to(|| async { HttpResponse::ServiceUnavailable().body("server busy") }),
            );
        })
    }

    pub fn not_json() -> Upstream {
        Upstream::spawn(|cfg| {
            cfg.route(
                INVOCATIONS,
                web::post().to(|| async { HttpResponse::Ok().body("<html>oops</html>") }),
            );
        })
    }

    pub fn slow(delay: Duration) -> Upstream {
        Upstream::spawn(move |cfg| {
            cfg.route(
                INVOCATIONS,
                web::post().to(move || async move {
                    tokio::time::sleep(delay).await;
                    HttpResponse::Ok().json(json!({ "predictions": [] }))
                }),
            );
        })
    }

    /// Answers with the headers and JSON body it received
    pub fn echo() -> Upstream {
        Upstream::spawn(|cfg| {
            cfg.route(INVOCATIONS, web::post().to(echo));
        })
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn echo(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    HttpResponse::Ok().json(json!({
        "authorization": header("authorization"),
        "content_type": header("content-type"),
        "body": body.into_inner(),
    }))
}

/// An address nothing is listening on
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{INVOCATIONS}")
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .unwrap();
    buf
}

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub fn multipart(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                filename,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
