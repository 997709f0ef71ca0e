//! Mock generation backend shared by the integration tests

#![allow(dead_code)]

use base64::Engine as _;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Method, Response, Server};

/// A PNG carrying the signature but no decodable image data
pub const CORRUPT_PNG: &[u8] = b"\x89PNG\r\n\x1a\ngarbage-not-a-png";

/// A small, fully valid PNG
pub fn png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// [`png`] as a base64 `data:` URL
pub fn png_data_url() -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png())
    )
}

pub struct MockBackend {
    pub base_url: String,
    /// Raw request bodies received on `/generate-qr/`, in order
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn generate_calls(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }
}

fn json(body: &str) -> Response<Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_header("Content-Type: application/json".parse::<Header>().unwrap())
}

/// Start a backend on an ephemeral port.
///
/// Replies by submitted URL:
/// - `https://ok.example` -> image at `/qr/ok.png`
/// - `https://exists.example` -> same image plus a message
/// - `https://broken.example` -> image at `/qr/broken.png`, which 404s
/// - `https://html.example` -> image at `/qr/page.png`, which serves HTML
/// - `https://corrupt.example` -> image at `/qr/corrupt.png`, a PNG header
///   followed by garbage
/// - `https://inline.example` -> base64 `data:` image
/// - `https://garbled.example` -> 200 with a non-JSON body
/// - `https://down.example` -> 500
/// - anything else -> 400
pub fn start_backend() -> MockBackend {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", server.server_addr());
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let recorded = bodies.clone();

    std::thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let path = request.url().to_string();
            let method = request.method().clone();
            let response = match (method, path.as_str()) {
                (Method::Post, "/generate-qr/") => {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    recorded.lock().unwrap().push(body.clone());

                    let url = serde_json::from_str::<serde_json::Value>(&body)
                        .ok()
                        .and_then(|v| v.get("url").and_then(|u| u.as_str()).map(str::to_string))
                        .unwrap_or_default();

                    match url.as_str() {
                        "https://ok.example" => json(r#"{"qr_code_url":"/qr/ok.png"}"#),
                        "https://exists.example" => json(
                            r#"{"qr_code_url":"/qr/ok.png","message":"QR code already exists"}"#,
                        ),
                        "https://broken.example" => json(r#"{"qr_code_url":"/qr/broken.png"}"#),
                        "https://html.example" => json(r#"{"qr_code_url":"/qr/page.png"}"#),
                        "https://corrupt.example" => {
                            json(r#"{"qr_code_url":"/qr/corrupt.png"}"#)
                        }
                        "https://inline.example" => json(
                            &serde_json::json!({ "qr_code_url": png_data_url() }).to_string(),
                        ),
                        "https://garbled.example" => json("not json at all"),
                        "https://down.example" => {
                            json(r#"{"detail":"Internal Server Error"}"#).with_status_code(500)
                        }
                        _ => json(r#"{"detail":"Invalid URL"}"#).with_status_code(400),
                    }
                }
                (Method::Get, "/qr/ok.png") => Response::from_data(png())
                    .with_header("Content-Type: image/png".parse::<Header>().unwrap()),
                (Method::Get, "/qr/corrupt.png") => Response::from_data(CORRUPT_PNG.to_vec())
                    .with_header("Content-Type: image/png".parse::<Header>().unwrap()),
                (Method::Get, "/qr/page.png") => Response::from_string("<html>oops</html>")
                    .with_header("Content-Type: text/html".parse::<Header>().unwrap()),
                _ => Response::from_string("Not Found").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    MockBackend { base_url, bodies }
}

/// A base URL nothing listens on
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
