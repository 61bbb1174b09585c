//! 测试用的单次应答 HTTP 服务：接受一个连接，记录请求，返回预设响应。

use image::RgbaImage;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use crate::codec;

pub(crate) struct FakeResponse {
    status: u16,
    body: String,
}

impl FakeResponse {
    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub(crate) fn json(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn image(image: &RgbaImage) -> Self {
        let data = codec::encode_png_base64(image).expect("encode fake result failed");
        Self::json(&format!(
            r#"{{"candidates":[{{"content":{{"parts":[{{"text":"done"}},{{"inlineData":{{"mimeType":"image/png","data":"{}"}}}}]}}}}]}}"#,
            data
        ))
    }
}

pub(crate) struct CapturedRequest {
    head: String,
    body: Vec<u8>,
}

impl CapturedRequest {
    /// 大小写不敏感地匹配请求行与请求头。
    pub(crate) fn head_contains(&self, needle: &str) -> bool {
        self.head.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
    }

    pub(crate) fn json_body(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not json")
    }
}

/// 启动服务，返回可直接作为 `endpoint` 的地址。
pub(crate) fn spawn(response: FakeResponse) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
    let addr = listener.local_addr().expect("read local addr failed");

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept failed");
        let request = read_request(&mut stream);

        let reason = match response.status {
            200 => "OK",
            400 => "Bad Request",
            429 => "Too Many Requests",
            _ => "Error",
        };
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            response.status,
            reason,
            response.body.len()
        );

        stream.write_all(head.as_bytes()).expect("write headers failed");
        stream.write_all(response.body.as_bytes()).expect("write body failed");
        stream.flush().expect("flush failed");

        request
    });

    (format!("http://127.0.0.1:{}/v1beta", addr.port()), server)
}

fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 16 * 1024];

    loop {
        let n = stream.read(&mut chunk).expect("read request failed");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(head_end) = find_head_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);

            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    let head_end = find_head_end(&buf).unwrap_or(buf.len());
    let body_start = (head_end + 4).min(buf.len());

    CapturedRequest {
        head: String::from_utf8_lossy(&buf[..head_end]).into_owned(),
        body: buf[body_start..].to_vec(),
    }
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}
