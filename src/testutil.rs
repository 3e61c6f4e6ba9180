//! Test fixtures: loopback origin and mock HTTP proxy servers that answer
//! every request with a canned document, a SOCKS5 relay, plus an in-memory
//! write sink.

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::transport::ResolvedEndpoint;

/// How the mock relays the document
#[derive(Debug, Clone, Copy)]
pub enum RelayMode {
	Faithful,
	/// Append one byte to the body
	InjectByte,
	/// Answer with this status and an empty body
	Status(u16),
	/// Serve this many requests faithfully, then close every connection
	DropAfter(usize),
}

pub struct MockServer {
	pub endpoint: ResolvedEndpoint,
	pub url: String,
	requests: Arc<AtomicUsize>,
}

impl MockServer {
	pub fn requests(&self) -> usize {
		self.requests.load(Ordering::SeqCst)
	}
}

/// Serve `body` at `http://127.0.0.1:<port>/doc`.
pub async fn spawn_origin(body: Vec<u8>) -> MockServer {
	spawn_proxy(body, RelayMode::Faithful).await
}

/// Start a mock HTTP proxy on an ephemeral loopback port.
pub async fn spawn_proxy(body: Vec<u8>, mode: RelayMode) -> MockServer {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr: SocketAddr = listener.local_addr().unwrap();
	let requests = Arc::new(AtomicUsize::new(0));
	let counter = requests.clone();

	tokio::spawn(async move {
		loop {
			let Ok((stream, _)) = listener.accept().await else {
				return;
			};
			let body = body.clone();
			let counter = counter.clone();
			tokio::spawn(async move {
				handle(stream, body, mode, counter).await;
			});
		}
	});

	MockServer {
		endpoint: ResolvedEndpoint { ip: addr.ip(), port: addr.port() },
		url: format!("http://{}/doc", addr),
		requests,
	}
}

/// Start a no-auth SOCKS5 relay that forwards CONNECT requests.
///
/// Anything that is not a SOCKS5 greeting (e.g. an HTTP proxy request) gets
/// the connection closed.
pub async fn spawn_socks5_relay() -> MockServer {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr: SocketAddr = listener.local_addr().unwrap();
	let requests = Arc::new(AtomicUsize::new(0));
	let counter = requests.clone();

	tokio::spawn(async move {
		loop {
			let Ok((stream, _)) = listener.accept().await else {
				return;
			};
			let counter = counter.clone();
			tokio::spawn(async move {
				let _ = relay_socks5(stream, counter).await;
			});
		}
	});

	MockServer {
		endpoint: ResolvedEndpoint { ip: addr.ip(), port: addr.port() },
		url: format!("socks5://{}", addr),
		requests,
	}
}

async fn relay_socks5(mut client: TcpStream, counter: Arc<AtomicUsize>) -> std::io::Result<()> {
	let mut head = [0u8; 2];
	client.read_exact(&mut head).await?;
	if head[0] != 0x05 {
		return Ok(());
	}
	let mut methods = vec![0u8; head[1] as usize];
	client.read_exact(&mut methods).await?;
	if !methods.contains(&0x00) {
		client.write_all(&[0x05, 0xff]).await?;
		return Ok(());
	}
	client.write_all(&[0x05, 0x00]).await?;

	// VER CMD RSV ATYP
	let mut request = [0u8; 4];
	client.read_exact(&mut request).await?;
	if request[1] != 0x01 {
		client.write_all(&[0x05, 0x07, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await?;
		return Ok(());
	}
	let ip = match request[3] {
		0x01 => {
			let mut octets = [0u8; 4];
			client.read_exact(&mut octets).await?;
			IpAddr::V4(Ipv4Addr::from(octets))
		}
		0x04 => {
			let mut octets = [0u8; 16];
			client.read_exact(&mut octets).await?;
			IpAddr::V6(Ipv6Addr::from(octets))
		}
		_ => {
			// Domain targets are not needed by the tests
			client.write_all(&[0x05, 0x08, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await?;
			return Ok(());
		}
	};
	let mut port = [0u8; 2];
	client.read_exact(&mut port).await?;
	let target = SocketAddr::new(ip, u16::from_be_bytes(port));

	let mut upstream = match TcpStream::connect(target).await {
		Ok(s) => s,
		Err(_) => {
			client.write_all(&[0x05, 0x05, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await?;
			return Ok(());
		}
	};
	counter.fetch_add(1, Ordering::SeqCst);
	client.write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]).await?;
	tokio::io::copy_bidirectional(&mut client, &mut upstream).await?;
	Ok(())
}

/// Loopback endpoint with nothing listening on it.
pub async fn closed_endpoint() -> ResolvedEndpoint {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);
	ResolvedEndpoint { ip: addr.ip(), port: addr.port() }
}

async fn handle(mut stream: TcpStream, body: Vec<u8>, mode: RelayMode, counter: Arc<AtomicUsize>) {
	if !read_request_head(&mut stream).await {
		return;
	}
	let seen = counter.fetch_add(1, Ordering::SeqCst) + 1;

	let (status, payload) = match mode {
		RelayMode::Faithful => (200, body),
		RelayMode::InjectByte => {
			let mut tampered = body;
			tampered.push(b'X');
			(200, tampered)
		}
		RelayMode::Status(code) => (code, Vec::new()),
		RelayMode::DropAfter(limit) if seen > limit => return,
		RelayMode::DropAfter(_) => (200, body),
	};

	let reason = if status == 200 { "OK" } else { "Error" };
	let head = format!(
		"HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
		status, reason, payload.len(),
	);
	let _ = stream.write_all(head.as_bytes()).await;
	let _ = stream.write_all(&payload).await;
	let _ = stream.shutdown().await;
}

async fn read_request_head(stream: &mut TcpStream) -> bool {
	let mut buf = Vec::new();
	let mut chunk = [0u8; 1024];
	while buf.len() < 64 * 1024 {
		match stream.read(&mut chunk).await {
			Ok(0) | Err(_) => return false,
			Ok(n) => buf.extend_from_slice(&chunk[..n]),
		}
		if buf.windows(4).any(|w| w == b"\r\n\r\n") {
			return true;
		}
	}
	false
}

/// Write sink whose contents the test can read back
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
	pub fn contents(&self) -> String {
		String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
	}
}

impl Write for SharedBuf {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}
