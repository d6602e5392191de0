//! Mock OAuth2 server for integration tests
//!
//! Serves a token endpoint and a user-info endpoint with configurable
//! JSON bodies, and records every token request so tests can assert on
//! the exact form fields and credentials sent.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Error simulation mode.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
	Success,
	InvalidResponse,
	Unauthorized,
	ServerError,
}

/// One recorded token-endpoint request.
#[derive(Clone, Debug)]
pub struct CapturedTokenRequest {
	pub form: HashMap<String, String>,
	pub authorization: Option<String>,
}

struct ServerState {
	error_mode: ErrorMode,
	token_response: Value,
	user_response: Value,
	token_requests: Vec<CapturedTokenRequest>,
}

/// Mock OAuth2 server.
pub struct MockOAuthServer {
	state: Arc<Mutex<ServerState>>,
	local_addr: SocketAddr,
}

impl MockOAuthServer {
	/// Starts a server on an ephemeral port.
	pub async fn start() -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let local_addr = listener.local_addr().unwrap();

		let state = Arc::new(Mutex::new(ServerState {
			error_mode: ErrorMode::Success,
			token_response: json!({
				"access_token": "test_access_token",
				"token_type": "Bearer",
				"expires_in": 3600,
				"refresh_token": "test_refresh_token",
				"scope": "profile"
			}),
			user_response: json!({
				"id": "test_user",
				"name": "Test User",
				"email": "test@example.com"
			}),
			token_requests: Vec::new(),
		}));

		let state_clone = state.clone();
		tokio::spawn(async move {
			let state = state_clone;
			loop {
				if let Ok((stream, _)) = listener.accept().await {
					let io = TokioIo::new(stream);
					let state = state.clone();

					tokio::spawn(async move {
						let mut service =
							hyper::service::service_fn(move |req: Request<Incoming>| {
								let state = state.clone();
								async move { handle_request(req, state).await }
							});

						let _ = hyper::server::conn::http1::Builder::new()
							.serve_connection(io, &mut service)
							.await;
					});
				}
			}
		});

		// Wait for server to start
		tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

		Self { state, local_addr }
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.local_addr)
	}

	pub fn set_error_mode(&self, mode: ErrorMode) {
		self.state.lock().unwrap().error_mode = mode;
	}

	pub fn set_token_response(&self, response: Value) {
		self.state.lock().unwrap().token_response = response;
	}

	pub fn set_user_response(&self, response: Value) {
		self.state.lock().unwrap().user_response = response;
	}

	/// Every token request received so far, in order.
	pub fn token_requests(&self) -> Vec<CapturedTokenRequest> {
		self.state.lock().unwrap().token_requests.clone()
	}
}

async fn handle_request(
	req: Request<Incoming>,
	state: Arc<Mutex<ServerState>>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
	let path = req.uri().path().to_string();
	let method = req.method().clone();
	let authorization = req
		.headers()
		.get(hyper::header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.map(str::to_owned);

	let body = req.into_body().collect().await?.to_bytes();

	let error_mode = state.lock().unwrap().error_mode;
	match error_mode {
		ErrorMode::InvalidResponse => {
			return Ok(json_response(
				StatusCode::OK,
				Bytes::from("{invalid json!!! not valid"),
			));
		}
		ErrorMode::Unauthorized => {
			return Ok(empty_response(StatusCode::UNAUTHORIZED));
		}
		ErrorMode::ServerError => {
			return Ok(empty_response(StatusCode::INTERNAL_SERVER_ERROR));
		}
		ErrorMode::Success => {}
	}

	match (method, path.as_str()) {
		(Method::POST, "/token") => {
			let form = url::form_urlencoded::parse(&body).into_owned().collect();
			let response = {
				let mut state = state.lock().unwrap();
				state.token_requests.push(CapturedTokenRequest {
					form,
					authorization,
				});
				state.token_response.clone()
			};

			Ok(json_response(
				StatusCode::OK,
				Bytes::from(response.to_string()),
			))
		}

		(Method::GET, "/user") => {
			let response = state.lock().unwrap().user_response.clone();

			Ok(json_response(
				StatusCode::OK,
				Bytes::from(response.to_string()),
			))
		}

		_ => Ok(empty_response(StatusCode::NOT_FOUND)),
	}
}

fn json_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
	Response::builder()
		.status(status)
		.header("Content-Type", "application/json")
		.body(Full::from(body))
		.unwrap()
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
	Response::builder()
		.status(status)
		.body(Full::default())
		.unwrap()
}
