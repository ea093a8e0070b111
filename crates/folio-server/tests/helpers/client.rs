//! Test client helpers.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Helper para tests de integracion HTTP.
#[derive(Clone)]
pub struct TestClient {
    app: Router,
    caller: Option<String>,
}

impl TestClient {
    /// Crea un nuevo test client con el router proporcionado.
    pub fn new(app: Router) -> Self {
        Self { app, caller: None }
    }

    /// Envia las requests como el email dado (headers del proxy de identidad).
    pub fn as_caller(&self, email: &str) -> Self {
        Self {
            app: self.app.clone(),
            caller: Some(email.to_string()),
        }
    }

    /// Hace un GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, &[]).await
    }

    /// Hace un GET request con headers personalizados.
    pub async fn get_with_headers(&self, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.send(Method::GET, uri, None, headers).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body), &[]).await
    }

    pub async fn post_with_headers(
        &self,
        uri: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.send(Method::POST, uri, Some(body), headers).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body), &[]).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None, &[]).await
    }

    /// Abre un stream (SSE) y retorna la respuesta sin leer el body.
    pub async fn open_stream(&self, uri: &str) -> Response<Body> {
        let request = self.build(Method::GET, uri, None, &[]);
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let request = self.build(method, uri, body, headers);
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }

    fn build(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Request<Body> {
        let mut builder = Request::builder().uri(uri).method(method);

        if let Some(email) = &self.caller {
            builder = builder.header("x-auth-email", email.as_str());
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            },
            None => Body::empty(),
        };

        builder.body(body).unwrap()
    }
}

/// Wrapper sobre Response con helpers para assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        Self {
            status,
            headers,
            body,
        }
    }

    /// Retorna el body como string.
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Body is not valid UTF-8")
    }

    /// Parsea el body como JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }

    /// Retorna un header especifico.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Verifica que el status sea el esperado.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Verifica que un header exista.
    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Expected header '{}' to exist",
            name
        );
        self
    }

    /// Verifica que un header tenga un valor especifico.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let value = self
            .header(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));

        assert_eq!(
            value, expected,
            "Expected header '{}' to be '{}' but got '{}'",
            name, expected, value
        );
        self
    }
}

/// Lee el siguiente frame de datos de un stream SSE.
pub async fn next_sse_chunk(body: &mut Body) -> String {
    loop {
        let frame = body
            .frame()
            .await
            .expect("stream ended")
            .expect("stream failed");
        if let Ok(data) = frame.into_data() {
            let text = String::from_utf8(data.to_vec()).expect("SSE chunk is not UTF-8");
            // Los keep-alive son comentarios (":")
            if !text.starts_with(':') {
                return text;
            }
        }
    }
}
