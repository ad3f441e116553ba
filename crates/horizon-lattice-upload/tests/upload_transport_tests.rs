//! Tests for the upload transport's routing between multipart and the base transport.

use std::sync::{Arc, Mutex};

use horizon_lattice_upload::graphql::RequestOptions;
use horizon_lattice_upload::upload::{is_native_upload_file, FileList};
use horizon_lattice_upload::{
    create_transport, GraphQLRequest, GraphQLTransport, HttpMethod, HttpResponse,
    RequestAndOptions, Result, TransportOptions, UploadFile, UploadTransport, VariableValue,
};
use serde_json::json;

const QUERY: &str = "mutation Test($file: Upload!) { test(file: $file) { id } }";

/// Base transport that records every request handed to it.
#[derive(Clone, Debug, Default)]
struct RecordingTransport {
    calls: Arc<Mutex<Vec<RequestAndOptions>>>,
}

impl RecordingTransport {
    fn calls(&self) -> Vec<RequestAndOptions> {
        self.calls.lock().unwrap().clone()
    }
}

impl GraphQLTransport for RecordingTransport {
    fn uri(&self) -> &str {
        "/graphql"
    }

    async fn fetch_from_remote_endpoint(
        &self,
        request_and_options: RequestAndOptions,
    ) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(request_and_options);
        Ok(http::Response::new(r#"{"data":{"test":{"id":"1"}}}"#).into())
    }
}

fn transport_over(base: RecordingTransport) -> UploadTransport<RecordingTransport> {
    UploadTransport::builder("http://127.0.0.1:1/graphql")
        .build_with_base(base)
        .expect("Failed to build transport")
}

#[tokio::test]
async fn test_variables_without_files_use_base_transport() {
    let base = RecordingTransport::default();
    let transport = transport_over(base.clone());

    let request = GraphQLRequest::query(QUERY).json_variables(json!({"test": "test"}));
    let response = transport.execute(request.clone()).await.unwrap();

    assert!(response.is_success());
    let calls = base.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].request, request);
}

#[tokio::test]
async fn test_objects_with_uri_use_base_transport() {
    let base = RecordingTransport::default();
    let transport = transport_over(base.clone());

    let request = GraphQLRequest::mutation(QUERY).json_variables(json!({
        "link": {"uri": "https://example.com/page", "title": "x"},
        "resource": {"uri": "/etc/hostname"}
    }));
    transport.execute(request.clone()).await.unwrap();

    let calls = base.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].request, request);
}

#[tokio::test]
async fn test_null_variables_use_base_transport() {
    let base = RecordingTransport::default();
    let transport = transport_over(base.clone());

    let request = GraphQLRequest::query(QUERY).variables(VariableValue::Null);
    transport.execute(request.clone()).await.unwrap();

    assert_eq!(base.calls()[0].request, request);
}

#[tokio::test]
async fn test_missing_variables_use_base_transport() {
    let base = RecordingTransport::default();
    let transport = transport_over(base.clone());

    transport.execute(GraphQLRequest::query("{ ping }")).await.unwrap();

    assert_eq!(base.calls().len(), 1);
    assert!(base.calls()[0].request.variables.is_none());
}

#[tokio::test]
async fn test_files_without_multipart_use_base_transport() {
    let base = RecordingTransport::default();
    let transport = UploadTransport::builder("http://127.0.0.1:1/graphql")
        .supports_multipart(false)
        .build_with_base(base.clone())
        .unwrap();

    let request = GraphQLRequest::mutation(QUERY).variable("file", UploadFile::new("test", "x"));
    transport.execute(request.clone()).await.unwrap();

    // files are left in place for the base transport to serialize as null
    let calls = base.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].request, request);
}

#[tokio::test]
async fn test_fallback_passes_options_through() {
    let base = RecordingTransport::default();
    let transport = transport_over(base.clone());

    let options = RequestOptions::new()
        .method(HttpMethod::Put)
        .header("x-request-id", "42");
    let request = GraphQLRequest::query(QUERY).json_variables(json!({"test": "test"}));

    transport
        .fetch_from_remote_endpoint(RequestAndOptions::new(request).with_options(options))
        .await
        .unwrap();

    let calls = base.calls();
    assert_eq!(calls[0].options.method, Some(HttpMethod::Put));
    assert_eq!(calls[0].options.headers["x-request-id"], "42");
}

#[tokio::test]
async fn test_descriptor_ignored_by_native_recognizer() {
    let base = RecordingTransport::default();
    let transport = UploadTransport::builder("http://127.0.0.1:1/graphql")
        .is_upload_file(is_native_upload_file)
        .build_with_base(base.clone())
        .unwrap();

    let descriptor = json!({"uri": "/some/uri", "type": "image/png", "name": "some name"});
    let request = GraphQLRequest::mutation(QUERY).json_variables(json!({"file": descriptor}));
    transport.execute(request).await.unwrap();

    assert_eq!(base.calls().len(), 1);
}

#[tokio::test]
async fn test_upload_does_not_reach_base_transport() {
    let base = RecordingTransport::default();
    let transport = transport_over(base.clone());

    let request = GraphQLRequest::mutation(QUERY).variable("file", UploadFile::new("test", "x"));
    // nothing listens on port 1, so the multipart post fails
    assert!(transport.execute(request).await.is_err());
    assert!(base.calls().is_empty());
}

#[tokio::test]
async fn test_create_transport_defaults() {
    let transport = create_transport(TransportOptions::new("https://api.example.com/graphql"))
        .expect("Failed to create transport");

    let files: FileList = vec![UploadFile::new("a.txt", "a")].into();
    let variables = VariableValue::from_iter([("files", files)]);
    let extracted = transport.extract_files(&variables);

    assert_eq!(extracted.tokens().collect::<Vec<_>>(), vec!["files"]);
    assert_eq!(extracted.variables.to_json().unwrap(), json!({"files": "files"}));
}

// Integration tests with wiremock
#[cfg(feature = "integration-tests")]
mod integration {
    use super::*;
    use horizon_lattice_upload::upload::FileDescriptor;
    use horizon_lattice_upload::NetworkError;
    use std::io::Write;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn upload_server() -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"test": {"id": "1"}}})),
            )
            .mount(&mock_server)
            .await;
        mock_server
    }

    async fn received_body(mock_server: &MockServer) -> (String, String) {
        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let content_type = requests[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = String::from_utf8_lossy(&requests[0].body).into_owned();
        (content_type, body)
    }

    fn position(body: &str, needle: &str) -> usize {
        body.find(needle)
            .unwrap_or_else(|| panic!("{needle:?} not found in body:\n{body}"))
    }

    #[tokio::test]
    async fn test_single_file_upload() {
        let mock_server = upload_server().await;
        let transport = UploadTransport::builder(format!("{}/graphql", mock_server.uri()))
            .build()
            .unwrap();

        let file = UploadFile::new("test.txt", "file contents").with_mime_type("text/plain");
        let request = GraphQLRequest::mutation(QUERY).variable("file", file);

        let response = transport.execute(request).await.unwrap();
        assert_eq!(response.field::<serde_json::Value>("test").unwrap(), json!({"id": "1"}));

        let (content_type, body) = received_body(&mock_server).await;
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        let query = position(&body, r#"name="query""#);
        let variables = position(&body, r#"name="variables""#);
        let file = position(&body, r#"name="file"; filename="test.txt""#);
        assert!(query < variables && variables < file);

        assert!(body.contains(QUERY));
        assert!(body.contains(r#"{"file":"file"}"#));
        assert!(body.contains("Content-Type: text/plain"));
        assert!(body.contains("file contents"));
    }

    #[tokio::test]
    async fn test_file_list_repeats_field() {
        let mock_server = upload_server().await;
        let transport = UploadTransport::builder(format!("{}/graphql", mock_server.uri()))
            .build()
            .unwrap();

        let files: FileList = vec![UploadFile::new("1.txt", "one"), UploadFile::new("2.txt", "two")].into();
        let b = VariableValue::from_iter([("b", files)]);
        let request = GraphQLRequest::mutation("mutation($a: Input!) { test(a: $a) { id } }")
            .variable("a", b);

        transport.execute(request).await.unwrap();

        let (_, body) = received_body(&mock_server).await;
        assert!(body.contains(r#"{"a":{"b":"a.b"}}"#));
        let first = position(&body, r#"name="a.b"; filename="1.txt""#);
        let second = position(&body, r#"name="a.b"; filename="2.txt""#);
        assert!(first < second);
        assert!(body.contains("Content-Type: application/octet-stream"));
    }

    #[tokio::test]
    async fn test_descriptor_upload_reads_file() {
        let mock_server = upload_server().await;
        let transport = UploadTransport::builder(format!("{}/graphql", mock_server.uri()))
            .build()
            .unwrap();

        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"descriptor contents").unwrap();
        let uri = temp.path().to_str().unwrap().to_string();

        let request = GraphQLRequest::mutation(QUERY)
            .variable("file", FileDescriptor::new(uri, "image/png", "photo.png"));
        transport.execute(request).await.unwrap();

        let (_, body) = received_body(&mock_server).await;
        assert!(body.contains(r#"{"file":"file"}"#));
        assert!(body.contains(r#"name="file"; filename="photo.png""#));
        assert!(body.contains("Content-Type: image/png"));
        assert!(body.contains("descriptor contents"));
    }

    #[tokio::test]
    async fn test_remote_descriptor_is_rejected() {
        let mock_server = upload_server().await;
        let transport = UploadTransport::builder(format!("{}/graphql", mock_server.uri()))
            .build()
            .unwrap();

        let request = GraphQLRequest::mutation(QUERY).variable(
            "file",
            FileDescriptor::new("https://cdn.example.com/a.png", "image/png", "a.png"),
        );

        let err = transport.execute(request).await.unwrap_err();
        assert!(matches!(err, NetworkError::UnsupportedUri(_)));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_headers_merge() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer call-token"))
            .and(header("x-client", "lattice"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = UploadTransport::builder(format!("{}/graphql", mock_server.uri()))
            .bearer_auth("default-token")
            .header("x-client", "lattice")
            // a fixed content type must not clobber the multipart boundary
            .header("content-type", "application/json")
            .build()
            .unwrap();

        let request = GraphQLRequest::mutation(QUERY).variable("file", UploadFile::new("a", "b"));
        let options = RequestOptions::new().header("authorization", "Bearer call-token");
        let response = transport
            .fetch_from_remote_endpoint(RequestAndOptions::new(request).with_options(options))
            .await
            .unwrap();
        assert!(response.is_success());

        let (content_type, _) = received_body(&mock_server).await;
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn test_plain_request_sends_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"query": QUERY, "variables": {"test": "test"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"test": null}})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = UploadTransport::builder(format!("{}/graphql", mock_server.uri()))
            .build()
            .unwrap();
        let request = GraphQLRequest::query(QUERY).json_variables(json!({"test": "test"}));

        let response = transport.execute(request).await.unwrap();
        assert!(!response.has_errors());
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(413).set_body_string("Payload Too Large"))
            .mount(&mock_server)
            .await;

        let transport = UploadTransport::builder(format!("{}/graphql", mock_server.uri()))
            .build()
            .unwrap();
        let request = GraphQLRequest::mutation(QUERY).variable("file", UploadFile::new("a", "b"));

        match transport.execute(request).await {
            Err(NetworkError::HttpStatus { status, message }) => {
                assert_eq!(status, 413);
                assert_eq!(message.as_deref(), Some("Payload Too Large"));
            }
            other => panic!("expected HTTP status error, got {other:?}"),
        }
    }
}
