use schoology::{Auth, Error, Schoology};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_server() -> (Runtime, MockServer) {
    let rt = Runtime::new().expect("tokio runtime");
    let server = rt.block_on(MockServer::start());
    (rt, server)
}

fn mount(rt: &Runtime, server: &MockServer, mock: Mock) {
    rt.block_on(mock.mount(server));
}

fn client_against(server: &MockServer) -> Schoology {
    Schoology::new(Auth::new("key", "secret").api_root(server.uri())).unwrap()
}

#[test]
fn record_endpoint_decodes_a_bare_object() {
    let (rt, server) = mock_server();
    mount(
        &rt,
        &server,
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .and(header_exists("authorization"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uid": "42",
                "name_display": "Ada Lovelace",
            }))),
    );

    let me = client_against(&server).me().unwrap();
    assert_eq!(me.str_field("name_display"), Some("Ada Lovelace"));
    assert_eq!(me.id_field("uid"), Some(42));
}

#[test]
fn collection_endpoint_unwraps_the_envelope_key() {
    let (rt, server) = mock_server();
    mount(
        &rt,
        &server,
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": [
                    { "uid": 1, "name_display": "Ada" },
                    { "uid": 2, "name_display": "Grace" },
                ],
                "total": 2,
            }))),
    );

    let users = client_against(&server).users().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].str_field("name_display"), Some("Grace"));
}

#[test]
fn missing_envelope_is_a_decode_error() {
    let (rt, server) = mock_server();
    mount(
        &rt,
        &server,
        Mock::given(method("GET"))
            .and(path("/schools"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nope": [] }))),
    );

    match client_against(&server).schools() {
        Err(Error::Decode { .. }) => {}
        other => panic!("expected Decode, got {:?}", other),
    }
}

#[test]
fn error_status_carries_status_and_body() {
    let (rt, server) = mock_server();
    mount(
        &rt,
        &server,
        Mock::given(method("GET"))
            .and(path("/recent"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops")),
    );

    match client_against(&server).feed() {
        Err(Error::Api { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "oops");
        }
        other => panic!("expected Api, got {:?}", other),
    }
}

#[test]
fn non_json_success_body_is_a_decode_error() {
    let (rt, server) = mock_server();
    mount(
        &rt,
        &server,
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all")),
    );

    match client_against(&server).me() {
        Err(Error::Decode { .. }) => {}
        other => panic!("expected Decode, got {:?}", other),
    }
}

#[test]
fn send_message_joins_recipients_into_the_wire_format() {
    let (rt, server) = mock_server();
    mount(
        &rt,
        &server,
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_string_contains("\"recipient_ids\":\"123,456\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "subject": "hello",
                "recipient_ids": "123,456",
            }))),
    );

    let message = client_against(&server)
        .send_message("hello", "first message", &[123, 456])
        .unwrap();
    assert_eq!(message.recipient_ids(), Some(vec![123, 456]));
    assert_eq!(message.id_field("id"), Some(7));
}

#[test]
fn delete_succeeds_on_2xx_and_fails_on_error_status() {
    let (rt, server) = mock_server();
    mount(
        &rt,
        &server,
        Mock::given(method("DELETE"))
            .and(path("/messages/7"))
            .respond_with(ResponseTemplate::new(204)),
    );
    mount(
        &rt,
        &server,
        Mock::given(method("DELETE"))
            .and(path("/messages/8"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thread")),
    );

    let api = client_against(&server);
    api.delete("messages/7").unwrap();
    match api.delete("messages/8") {
        Err(Error::Api { status, .. }) => assert_eq!(status.as_u16(), 404),
        other => panic!("expected Api, got {:?}", other),
    }
}
