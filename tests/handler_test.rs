//! ApiHandler driven through small ad-hoc routers: custom token parsers, error mapping,
//! validation switches, body limits and streamed replies.

mod common;

use std::sync::Arc;

use api_handler::{
    ApiHandler, AppError, FieldError, HandlerConfig, MultipartRequest, Reply, RequestInfo,
    Stream, TokenError, TokenParser, UploadedFile, WithRequestInfo, handler::set_field,
};
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{Request as HttpRequest, StatusCode, header},
    routing::{any, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use common::{Part, body_bytes, body_json, json_request, multipart_request, send};

const LARGE_BODY: usize = 3 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Caller {
    user: String,
}

/// Accepts opaque tokens of the form `user:<name>`.
struct PrefixParser;

impl TokenParser<Caller> for PrefixParser {
    fn parse_token(&self, token: &str) -> Result<Caller, TokenError> {
        token
            .strip_prefix("user:")
            .map(|user| Caller {
                user: user.to_string(),
            })
            .ok_or(TokenError::InvalidFormat)
    }
}

type Handler = Arc<ApiHandler<Caller, PrefixParser>>;

fn handler(config: HandlerConfig) -> Handler {
    Arc::new(ApiHandler::with_parser(PrefixParser, config))
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
struct Item {
    #[serde(default)]
    #[validate(length(min = 3))]
    name: String,
    #[serde(default)]
    quantity: u32,
    #[serde(skip_deserializing)]
    caller: Option<Caller>,
}

impl WithRequestInfo<Caller> for Item {
    fn set_request_info(&mut self, info: RequestInfo<Caller>) {
        self.caller = info.claims;
    }
}

#[derive(Debug, Default, Validate)]
struct Attachment {
    #[validate(range(min = 1))]
    page: u32,
    doc: Option<UploadedFile>,
}

impl MultipartRequest for Attachment {
    fn form_fields(&self) -> &'static [&'static str] {
        &["page"]
    }

    fn set_form_field(&mut self, name: &str, raw: &str) -> Result<(), FieldError> {
        match name {
            "page" => set_field(&mut self.page, raw),
            _ => Err(FieldError::Unknown),
        }
    }

    fn file_fields(&self) -> &'static [&'static str] {
        &["doc"]
    }

    fn set_file(&mut self, _name: &str, file: UploadedFile) {
        self.doc = Some(file);
    }
}

impl WithRequestInfo<Caller> for Attachment {}

fn items_router(h: Handler, validate: bool) -> Router {
    Router::new()
        .route(
            "/items",
            post(move |State(h): State<Handler>, req: Request| async move {
                h.handle(req, validate, |item: Item| async move {
                    Ok::<_, AppError>(Reply::data(item))
                })
                .await
            }),
        )
        .with_state(h)
}

fn failing_router(h: Handler) -> Router {
    Router::new()
        .route(
            "/missing",
            get(|State(h): State<Handler>, req: Request| async move {
                h.handle(req, false, |_: Item| async move {
                    Err::<Reply<()>, _>(AppError::NotFound)
                })
                .await
            }),
        )
        .route(
            "/teapot",
            get(|State(h): State<Handler>, req: Request| async move {
                h.handle(req, false, |_: Item| async move {
                    Err::<Reply<()>, _>(AppError::custom(
                        StatusCode::IM_A_TEAPOT,
                        "TEA418",
                        "I'm a teapot",
                    ))
                })
                .await
            }),
        )
        .route(
            "/boom",
            get(|State(h): State<Handler>, req: Request| async move {
                h.handle(req, false, |_: Item| async move {
                    let err: AppError = anyhow::anyhow!("connection reset").into();
                    Err::<Reply<()>, _>(err)
                })
                .await
            }),
        )
        .with_state(h)
}

fn attachments_router(h: Handler, validate: bool) -> Router {
    Router::new()
        .route(
            "/attachments",
            any(move |State(h): State<Handler>, req: Request| async move {
                h.handle_multipart(req, validate, &["application/pdf"], |a: Attachment| async move {
                    Ok::<_, AppError>(Reply::data(json!({
                        "page": a.page,
                        "doc": a.doc.map(|d| d.file_name),
                    })))
                })
                .await
            }),
        )
        .with_state(h)
}

fn export_router(h: Handler) -> Router {
    Router::new()
        .route(
            "/export",
            get(|State(h): State<Handler>, req: Request| async move {
                h.handle_empty(req, |_: RequestInfo<Caller>| async move {
                    let rows = ["id,name\n", "1,bolt\n", "2,nut\n"];
                    let chunks = futures_util::stream::iter(rows.map(Ok::<_, std::io::Error>));
                    Ok::<_, AppError>(Reply::<()>::stream(Stream::from_stream(
                        "text/csv",
                        "items.csv",
                        chunks,
                    )))
                })
                .await
            }),
        )
        .with_state(h)
}

fn form_request(uri: &str, body: String) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn whoami_router(h: Handler) -> Router {
    Router::new()
        .route(
            "/whoami",
            get(|State(h): State<Handler>, req: Request| async move {
                h.handle_empty(req, |info: RequestInfo<Caller>| async move {
                    Ok::<_, AppError>(Reply::data(info))
                })
                .await
            }),
        )
        .with_state(h)
}

#[tokio::test]
async fn custom_parser_supplies_claims() {
    let mut req = json_request("POST", "/items", &json!({"name": "bolt", "quantity": 4}));
    req.headers_mut()
        .insert(header::AUTHORIZATION, "Bearer user:alice".parse().unwrap());

    let res = send(items_router(handler(HandlerConfig::default()), true), req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await,
        json!({
            "code": "OK",
            "message": "Success",
            "data": {"name": "bolt", "quantity": 4, "caller": {"user": "alice"}}
        })
    );
}

#[tokio::test]
async fn rejected_token_leaves_caller_empty() {
    let mut req = json_request("POST", "/items", &json!({"name": "bolt"}));
    req.headers_mut()
        .insert(header::AUTHORIZATION, "Bearer admin".parse().unwrap());

    let res = send(items_router(handler(HandlerConfig::default()), true), req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["caller"], Value::Null);
}

#[tokio::test]
async fn validation_runs_only_when_requested() {
    let h = handler(HandlerConfig::default());
    let short = json!({"name": "x"});

    let strict = send(
        items_router(h.clone(), true),
        json_request("POST", "/items", &short),
    )
    .await;
    let lenient = send(items_router(h, false), json_request("POST", "/items", &short)).await;

    assert_eq!(strict.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(strict).await["code"], "CLE029");
    assert_eq!(lenient.status(), StatusCode::OK);
    assert_eq!(body_json(lenient).await["data"]["name"], "x");
}

#[tokio::test]
async fn wrong_field_type_is_bad_request() {
    let req = json_request("POST", "/items", &json!({"name": "bolt", "quantity": "four"}));

    let res = send(items_router(handler(HandlerConfig::default()), false), req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "CLE001");
}

#[tokio::test]
async fn oversized_body_is_bad_request() {
    let h = handler(HandlerConfig { body_limit: 16 });
    let req = json_request("POST", "/items", &json!({"name": "a much longer name than allowed"}));

    let res = send(items_router(h, false), req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "CLE001");
}

#[tokio::test]
async fn callback_errors_are_rendered_as_envelopes() {
    let h = handler(HandlerConfig::default());
    let request = |uri: &str| {
        HttpRequest::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    let missing = send(failing_router(h.clone()), request("/missing")).await;
    let teapot = send(failing_router(h.clone()), request("/teapot")).await;
    let boom = send(failing_router(h), request("/boom")).await;

    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(missing).await,
        json!({"code": "CLE004", "message": "Not Found"})
    );
    assert_eq!(teapot.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(
        body_json(teapot).await,
        json!({"code": "TEA418", "message": "I'm a teapot"})
    );
    assert_eq!(boom.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(boom).await,
        json!({"code": "SVE001", "message": "Internal Server Error"})
    );
}

#[tokio::test]
async fn multipart_handler_refuses_get() {
    let req = HttpRequest::builder()
        .method("GET")
        .uri("/attachments")
        .body(Body::empty())
        .unwrap();

    let res = send(attachments_router(handler(HandlerConfig::default()), true), req).await;

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(res).await["code"], "CLE005");
}

#[tokio::test]
async fn multipart_skips_mime_check_without_validation() {
    let parts = [
        Part::Text("page", "2"),
        Part::File {
            name: "doc",
            file_name: "scan.tiff",
            content_type: "image/tiff",
            data: b"II*\0",
        },
    ];

    let strict = send(
        attachments_router(handler(HandlerConfig::default()), true),
        multipart_request("/attachments", &parts),
    )
    .await;
    let lenient = send(
        attachments_router(handler(HandlerConfig::default()), false),
        multipart_request("/attachments", &parts),
    )
    .await;

    // The tiff is dropped, but nothing requires it
    assert_eq!(strict.status(), StatusCode::OK);
    assert_eq!(body_json(strict).await["data"], json!({"page": 2, "doc": null}));
    assert_eq!(lenient.status(), StatusCode::OK);
    assert_eq!(
        body_json(lenient).await["data"],
        json!({"page": 2, "doc": "scan.tiff"})
    );
}

#[tokio::test]
async fn multipart_empty_values_keep_defaults() {
    let parts = [Part::Text("page", "")];

    let res = send(
        attachments_router(handler(HandlerConfig::default()), false),
        multipart_request("/attachments", &parts),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["data"]["page"], 0);
}

#[tokio::test]
async fn multipart_validation_failure_is_data_invalid() {
    let parts = [Part::Text("page", "0")];

    let res = send(
        attachments_router(handler(HandlerConfig::default()), true),
        multipart_request("/attachments", &parts),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "CLE029");
}

#[tokio::test]
async fn empty_handler_resolves_claims_only() {
    let with_token = HttpRequest::builder()
        .uri("/whoami")
        .header(header::AUTHORIZATION, "Bearer user:bob")
        .body(Body::empty())
        .unwrap();
    let without_token = HttpRequest::builder()
        .uri("/whoami")
        .body(Body::empty())
        .unwrap();

    let h = handler(HandlerConfig::default());
    let known = send(whoami_router(h.clone()), with_token).await;
    let anonymous = send(whoami_router(h), without_token).await;

    assert_eq!(
        body_json(known).await["data"],
        json!({"claims": {"user": "bob"}})
    );
    assert_eq!(body_json(anonymous).await["data"], json!({"claims": null}));
}

#[tokio::test]
async fn token_falls_back_to_urlencoded_body_field() {
    let req = form_request("/items", "name=bolt&quantity=2&token=user%3Acarol".to_string());

    let res = send(items_router(handler(HandlerConfig::default()), true), req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await["data"],
        json!({"name": "bolt", "quantity": 2, "caller": {"user": "carol"}})
    );
}

#[tokio::test]
async fn multipart_body_fills_plain_handler_and_uses_form_token() {
    let mut req = multipart_request(
        "/items",
        &[
            Part::Text("name", "washer"),
            Part::Text("quantity", "5"),
            Part::Text("token", "user:dave"),
        ],
    );
    req.headers_mut()
        .insert(header::AUTHORIZATION, "Bearer user:erin".parse().unwrap());

    let res = send(items_router(handler(HandlerConfig::default()), true), req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await["data"],
        json!({"name": "washer", "quantity": 5, "caller": {"user": "dave"}})
    );
}

#[tokio::test]
async fn multipart_body_with_bad_number_is_bad_request() {
    let req = multipart_request(
        "/items",
        &[Part::Text("name", "washer"), Part::Text("quantity", "five")],
    );

    let res = send(items_router(handler(HandlerConfig::default()), false), req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "CLE001");
}

#[tokio::test]
async fn large_limit_applies_to_urlencoded_bodies() {
    let h = handler(HandlerConfig {
        body_limit: 8 * 1024 * 1024,
    });
    let name = "a".repeat(LARGE_BODY);

    let res = send(items_router(h, false), form_request("/items", format!("name={name}"))).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["data"]["name"].as_str().map(str::len), Some(LARGE_BODY));
}

#[tokio::test]
async fn large_limit_applies_to_multipart_bodies() {
    let h = handler(HandlerConfig {
        body_limit: 8 * 1024 * 1024,
    });
    let pdf = vec![b'%'; LARGE_BODY];
    let name = "b".repeat(LARGE_BODY);

    let upload = send(
        attachments_router(h.clone(), true),
        multipart_request(
            "/attachments",
            &[
                Part::Text("page", "1"),
                Part::File {
                    name: "doc",
                    file_name: "big.pdf",
                    content_type: "application/pdf",
                    data: &pdf,
                },
            ],
        ),
    )
    .await;
    let plain = send(
        items_router(h, false),
        multipart_request("/items", &[Part::Text("name", &name)]),
    )
    .await;

    assert_eq!(upload.status(), StatusCode::OK);
    assert_eq!(
        body_json(upload).await["data"],
        json!({"page": 1, "doc": "big.pdf"})
    );
    assert_eq!(plain.status(), StatusCode::OK);
    let body = body_json(plain).await;
    assert_eq!(body["data"]["name"].as_str().map(str::len), Some(LARGE_BODY));
}

#[tokio::test]
async fn configured_limit_still_caps_multipart_bodies() {
    let h = handler(HandlerConfig { body_limit: 1024 });
    let pdf = vec![b'%'; 4096];

    let res = send(
        attachments_router(h, false),
        multipart_request(
            "/attachments",
            &[
                Part::Text("page", "1"),
                Part::File {
                    name: "doc",
                    file_name: "big.pdf",
                    content_type: "application/pdf",
                    data: &pdf,
                },
            ],
        ),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "CLE001");
}

#[tokio::test]
async fn streamed_reply_of_unknown_size_arrives_intact() {
    let req = HttpRequest::builder()
        .uri("/export")
        .body(Body::empty())
        .unwrap();

    let res = send(export_router(handler(HandlerConfig::default())), req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::CONTENT_LENGTH).is_none());
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        res.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"items.csv\""
    );
    assert_eq!(body_bytes(res).await, b"id,name\n1,bolt\n2,nut\n");
}
