use crate::{
    data::{RequestData, ResponseData},
    error::Error,
    store::Store,
    util,
};
use hyper::{
    body,
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use std::{
    convert::Infallible,
    net::TcpListener,
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};
use tokio::{runtime::Runtime, sync::oneshot};

/// State shared between the server thread and the [`crate::StubServer`] handle.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) store: Store,
    pub(crate) interactions: Vec<RequestData>,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            store: Store::new(),
            interactions: Vec::new(),
        }
    }

    fn record(&mut self, request_data: RequestData) -> ResponseData {
        let response_data = self.store.handle(&request_data);
        tracing::debug!(
            method = %request_data.method,
            uri = %request_data.uri,
            status = response_data.status_code,
            "stub handled request"
        );
        self.interactions.push(request_data);
        response_data
    }
}

pub(crate) fn start(
    listener: TcpListener,
    shared: Arc<Mutex<Shared>>,
    shutdown: oneshot::Receiver<()>,
) -> Result<JoinHandle<()>, Error> {
    let runtime = Runtime::new()?;

    Ok(thread::spawn(move || {
        runtime.block_on(async move {
            let builder = match Server::from_tcp(listener) {
                Ok(builder) => builder,
                Err(e) => {
                    tracing::error!(error = %e, "stub server could not adopt listener");
                    return;
                }
            };

            let server = builder
                .serve(make_service_fn(move |_| {
                    let shared = shared.clone();
                    async move {
                        Ok::<_, Infallible>(service_fn(move |req| {
                            let shared = shared.clone();
                            async move { Ok::<_, Infallible>(handle_request(&shared, req).await) }
                        }))
                    }
                }))
                .with_graceful_shutdown(async {
                    let _ = shutdown.await;
                });

            if let Err(e) = server.await {
                tracing::error!(error = %e, "stub server error");
            }
        });
    }))
}

async fn handle_request(shared: &Mutex<Shared>, mut request: Request<Body>) -> Response<Body> {
    let response_data = match read_request_data(&mut request).await {
        Ok(request_data) => respond(shared, request_data),
        Err(e) => ResponseData::failure(400, "400", &e.to_string()),
    };

    let mut response_builder = Response::builder().status(response_data.status_code);
    if let Some(headers_mut) = response_builder.headers_mut() {
        util::apply_headers(headers_mut, &response_data.headers);
    }

    response_builder
        .body(response_data.body.into())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "stub could not build response");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

fn respond(shared: &Mutex<Shared>, request_data: RequestData) -> ResponseData {
    match shared.lock() {
        Ok(mut shared) => shared.record(request_data),
        Err(_) => ResponseData::failure(500, "500", "stub state lock poisoned"),
    }
}

async fn read_request_data(request: &mut Request<Body>) -> Result<RequestData, Error> {
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let headers = util::header_strings(request.headers());

    let body = body::to_bytes(request.body_mut()).await?;

    Ok(RequestData {
        method,
        uri,
        headers,
        body: String::from_utf8_lossy(&body).into(),
    })
}
