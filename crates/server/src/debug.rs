//! Request debugging middleware: tags every response with a request id and the time spent
//! handling it.

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use axum::body::Body;
use http::{HeaderValue, Request, Response};
use tower::Layer;

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";
pub(crate) const PROCESS_TIME_HEADER: &str = "x-process-time";

#[derive(Clone, Default)]
pub(crate) struct RequestDebugLayer;

impl<Service> Layer<Service> for RequestDebugLayer
where
    Service: Send + Clone,
{
    type Service = RequestDebugService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        RequestDebugService { next }
    }
}

#[derive(Clone)]
pub(crate) struct RequestDebugService<Service> {
    next: Service,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for RequestDebugService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: http_body::Body + Send + 'static,
{
    type Response = Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut next = self.next.clone();

        Box::pin(async move {
            let request_id = uuid::Uuid::new_v4().to_string();
            let method = req.method().clone();
            let path = req.uri().path().to_string();
            let start = Instant::now();

            log::debug!("Request {request_id}: {method} {path}");

            let result = next.call(req).await;
            let elapsed = start.elapsed().as_secs_f64();

            match result {
                Ok(mut response) => {
                    log::debug!(
                        "Response {request_id}: {method} {path} -> {} in {elapsed:.4}s",
                        response.status()
                    );

                    let headers = response.headers_mut();

                    if let Ok(value) = HeaderValue::from_str(&request_id) {
                        headers.insert(REQUEST_ID_HEADER, value);
                    }

                    if let Ok(value) = HeaderValue::from_str(&elapsed.to_string()) {
                        headers.insert(PROCESS_TIME_HEADER, value);
                    }

                    Ok(response)
                }
                Err(error) => {
                    log::error!("Request {request_id}: {method} {path} failed after {elapsed:.4}s: {error}");
                    Err(error)
                }
            }
        })
    }
}
