use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{body::Body, response::IntoResponse};
use clients::{Authenticator, Endpoint, can_access_endpoint};
use http::{Request, Response};
use llm::LlmError;
use tower::Layer;

use super::credentials;

/// Authenticates the client from its credential headers and checks it may call `endpoint`.
/// On success the client record is inserted into the request extensions as
/// `Arc<ClientRecord>`.
#[derive(Clone)]
pub(crate) struct ClientAuthLayer(Arc<ClientAuthLayerInner>);

struct ClientAuthLayerInner {
    authenticator: Authenticator,
    endpoint: Endpoint,
}

impl ClientAuthLayer {
    pub fn new(authenticator: Authenticator, endpoint: Endpoint) -> Self {
        Self(Arc::new(ClientAuthLayerInner { authenticator, endpoint }))
    }
}

impl<Service> Layer<Service> for ClientAuthLayer
where
    Service: Send + Clone,
{
    type Service = ClientAuthService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        ClientAuthService {
            next,
            layer: self.0.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct ClientAuthService<Service> {
    next: Service,
    layer: Arc<ClientAuthLayerInner>,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for ClientAuthService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: http_body::Body + Send + 'static,
{
    type Response = http::Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut next = self.next.clone();
        let layer = self.layer.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            let Some(credentials) = credentials::extract(&parts.headers) else {
                log::debug!("Request to {} without client credentials", parts.uri.path());
                return Ok(LlmError::Unauthorized.into_response());
            };

            let client = match layer
                .authenticator
                .authenticate(&credentials.client_id, &credentials.secret)
            {
                Ok(client) => client,
                Err(_) => return Ok(LlmError::Unauthorized.into_response()),
            };

            if !can_access_endpoint(&client, layer.endpoint) {
                log::warn!(
                    "Client {} does not have permission to access endpoint {}",
                    client.client_id,
                    layer.endpoint
                );

                return Ok(LlmError::EndpointForbidden(layer.endpoint).into_response());
            }

            parts.extensions.insert(client);

            next.call(Request::from_parts(parts, body)).await
        })
    }
}
