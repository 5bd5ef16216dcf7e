//! HTTP transport: GraphQL over hyper.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};

use crate::gql::{Context, Schema};

/// Dispatches one request. Every GraphQL request gets its own copy of `context`.
pub async fn route(req: Request<Body>, schema: Arc<Schema>, context: &Context) -> Response<Body> {
    log::debug!("{} {}", req.method(), req.uri().path());
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/graphiql") => juniper_hyper::graphiql("/graphql", None).await,
        (&Method::POST, "/") | (&Method::GET, "/graphql") | (&Method::POST, "/graphql") => {
            juniper_hyper::graphql(schema, Arc::new(context.clone()), req).await
        }
        _ => not_found(),
    }
}

fn not_found() -> Response<Body> {
    let mut response = Response::new(Body::from("Not Found"));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

/// Serves until the process receives Ctrl-C.
///
/// # Errors
///
/// Will return Err if the address cannot be bound or the server fails
pub async fn serve(
    addr: SocketAddr,
    schema: Arc<Schema>,
    context: Context,
) -> Result<(), hyper::Error> {
    let context = Arc::new(context);
    let new_service = make_service_fn(move |_| {
        let schema = schema.clone();
        let context = context.clone();
        async {
            Ok::<_, hyper::Error>(service_fn(move |req| {
                let schema = schema.clone();
                let context = context.clone();
                async move { Ok::<_, Infallible>(route(req, schema, &context).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)?.serve(new_service);
    log::info!("Listening on http://{}", addr);
    server
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
}
