//! Server construction and middleware wiring.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;

use api_protocol::Trace;
use api_protocol::config::ProtocolConfig;
#[cfg(debug_assertions)]
use api_protocol::doc::ApiDoc;
use api_protocol::inbound::http::contacts;
use api_protocol::inbound::http::{HttpState, HttpStatePorts, route_not_found};
use api_protocol::outbound::{InMemoryContactsRepository, TracingSink};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1").configure(contacts::configure);

    let app = App::new()
        .app_data(http_state)
        .wrap(Trace)
        .service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(route_not_found))
}

/// Construct an Actix HTTP server serving the contacts resource.
///
/// # Errors
/// Propagates [`std::io::Error`] when wiring the state, binding the socket or
/// starting the server fails.
pub fn create_server(config: &ProtocolConfig) -> std::io::Result<Server> {
    let state = HttpState::build(
        config,
        HttpStatePorts {
            contacts: Arc::new(InMemoryContactsRepository::new()),
            clock: Arc::new(DefaultClock),
            sink: Arc::new(TracingSink::new()),
        },
    )
    .map_err(|err| std::io::Error::other(format!("error catalogue rejected codes: {err}")))?;
    let http_state = web::Data::new(state);
    let bind_addr: SocketAddr = config.bind_addr();

    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(bind_addr)?
        .run();
    Ok(server)
}
