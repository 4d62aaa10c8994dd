//! In-process HTTP harness for the contacts routes.
//!
//! The harness owns an Actix `SystemRunner` so synchronous BDD steps can
//! drive async requests. Each request initialises a fresh app around the
//! same shared state, so stored contacts persist across steps.

use std::sync::Arc;

use actix_web::rt::{System, SystemRunner};
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use serde_json::Value;

use api_protocol::Trace;
use api_protocol::config::ProtocolConfig;
use api_protocol::domain::TRACE_ID_HEADER;
use api_protocol::inbound::http::contacts;
use api_protocol::inbound::http::{HttpState, HttpStatePorts, route_not_found};
use api_protocol::outbound::InMemoryContactsRepository;

use crate::doubles::{MutableClock, RecordingSink};

/// Status, trace header and JSON body of one response.
#[derive(Debug, Clone)]
pub(crate) struct Captured {
    pub(crate) status: u16,
    pub(crate) trace_header: Option<String>,
    pub(crate) body: Value,
}

pub(crate) struct HttpHarness {
    runner: SystemRunner,
    state: web::Data<HttpState>,
}

impl HttpHarness {
    pub(crate) fn new(
        config: &ProtocolConfig,
        clock: Arc<MutableClock>,
        sink: Arc<RecordingSink>,
    ) -> Self {
        let state = HttpState::build(
            config,
            HttpStatePorts {
                contacts: Arc::new(InMemoryContactsRepository::new()),
                clock,
                sink,
            },
        )
        .expect("state builds");
        Self {
            runner: System::new(),
            state: web::Data::new(state),
        }
    }

    pub(crate) fn send(&self, request: TestRequest) -> Captured {
        let state = self.state.clone();
        self.runner.block_on(async move {
            let app = actix_test::init_service(
                App::new()
                    .app_data(state)
                    .wrap(Trace)
                    .service(web::scope("/api/v1").configure(contacts::configure))
                    .default_service(web::to(route_not_found)),
            )
            .await;
            let response = actix_test::call_service(&app, request.to_request()).await;
            let status = response.status().as_u16();
            let trace_header = response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body: Value = actix_test::read_body_json(response).await;
            Captured {
                status,
                trace_header,
                body,
            }
        })
    }
}
