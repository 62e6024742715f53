#![allow(dead_code)]

use mixpanel_core::OperationParams;
use mixpanel_domain::{Config, Credentials, EndpointOverrides};
use mixpanel_infra::MixpanelService;
use serde_json::Value;
use wiremock::{MockServer, Request};

pub const TOKEN: &str = "test-token";
pub const SECRET: &str = "test-secret";
pub const PROJECT_ID: &str = "12345";

/// Configuration pointing every API family at `server`, with short backoff.
pub fn config_for(server: &MockServer) -> Config {
    let credentials = Credentials::new(TOKEN, SECRET).with_project_id(PROJECT_ID);
    let mut config = Config::new(credentials);
    config.endpoints = EndpointOverrides::all(server.uri());
    config.retry.base_delay_ms = 10;
    config
}

pub fn service(config: &Config) -> MixpanelService {
    MixpanelService::from_config(config).expect("service should build")
}

pub fn params(value: Value) -> OperationParams {
    OperationParams::from_value(value)
}

pub fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body should be JSON")
}

pub fn form_body(request: &Request) -> Vec<(String, String)> {
    url::form_urlencoded::parse(&request.body).into_owned().collect()
}

pub async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.expect("request recording enabled")
}
