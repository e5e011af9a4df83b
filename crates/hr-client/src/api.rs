//! Typed entry points over the executor.
//!
//! This is the `fetch(path, options)` contract made concrete for the tool
//! layer: each method builds the right [`RequestSpec`] (path, resource
//! class, operation label) and hands it to the executor. No formatting,
//! no tool registry; callers receive raw JSON or a classified error.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{ClientConfig, ResourceClass};
use crate::errors::ClassifiedError;
use crate::executor::{RequestExecutor, RequestSpec};
use crate::transport::{HttpTransport, Transport};

/// Client for the external HR data provider.
pub struct HrClient {
    executor: RequestExecutor,
}

impl HrClient {
    /// Create a client with the production HTTP transport.
    ///
    /// The API key is static for the process lifetime; there is no
    /// refresh flow.
    pub fn new(config: ClientConfig, api_key: impl Into<String>) -> Self {
        let transport = Arc::new(HttpTransport::new(
            config.base_url.clone(),
            api_key,
            config.request_timeout,
        ));
        Self::with_transport(config, transport)
    }

    /// Create a client over an arbitrary transport.
    ///
    /// Used by tests to substitute scripted transports.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            executor: RequestExecutor::new(transport, config),
        }
    }

    /// The full employee directory.
    pub async fn employee_directory(&self) -> Result<Value, ClassifiedError> {
        self.executor.execute(&directory_spec()).await
    }

    /// A single employee record, optionally restricted to named fields.
    pub async fn employee(&self, id: &str, fields: &[&str]) -> Result<Value, ClassifiedError> {
        self.executor.execute(&employee_spec(id, fields)).await
    }

    /// Who is out of office in the given date range (ISO dates).
    pub async fn whos_out(&self, start: &str, end: &str) -> Result<Value, ClassifiedError> {
        self.executor.execute(&whos_out_spec(start, end)).await
    }

    /// Time-off requests in the given date range, optionally filtered by
    /// status.
    pub async fn time_off_requests(
        &self,
        start: &str,
        end: &str,
        status: Option<&str>,
    ) -> Result<Value, ClassifiedError> {
        self.executor
            .execute(&time_off_spec(start, end, status))
            .await
    }

    /// Headcount and turnover figures for a reporting period.
    pub async fn workforce_analytics(&self, period: &str) -> Result<Value, ClassifiedError> {
        self.executor.execute(&analytics_spec(period)).await
    }

    /// Company metadata: fields, locations, divisions. Near-static.
    pub async fn company_info(&self) -> Result<Value, ClassifiedError> {
        self.executor.execute(&company_spec()).await
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.executor.clear_cache();
    }

    /// Admissions left in the current window for a class.
    pub fn remaining_budget(&self, class: ResourceClass) -> u32 {
        self.executor.remaining_budget(class)
    }
}

fn directory_spec() -> RequestSpec {
    RequestSpec {
        method: "GET".to_string(),
        path: "/employees/directory".to_string(),
        params: vec![],
        resource_class: ResourceClass::Employees,
        operation: "fetch the employee directory".to_string(),
        tool_name: "employee_directory".to_string(),
        deadline: None,
    }
}

fn employee_spec(id: &str, fields: &[&str]) -> RequestSpec {
    let mut params = vec![];
    if !fields.is_empty() {
        params.push(("fields".to_string(), fields.join(",")));
    }

    RequestSpec {
        method: "GET".to_string(),
        path: format!("/employees/{}", id),
        params,
        resource_class: ResourceClass::Employees,
        operation: format!("fetch employee {}", id),
        tool_name: "get_employee".to_string(),
        deadline: None,
    }
}

fn whos_out_spec(start: &str, end: &str) -> RequestSpec {
    RequestSpec {
        method: "GET".to_string(),
        path: "/time_off/whos_out".to_string(),
        params: vec![
            ("start".to_string(), start.to_string()),
            ("end".to_string(), end.to_string()),
        ],
        resource_class: ResourceClass::TimeOff,
        operation: format!("list who is out between {} and {}", start, end),
        tool_name: "whos_out".to_string(),
        deadline: None,
    }
}

fn time_off_spec(start: &str, end: &str, status: Option<&str>) -> RequestSpec {
    let mut params = vec![
        ("start".to_string(), start.to_string()),
        ("end".to_string(), end.to_string()),
    ];
    if let Some(status) = status {
        params.push(("status".to_string(), status.to_string()));
    }

    RequestSpec {
        method: "GET".to_string(),
        path: "/time_off/requests".to_string(),
        params,
        resource_class: ResourceClass::TimeOff,
        operation: format!("list time-off requests between {} and {}", start, end),
        tool_name: "time_off_requests".to_string(),
        deadline: None,
    }
}

fn analytics_spec(period: &str) -> RequestSpec {
    RequestSpec {
        method: "GET".to_string(),
        path: "/reports/workforce".to_string(),
        params: vec![("period".to_string(), period.to_string())],
        resource_class: ResourceClass::Analytics,
        operation: format!("run workforce analytics for {}", period),
        tool_name: "workforce_analytics".to_string(),
        deadline: None,
    }
}

fn company_spec() -> RequestSpec {
    RequestSpec {
        method: "GET".to_string(),
        path: "/meta/company".to_string(),
        params: vec![],
        resource_class: ResourceClass::Company,
        operation: "fetch company metadata".to_string(),
        tool_name: "company_info".to_string(),
        deadline: None,
    }
}
