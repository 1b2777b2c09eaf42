//! Azure Resource Manager backend
//!
//! Reads and replaces route tables through the management REST API:
//! ```text
//! GET/PUT {endpoint}/subscriptions/{sub}/resourceGroups/{rg}
//!         /providers/Microsoft.Network/routeTables/{name}?api-version=2023-09-01
//! ```
//! Writes carry the etag from the read in `If-Match`, so a table changed by
//! someone else in between is reported as a conflict instead of overwritten.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use udr_core::{CloudEnvironment, NextHopType, Route, RouteTable, RouteTableBackend, TableRef};

use crate::splice::splice_routes;
use crate::{Error, Result};

/// Network resource provider API version
pub const API_VERSION: &str = "2023-09-01";

/// Default timeout for each management request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("udr-sync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize, Deserialize)]
struct ArmRoute {
    name: String,
    properties: ArmRouteProperties,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArmRouteProperties {
    address_prefix: String,
    next_hop_type: NextHopType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_hop_ip_address: Option<String>,
}

impl From<ArmRoute> for Route {
    fn from(route: ArmRoute) -> Self {
        Route {
            name: route.name,
            address_prefix: route.properties.address_prefix,
            next_hop_type: route.properties.next_hop_type,
            next_hop_ip_address: route.properties.next_hop_ip_address,
        }
    }
}

impl From<&Route> for ArmRoute {
    fn from(route: &Route) -> Self {
        ArmRoute {
            name: route.name.clone(),
            properties: ArmRouteProperties {
                address_prefix: route.address_prefix.clone(),
                next_hop_type: route.next_hop_type.clone(),
                next_hop_ip_address: route.next_hop_ip_address.clone(),
            },
        }
    }
}

fn read_route(raw: &Value) -> Option<Route> {
    serde_json::from_value::<ArmRoute>(raw.clone())
        .ok()
        .map(Route::from)
}

fn write_route(route: &Route) -> Result<Value> {
    serde_json::to_value(ArmRoute::from(route))
        .map_err(|e| Error::json(format!("route {}", route.name), e))
}

/// Route tables managed through the Azure Resource Manager API
#[derive(Debug, Clone)]
pub struct ArmBackend {
    client: Client,
    endpoint: String,
    subscription_id: String,
    access_token: String,
}

impl ArmBackend {
    /// Creates a backend for `subscription_id` on `cloud`'s management endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSetting`] for an empty subscription or token,
    /// and [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(
        cloud: CloudEnvironment,
        subscription_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        let subscription_id = subscription_id.into();
        let access_token = access_token.into();
        if subscription_id.trim().is_empty() {
            return Err(Error::MissingSetting {
                name: "subscription",
            });
        }
        if access_token.trim().is_empty() {
            return Err(Error::MissingSetting {
                name: "access token",
            });
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| Error::Http {
                url: "<client>".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            endpoint: cloud.management_endpoint().to_string(),
            subscription_id,
            access_token,
        })
    }

    /// Talk to another management endpoint (sovereign proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Resource URL of `table`, including the API version.
    pub fn table_url(&self, table: &TableRef) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/routeTables/{}?api-version={}",
            self.endpoint, self.subscription_id, table.resource_group, table.route_table, API_VERSION
        )
    }

    fn check(&self, table: &TableRef, url: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                table: table.to_string(),
            }),
            StatusCode::PRECONDITION_FAILED => Err(Error::Conflict {
                table: table.to_string(),
            }),
            _ => Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            }),
        }
    }

    fn get_document(&self, table: &TableRef) -> Result<Value> {
        let url = self.table_url(table);
        debug!(%table, %url, "Reading route table");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|source| Error::Http {
                url: url.clone(),
                source,
            })?;
        let response = self.check(table, &url, response)?;
        response.json().map_err(|source| Error::Http { url, source })
    }

    fn fetch_table(&self, table: &TableRef) -> Result<RouteTable> {
        let document = self.get_document(table)?;
        let origin = self.table_url(table);

        let routes = match document.pointer("/properties/routes") {
            None | Some(Value::Null) => Vec::new(),
            Some(routes) => serde_json::from_value::<Vec<ArmRoute>>(routes.clone())
                .map_err(|e| Error::json(origin.clone(), e))?
                .into_iter()
                .map(Route::from)
                .collect(),
        };
        let routes = RouteTable::new(routes).map_err(|e| Error::Malformed {
            origin,
            message: e.to_string(),
        })?;

        let etag = document
            .get("etag")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(routes.with_etag(etag))
    }

    fn commit_table(&self, table: &TableRef, routes: &RouteTable) -> Result<()> {
        let mut document = self.get_document(table)?;
        let url = self.table_url(table);

        let existing = match document.pointer("/properties/routes") {
            Some(Value::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        let spliced = splice_routes(&existing, routes.routes(), read_route, write_route)?;

        let Some(object) = document.as_object_mut() else {
            return Err(Error::Malformed {
                origin: url,
                message: "resource is not a JSON object".to_string(),
            });
        };
        let properties = object
            .entry("properties")
            .or_insert_with(|| Value::Object(Default::default()));
        match properties.as_object_mut() {
            Some(properties) => {
                properties.insert("routes".to_string(), Value::Array(spliced));
            }
            None => {
                return Err(Error::Malformed {
                    origin: url,
                    message: "`properties` is not an object".to_string(),
                });
            }
        }

        let mut request = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&document);
        if let Some(etag) = &routes.etag {
            request = request.header("If-Match", etag);
        }
        let response = request.send().map_err(|source| Error::Http {
            url: url.clone(),
            source,
        })?;
        self.check(table, &url, response)?;

        info!(%table, routes = routes.len(), "Replaced route table");
        Ok(())
    }
}

impl RouteTableBackend for ArmBackend {
    fn fetch(&self, table: &TableRef) -> udr_core::Result<RouteTable> {
        Ok(self.fetch_table(table)?)
    }

    fn commit(&self, table: &TableRef, routes: &RouteTable) -> udr_core::Result<()> {
        Ok(self.commit_table(table, routes)?)
    }
}
