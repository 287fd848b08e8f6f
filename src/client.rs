//! Blocking HTTP client for the Braintrust REST API.
//!
//! Two pagination styles are in play: listings page with `starting_after`
//! (the last id of the previous page) and stop on a short page, while event
//! fetches follow the `cursor` token the server hands back until it omits
//! one.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{ExportError, Result};

/// The two exportable object kinds tracked under a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Experiment,
    Dataset,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 2] = [ObjectKind::Experiment, ObjectKind::Dataset];

    /// API path segment, also used as the output subdirectory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Experiment => "experiment",
            ObjectKind::Dataset => "dataset",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the target project was specified on the command line.
#[derive(Debug, Clone)]
pub enum ProjectSelector {
    Id(String),
    Name(String),
}

impl ProjectSelector {
    /// Exactly one of id/name must be given. Validated before any network
    /// activity.
    pub fn from_options(
        project_id: Option<String>,
        project_name: Option<String>,
    ) -> Result<Self> {
        match (project_id, project_name) {
            (Some(id), None) => Ok(ProjectSelector::Id(id)),
            (None, Some(name)) => Ok(ProjectSelector::Name(name)),
            (Some(_), Some(_)) => Err(ExportError::InvalidArguments {
                message: "--project-id and --project-name are mutually exclusive".to_string(),
            }),
            (None, None) => Err(ExportError::InvalidArguments {
                message: "one of --project-id or --project-name is required".to_string(),
            }),
        }
    }
}

/// A listed project, experiment, or dataset. The API returns more fields;
/// only id and name matter here.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiObject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    objects: Vec<ApiObject>,
}

#[derive(Debug, Deserialize)]
struct EventPage {
    #[serde(default)]
    events: Vec<Map<String, Value>>,
    #[serde(default)]
    cursor: Option<String>,
}

pub struct BraintrustClient {
    http: Client,
    api_url: String,
    api_key: String,
    list_page_limit: usize,
    event_page_limit: usize,
}

impl BraintrustClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            list_page_limit: config.list_page_limit,
            event_page_limit: config.event_page_limit,
        })
    }

    /// Single GET, bearer-authed, any non-2xx is fatal.
    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.api_url, path);
        debug!("GET {} params={:?}", url, params);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(params)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExportError::Http {
                message: format!("GET {} returned {}", url, status),
            });
        }
        let body = resp.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Collect every page of a listing endpoint. A page shorter than the
    /// requested limit terminates the walk.
    fn list_paged(&self, path: &str, extra: &[(String, String)]) -> Result<Vec<ApiObject>> {
        let limit = self.list_page_limit;
        let mut all = Vec::new();
        let mut starting_after: Option<String> = None;
        loop {
            let mut params = vec![("limit".to_string(), limit.to_string())];
            params.extend_from_slice(extra);
            if let Some(after) = &starting_after {
                params.push(("starting_after".to_string(), after.clone()));
            }
            let page: ListPage = self.get_json(path, &params)?;
            let count = page.objects.len();
            let last_id = page.objects.last().map(|o| o.id.clone());
            all.extend(page.objects);
            if count < limit {
                break;
            }
            match last_id {
                Some(id) => starting_after = Some(id),
                None => break,
            }
        }
        Ok(all)
    }

    pub fn list_projects(&self) -> Result<Vec<ApiObject>> {
        self.list_paged("project", &[])
    }

    pub fn list_objects(&self, kind: ObjectKind, project_id: &str) -> Result<Vec<ApiObject>> {
        let filter = [("project_id".to_string(), project_id.to_string())];
        self.list_paged(kind.as_str(), &filter)
    }

    /// Map a selector to a project id. Ids pass through untouched; names are
    /// resolved by a case-sensitive exact match over the project listing.
    pub fn resolve_project(&self, selector: &ProjectSelector) -> Result<String> {
        match selector {
            ProjectSelector::Id(id) => Ok(id.clone()),
            ProjectSelector::Name(name) => {
                let projects = self.list_projects()?;
                projects
                    .iter()
                    .find(|p| p.name.as_deref() == Some(name.as_str()))
                    .map(|p| p.id.clone())
                    .ok_or_else(|| ExportError::ProjectNotFound { name: name.clone() })
            }
        }
    }

    /// Fetch every event of one experiment or dataset, following the cursor
    /// until the server omits it or sends an empty page.
    pub fn fetch_events(
        &self,
        kind: ObjectKind,
        object_id: &str,
    ) -> Result<Vec<Map<String, Value>>> {
        let path = format!("{}/{}/fetch", kind.as_str(), object_id);
        let mut events = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut params = vec![("limit".to_string(), self.event_page_limit.to_string())];
            if let Some(c) = &cursor {
                params.push(("cursor".to_string(), c.clone()));
            }
            let page: EventPage = self.get_json(&path, &params)?;
            let empty = page.events.is_empty();
            events.extend(page.events);
            match page.cursor {
                Some(next) if !empty && !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }
        Ok(events)
    }
}
