//! Backend collections and the paths they are reached under.
//!
//! Routes are relative segment lists so adapters can append them to an API
//! base URL that already carries a prefix such as `/api/`. Record ids stay a
//! single segment no matter which characters they contain.

use fleetdesk_api_models::{RecordId, RouteStyle};

/// HTTP verb of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// `GET`.
    Get,
    /// `POST`.
    Post,
    /// `PUT`.
    Put,
    /// `DELETE`.
    Delete,
}

/// Verb plus relative path segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    /// HTTP verb.
    pub method: RouteMethod,
    segments: Vec<String>,
}

impl Route {
    fn new(method: RouteMethod, path: &str) -> Self {
        Self {
            method,
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    fn with_id(mut self, id: &RecordId) -> Self {
        self.segments.push(id.to_string());
        self
    }

    /// Unencoded segments, one per path component.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments joined with `/`, for logs and assertions only.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

/// Path of the shared bulk status endpoint.
pub const BULK_STATUS_PATH: &str = "bulk-operations/users/update-status";

/// A backend-owned collection such as `drivers` or `zones`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Resource {
    name: String,
    style: RouteStyle,
    bulk_name: Option<String>,
}

impl Resource {
    /// Resource following `style`.
    #[must_use]
    pub fn new(name: impl Into<String>, style: RouteStyle) -> Self {
        Self {
            name: name.into().trim_matches('/').to_string(),
            style,
            bulk_name: None,
        }
    }

    /// `GET drivers`, `PUT drivers/<id>`, ...
    #[must_use]
    pub fn rest(name: impl Into<String>) -> Self {
        Self::new(name, RouteStyle::Rest)
    }

    /// `GET zones/zones-list`, `POST zones/zones-update/<id>`, ...
    #[must_use]
    pub fn suffixed(name: impl Into<String>) -> Self {
        Self::new(name, RouteStyle::Suffixed)
    }

    /// Use a different segment under `bulk-operations/`.
    #[must_use]
    pub fn with_bulk_name(mut self, bulk_name: impl Into<String>) -> Self {
        self.bulk_name = Some(bulk_name.into());
        self
    }

    /// Collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route convention.
    #[must_use]
    pub const fn style(&self) -> RouteStyle {
        self.style
    }

    /// Route returning the `{success, data: [...]}` list.
    #[must_use]
    pub fn list_route(&self) -> Route {
        match self.style {
            RouteStyle::Rest => Route::new(RouteMethod::Get, &self.name),
            RouteStyle::Suffixed => Route::new(RouteMethod::Get, &self.suffixed_path("list")),
        }
    }

    /// Route creating one row.
    #[must_use]
    pub fn create_route(&self) -> Route {
        match self.style {
            RouteStyle::Rest => Route::new(RouteMethod::Post, &self.name),
            RouteStyle::Suffixed => Route::new(RouteMethod::Post, &self.suffixed_path("save")),
        }
    }

    /// Route updating row `id`.
    #[must_use]
    pub fn update_route(&self, id: &RecordId) -> Route {
        let route = match self.style {
            RouteStyle::Rest => Route::new(RouteMethod::Put, &self.name),
            RouteStyle::Suffixed => Route::new(RouteMethod::Post, &self.suffixed_path("update")),
        };
        route.with_id(id)
    }

    /// Route deleting row `id`.
    #[must_use]
    pub fn delete_route(&self, id: &RecordId) -> Route {
        let route = match self.style {
            RouteStyle::Rest => Route::new(RouteMethod::Delete, &self.name),
            RouteStyle::Suffixed => Route::new(RouteMethod::Post, &self.suffixed_path("delete")),
        };
        route.with_id(id)
    }

    /// Route deleting many rows at once.
    #[must_use]
    pub fn bulk_delete_route(&self) -> Route {
        let segment = self.bulk_name.as_deref().unwrap_or(&self.name);
        Route::new(
            RouteMethod::Post,
            &format!("bulk-operations/{segment}/delete"),
        )
    }

    /// Route updating account status in bulk; shared by every user-like resource.
    #[must_use]
    pub fn bulk_status_route() -> Route {
        Route::new(RouteMethod::Post, BULK_STATUS_PATH)
    }

    fn suffixed_path(&self, action: &str) -> String {
        let leaf = self.name.rsplit('/').next().unwrap_or(&self.name);
        format!("{}/{leaf}-{action}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_routes_follow_collection_paths() {
        let drivers = Resource::rest("/drivers/");
        let id = RecordId::Int(12);
        assert_eq!(
            drivers.list_route(),
            Route::new(RouteMethod::Get, "drivers")
        );
        assert_eq!(drivers.update_route(&id).method, RouteMethod::Put);
        assert_eq!(drivers.update_route(&id).path(), "drivers/12");
        assert_eq!(drivers.delete_route(&id).method, RouteMethod::Delete);
        assert_eq!(
            drivers.bulk_delete_route().path(),
            "bulk-operations/drivers/delete"
        );
    }

    #[test]
    fn suffixed_routes_append_action_names() {
        let zones = Resource::suffixed("zones");
        let id = RecordId::from("z-1");
        assert_eq!(zones.list_route().path(), "zones/zones-list");
        assert_eq!(zones.create_route().path(), "zones/zones-save");
        assert_eq!(zones.update_route(&id).path(), "zones/zones-update/z-1");
        assert_eq!(zones.update_route(&id).method, RouteMethod::Post);
        assert_eq!(zones.delete_route(&id).path(), "zones/zones-delete/z-1");
        assert_eq!(zones.delete_route(&id).method, RouteMethod::Post);
    }

    #[test]
    fn record_ids_stay_one_segment() {
        let route = Resource::rest("drivers").delete_route(&RecordId::from("../users/1"));
        assert_eq!(route.segments(), ["drivers", "../users/1"]);
        let nested = Resource::suffixed("support/chats").update_route(&RecordId::Int(4));
        assert_eq!(nested.segments(), ["support", "chats", "chats-update", "4"]);
    }

    #[test]
    fn bulk_routes_use_override_and_shared_status_path() {
        let keywords = Resource::rest("language-keywords").with_bulk_name("keywords");
        assert_eq!(
            keywords.bulk_delete_route().path(),
            "bulk-operations/keywords/delete"
        );
        assert_eq!(
            Resource::bulk_status_route().path(),
            "bulk-operations/users/update-status"
        );
    }
}
