use crate::error::{RedfishError, Result};
use crate::resource::Resource;
use crate::RedfishApi;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;

/// Unresolved reference to another resource of type `T`.
///
/// Captured at decode time from either `{"@odata.id": ...}` or the legacy
/// `{"href": ...}` form. A missing, `null` or empty reference decodes to an
/// unset link, which follows to nothing.
pub struct Link<T> {
    path: Option<String>,
    kind: PhantomData<fn() -> T>,
}

impl<T> Link<T> {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: (!path.is_empty()).then_some(path),
            kind: PhantomData,
        }
    }

    pub fn unset() -> Self {
        Self {
            path: None,
            kind: PhantomData,
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.path.is_some()
    }

    /// Link to a sub-path of this one, e.g. `<smart storage>/ArrayControllers/`.
    pub fn join<U>(&self, segment: &str) -> Link<U> {
        match &self.path {
            Some(base) if base.ends_with('/') => Link::new(format!("{base}{segment}")),
            Some(base) => Link::new(format!("{base}/{segment}")),
            None => Link::unset(),
        }
    }

    /// Fallback to `other` when this link is unset.
    pub fn or(self, other: Link<T>) -> Link<T> {
        if self.is_set() {
            self
        } else {
            other
        }
    }
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            kind: PhantomData,
        }
    }
}

impl<T> Default for Link<T> {
    fn default() -> Self {
        Self::unset()
    }
}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<T> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Link({path})"),
            None => f.write_str("Link(unset)"),
        }
    }
}

#[derive(Deserialize)]
struct RawLink {
    #[serde(rename = "@odata.id", default)]
    id: Option<String>,
    #[serde(default)]
    href: Option<String>,
}

impl<'de, T> Deserialize<'de> for Link<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawLink>::deserialize(deserializer)?;
        let path = raw.and_then(|r| r.id.filter(|id| !id.is_empty()).or(r.href));
        Ok(match path {
            Some(path) => Link::new(path),
            None => Link::unset(),
        })
    }
}

impl<T: Resource> Link<T> {
    /// Fetch and decode the referenced resource; an unset link yields `None`.
    pub async fn follow(&self, api: &dyn RedfishApi) -> Result<Option<T>> {
        let Some(path) = self.path() else {
            return Ok(None);
        };
        let document = api.get(path).await?;
        let resource = serde_json::from_value(document)
            .map_err(|source| RedfishError::decode(path, source))?;
        Ok(Some(resource))
    }
}

/// Resource collection document.
///
/// Accepts the standard `Members` array and the legacy HPE
/// `links.Member` array.
#[derive(Debug, Deserialize)]
#[serde(bound = "")]
pub struct Collection<T> {
    #[serde(rename = "Members", default, deserialize_with = "crate::resource::nullable_vec")]
    members: Vec<Link<T>>,
    #[serde(rename = "links", default)]
    legacy: LegacyMembers<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "")]
struct LegacyMembers<T> {
    #[serde(rename = "Member", default)]
    member: Vec<Link<T>>,
}

impl<T> Default for LegacyMembers<T> {
    fn default() -> Self {
        Self { member: Vec::new() }
    }
}

impl<T> Collection<T> {
    pub fn into_links(self) -> Vec<Link<T>> {
        let links = if self.members.is_empty() {
            self.legacy.member
        } else {
            self.members
        };
        links.into_iter().filter(Link::is_set).collect()
    }
}

/// Members of a collection that could be fetched, plus the ones that failed.
#[derive(Debug)]
pub struct Members<T> {
    pub resources: Vec<T>,
    pub failures: Vec<(String, RedfishError)>,
}

impl<T> Default for Members<T> {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T: Resource> Link<Collection<T>> {
    /// Fetch the collection and return its member links, unresolved.
    pub async fn members(&self, api: &dyn RedfishApi) -> Result<Vec<Link<T>>> {
        let Some(path) = self.path() else {
            return Ok(Vec::new());
        };
        let collection: Collection<T> = decode(path, api.get(path).await?)?;
        Ok(collection.into_links())
    }

    /// Fetch the collection and every member in turn.
    ///
    /// Only the collection document itself is fatal; member failures are
    /// recorded in [`Members::failures`].
    pub async fn list(&self, api: &dyn RedfishApi) -> Result<Members<T>> {
        let mut members = Members::default();
        for link in self.members(api).await? {
            let path = link.path().unwrap_or_default().to_string();
            match link.follow(api).await {
                Ok(Some(resource)) => members.resources.push(resource),
                Ok(None) => {}
                Err(e) => members.failures.push((path, e)),
            }
        }
        Ok(members)
    }
}

fn decode<T: DeserializeOwned>(path: &str, document: serde_json::Value) -> Result<T> {
    serde_json::from_value(document).map_err(|source| RedfishError::decode(path, source))
}
