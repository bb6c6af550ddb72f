// ── Data sources ──
//
// Read-only lookups: list every object of a type matching plain field
// filters and extensible attribute filters.

use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use nios_api::{ListQuery, WapiClient, WireObject};

use super::{Outcome, WapiObject};
use crate::diagnostics::Diagnostics;
use crate::error::CoreError;
use crate::model::AttributeMap;

/// Search criteria for a data source read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceQuery {
    /// Exact-match filters on object fields, e.g. `network_view`.
    #[serde(default)]
    pub filters: IndexMap<String, String>,
    /// Exact-match filters on extensible attributes.
    #[serde(default)]
    pub extattrfilters: IndexMap<String, String>,
}

impl DataSourceQuery {
    fn to_list_query(&self) -> ListQuery {
        let query = self
            .filters
            .iter()
            .fold(ListQuery::new(), |q, (field, value)| q.filter(field, value));
        self.extattrfilters
            .iter()
            .fold(query, |q, (name, value)| q.ext_attr(name, value))
    }
}

/// List lookups for one object type.
pub struct ObjectDataSource<O> {
    client: Arc<WapiClient>,
    _object: PhantomData<fn() -> O>,
}

impl<O> Clone for ObjectDataSource<O> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            _object: PhantomData,
        }
    }
}

impl<O: WapiObject> ObjectDataSource<O> {
    pub fn new(client: Arc<WapiClient>) -> Self {
        Self {
            client,
            _object: PhantomData,
        }
    }

    /// Every matching object. Each result exposes all of its extensible
    /// attributes, since a data source has no declared subset to filter by.
    pub async fn read(&self, query: &DataSourceQuery) -> Outcome<Vec<O>> {
        let mut diags = Diagnostics::new();
        let object_type = <O::Wire as WireObject>::OBJECT_TYPE;

        let found = match self.client.list::<O::Wire>(&query.to_list_query()).await {
            Ok(found) => found,
            Err(e) => {
                diags.push(
                    CoreError::from(e).to_diagnostic(&format!("Failed to list {object_type}")),
                );
                return Outcome::failed(diags);
            }
        };
        debug!(object = object_type, count = found.len(), "data source results");

        let mut results = Vec::with_capacity(found.len());
        for wire in found {
            let raw_attrs = wire.ext_attrs().cloned();
            let mut model = O::flatten(wire, &mut diags);
            if O::SUPPORTS_EXT_ATTRS {
                if let Some(raw) = raw_attrs {
                    match AttributeMap::from_wire(&raw, &mut diags) {
                        Ok(all) => model.set_ext_attrs(Some(all.clone()), Some(all)),
                        Err(e) => diags.push(e),
                    }
                }
            }
            results.push(model);
        }

        Outcome::new(results, diags)
    }
}
