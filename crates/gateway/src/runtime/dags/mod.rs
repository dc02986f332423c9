//! DAG lifecycle — create, fetch, update, and delete cadence workflow
//! files for the external scheduler.
//!
//! Split into submodules:
//! - [`model`] — request kinds and body validation
//! - [`template`] — request → Dagu YAML document rendering
//! - [`store`] — filesystem-backed document store

pub mod model;
pub mod store;
pub mod template;

pub use model::{CadenceEventRequest, RequestType, ScheduleInput};
pub use store::DagStore;
pub use template::{build_document, DagDocument, DagStep, DocumentSchedule};

use std::sync::Arc;

use serde::Serialize;

use cadence_domain::config::Config;
use cadence_domain::{Error, Result};

/// DAG name `<contract_uuid>-<acronym>`, short enough for the
/// scheduler's 40-character name limit.
pub fn dag_name(contract_uuid: &str, request_type: RequestType) -> String {
    format!("{contract_uuid}-{}", request_type.acronym())
}

/// Outcome of a create or update, echoed back to the caller.
#[derive(Clone, Debug, Serialize)]
pub struct DagWriteOutcome {
    pub contract_uuid: String,
    pub file_path: String,
    pub dag_name: String,
}

/// A fetched DAG in both raw and parsed form.
#[derive(Clone, Debug, Serialize)]
pub struct DagFetch {
    pub contract_uuid: String,
    pub dag_name: String,
    pub yaml_content: String,
    pub parsed_data: DagDocument,
}

/// Coordinates validation, schedule normalization, templating, and the
/// file store. One instance lives in [`crate::state::AppState`].
#[derive(Debug)]
pub struct DagService {
    config: Arc<Config>,
    store: DagStore,
}

impl DagService {
    pub fn new(config: Arc<Config>) -> Self {
        let store = DagStore::new(&config.store.dag_dir);
        Self { config, store }
    }

    pub async fn create(&self, req: &CadenceEventRequest) -> Result<DagWriteOutcome> {
        req.validate()?;

        let name = dag_name(&req.contract_uuid, req.request_type);
        if self.store.exists(&name).await {
            return Err(Error::Validation(format!(
                "DAG with name {name} already exists"
            )));
        }

        let document = template::build_document(req, &self.config, &name)?;
        self.store.write(&name, &document.render()?).await?;
        tracing::info!(
            dag_name = %name,
            request_type = %req.request_type,
            timezone = %req.contract_timezone,
            "created DAG"
        );

        Ok(self.write_outcome(&req.contract_uuid, name))
    }

    pub async fn fetch(&self, contract_uuid: &str, request_type: RequestType) -> Result<DagFetch> {
        let name = dag_name(contract_uuid, request_type);
        if !self.store.exists(&name).await {
            return Err(Error::NotFound(format!("DAG with name {name} not found")));
        }

        let yaml_content = self.store.read(&name).await?;
        let parsed_data = DagDocument::parse(&yaml_content)?;

        Ok(DagFetch {
            contract_uuid: contract_uuid.to_string(),
            dag_name: name,
            yaml_content,
            parsed_data,
        })
    }

    /// Re-render and overwrite an existing DAG. The body's contract UUID
    /// must match the one addressed in the URL.
    pub async fn update(
        &self,
        contract_uuid: &str,
        req: &CadenceEventRequest,
    ) -> Result<DagWriteOutcome> {
        req.validate()?;

        if req.contract_uuid != contract_uuid {
            return Err(Error::Validation(
                "Contract UUID in request body must match URL parameter".into(),
            ));
        }

        let name = dag_name(contract_uuid, req.request_type);
        if !self.store.exists(&name).await {
            return Err(Error::NotFound(format!("DAG with name {name} not found")));
        }

        let document = template::build_document(req, &self.config, &name)?;
        self.store.write(&name, &document.render()?).await?;
        tracing::info!(dag_name = %name, "updated DAG");

        Ok(self.write_outcome(contract_uuid, name))
    }

    pub async fn remove(&self, contract_uuid: &str, request_type: RequestType) -> Result<String> {
        let name = dag_name(contract_uuid, request_type);
        if !self.store.exists(&name).await {
            return Err(Error::NotFound(format!("DAG with name {name} not found")));
        }

        self.store.remove(&name).await?;
        tracing::info!(dag_name = %name, "deleted DAG");
        Ok(name)
    }

    fn write_outcome(&self, contract_uuid: &str, dag_name: String) -> DagWriteOutcome {
        DagWriteOutcome {
            contract_uuid: contract_uuid.to_string(),
            file_path: self.store.file_path(&dag_name).display().to_string(),
            dag_name,
        }
    }
}
