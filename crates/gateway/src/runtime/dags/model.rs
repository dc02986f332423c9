//! Cadence event request model — request kinds and body validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cadence_domain::{Error, Result};

use super::template::DagStep;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request kinds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The four cadence workflow kinds this service manages.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    SeatLicense,
    SeatLicenseDaily,
    GenerateInvoice,
    ProcessContractEvents,
}

impl RequestType {
    /// Short acronym used in DAG names (keeps them inside the scheduler's
    /// 40-character name limit).
    pub fn acronym(&self) -> &'static str {
        match self {
            Self::SeatLicense => "sl",
            Self::SeatLicenseDaily => "sd",
            Self::GenerateInvoice => "gi",
            Self::ProcessContractEvents => "pce",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeatLicense => "seat_license",
            Self::SeatLicenseDaily => "seat_license_daily",
            Self::GenerateInvoice => "generate_invoice",
            Self::ProcessContractEvents => "process_contract_events",
        }
    }

    /// Parse a URL path segment. Accepts snake_case and kebab-case
    /// (`seat-license`), since callers send both.
    pub fn from_path_segment(segment: &str) -> Result<Self> {
        match segment.replace('-', "_").as_str() {
            "seat_license" => Ok(Self::SeatLicense),
            "seat_license_daily" => Ok(Self::SeatLicenseDaily),
            "generate_invoice" => Ok(Self::GenerateInvoice),
            "process_contract_events" => Ok(Self::ProcessContractEvents),
            other => Err(Error::Validation(format!("Unknown request type: {other}"))),
        }
    }

    /// The per-widget kinds that also need a SKU and widget identity.
    pub fn is_widget_cadence(&self) -> bool {
        matches!(self, Self::SeatLicense | Self::SeatLicenseDaily)
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request body
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Schedule input — a single cron string, or a list of them for
/// `process_contract_events`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScheduleInput {
    One(String),
    Many(Vec<String>),
}

impl ScheduleInput {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s.clone()],
            Self::Many(v) => v.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(s) => s.is_empty(),
            Self::Many(v) => v.is_empty(),
        }
    }
}

/// JSON body of the create and update endpoints.
///
/// The always-required strings default to empty when absent, so a body
/// missing one still deserializes and `validate()` reports the missing
/// field instead of the extractor rejecting the request.
#[derive(Clone, Debug, Deserialize)]
pub struct CadenceEventRequest {
    #[serde(default)]
    pub contract_uuid: String,
    pub request_type: RequestType,
    #[serde(default)]
    pub organization_uuid: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub contract_timezone: String,
    #[serde(default)]
    pub requestor_uuid: String,
    #[serde(default)]
    pub tenant_uuid: String,
    #[serde(default)]
    pub schedule: Option<ScheduleInput>,
    #[serde(default)]
    pub sku_id: Option<String>,
    #[serde(default)]
    pub widget_uuid: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub additional_env: Vec<String>,
    #[serde(default)]
    pub custom_steps: Option<Vec<DagStep>>,
}

impl CadenceEventRequest {
    /// Per-kind field validation.
    ///
    /// The widget cadence kinds additionally need `sku_id` and
    /// `widget_uuid`; `process_contract_events` additionally needs a
    /// schedule (string or non-empty list). Identifier fields must be
    /// well-formed UUIDs except `customer_id` and `sku_id`, which are
    /// opaque to this service.
    pub fn validate(&self) -> Result<()> {
        require_uuid("contract_uuid", &self.contract_uuid)?;
        require_uuid("organization_uuid", &self.organization_uuid)?;
        require_present("contract_timezone", &self.contract_timezone)?;
        require_present("customer_id", &self.customer_id)?;
        require_uuid("requestor_uuid", &self.requestor_uuid)?;
        require_uuid("tenant_uuid", &self.tenant_uuid)?;

        if self.request_type.is_widget_cadence() {
            if self.sku_id.as_deref().unwrap_or("").is_empty() {
                return Err(Error::Validation(
                    "Missing required field for widget_cadence request: sku_id".into(),
                ));
            }
            match self.widget_uuid.as_deref() {
                None | Some("") => {
                    return Err(Error::Validation(
                        "Missing required field for widget_cadence request: widget_uuid".into(),
                    ));
                }
                Some(widget) => {
                    Uuid::parse_str(widget)
                        .map_err(|_| Error::Validation("Invalid widget_uuid format".into()))?;
                }
            }
        }

        match (&self.request_type, &self.schedule) {
            (RequestType::ProcessContractEvents, None) => {
                return Err(Error::Validation(
                    "schedule is required for process_contract_events".into(),
                ));
            }
            (RequestType::ProcessContractEvents, Some(input)) if input.is_empty() => {
                return Err(Error::Validation(
                    "schedule must not be empty for process_contract_events".into(),
                ));
            }
            (_, Some(ScheduleInput::Many(_)))
                if self.request_type != RequestType::ProcessContractEvents =>
            {
                return Err(Error::Validation(format!(
                    "schedule must be a single cron string for {}",
                    self.request_type
                )));
            }
            _ => {}
        }

        Ok(())
    }

    /// Schedule strings for this request, falling back to the configured
    /// default when the body omitted them.
    pub fn schedules_or(&self, default_schedule: &str) -> Vec<String> {
        match &self.schedule {
            Some(input) => input.to_vec(),
            None => vec![default_schedule.to_string()],
        }
    }
}

fn require_present(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(format!("Missing required field: {field}")));
    }
    Ok(())
}

fn require_uuid(field: &'static str, value: &str) -> Result<()> {
    require_present(field, value)?;
    Uuid::parse_str(value).map_err(|_| Error::Validation(format!("Invalid {field} format")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request(request_type: RequestType) -> CadenceEventRequest {
        CadenceEventRequest {
            contract_uuid: "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d".into(),
            request_type,
            organization_uuid: "b2c3d4e5-f6a7-4b8c-9d0e-1f2a3b4c5d6e".into(),
            customer_id: "customer-42".into(),
            contract_timezone: "America/New_York".into(),
            requestor_uuid: "c3d4e5f6-a7b8-4c9d-0e1f-2a3b4c5d6e7f".into(),
            tenant_uuid: "d4e5f6a7-b8c9-4d0e-1f2a-3b4c5d6e7f80".into(),
            schedule: None,
            sku_id: None,
            widget_uuid: None,
            description: None,
            additional_env: Vec::new(),
            custom_steps: None,
        }
    }

    #[test]
    fn acronyms_match_dag_naming() {
        assert_eq!(RequestType::SeatLicense.acronym(), "sl");
        assert_eq!(RequestType::SeatLicenseDaily.acronym(), "sd");
        assert_eq!(RequestType::GenerateInvoice.acronym(), "gi");
        assert_eq!(RequestType::ProcessContractEvents.acronym(), "pce");
    }

    #[test]
    fn path_segment_accepts_kebab_and_snake() {
        assert_eq!(
            RequestType::from_path_segment("seat-license").unwrap(),
            RequestType::SeatLicense
        );
        assert_eq!(
            RequestType::from_path_segment("seat_license_daily").unwrap(),
            RequestType::SeatLicenseDaily
        );
        assert_eq!(
            RequestType::from_path_segment("process-contract-events").unwrap(),
            RequestType::ProcessContractEvents
        );
        assert!(RequestType::from_path_segment("seat-licence").is_err());
    }

    #[test]
    fn invoice_request_validates_without_widget_fields() {
        let req = base_request(RequestType::GenerateInvoice);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn widget_cadence_requires_sku_and_widget() {
        let mut req = base_request(RequestType::SeatLicense);
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("widget_cadence"), "got: {err}");
        assert!(err.contains("sku_id"), "got: {err}");

        req.sku_id = Some("e5f6a7b8-c9d0-4e1f-2a3b-4c5d6e7f8091".into());
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("widget_uuid"), "got: {err}");

        req.widget_uuid = Some("f6a7b8c9-d0e1-4f2a-3b4c-5d6e7f809102".into());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn malformed_widget_uuid_is_rejected() {
        let mut req = base_request(RequestType::SeatLicenseDaily);
        req.sku_id = Some("sku-1".into());
        req.widget_uuid = Some("not-a-uuid".into());
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("Invalid widget_uuid format"), "got: {err}");
    }

    #[test]
    fn malformed_contract_uuid_is_rejected() {
        let mut req = base_request(RequestType::GenerateInvoice);
        req.contract_uuid = "12345".into();
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("Invalid contract_uuid format"), "got: {err}");
    }

    #[test]
    fn customer_and_sku_identifiers_are_opaque() {
        let mut req = base_request(RequestType::SeatLicense);
        req.customer_id = "ACME-0042".into();
        req.sku_id = Some("SKU-PREMIUM-01".into());
        req.widget_uuid = Some("f6a7b8c9-d0e1-4f2a-3b4c-5d6e7f809102".into());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn body_missing_identifiers_parses_and_fails_validation() {
        let req: CadenceEventRequest =
            serde_json::from_str(r#"{"request_type": "generate_invoice"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(
            err.to_string().contains("Missing required field: contract_uuid"),
            "got: {err}"
        );
    }

    #[test]
    fn contract_events_requires_schedule() {
        let mut req = base_request(RequestType::ProcessContractEvents);
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("schedule is required"), "got: {err}");

        req.schedule = Some(ScheduleInput::Many(Vec::new()));
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("must not be empty"), "got: {err}");

        req.schedule = Some(ScheduleInput::Many(vec!["0 0 31 * *".into()]));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn schedule_list_is_rejected_for_other_kinds() {
        let mut req = base_request(RequestType::GenerateInvoice);
        req.schedule = Some(ScheduleInput::Many(vec!["0 0 1 * *".into()]));
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("single cron string"), "got: {err}");
    }

    #[test]
    fn schedule_input_deserializes_string_or_array() {
        let one: CadenceEventRequest = serde_json::from_str(
            r#"{
                "contract_uuid": "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d",
                "request_type": "generate_invoice",
                "organization_uuid": "b2c3d4e5-f6a7-4b8c-9d0e-1f2a3b4c5d6e",
                "customer_id": "cust",
                "contract_timezone": "UTC",
                "requestor_uuid": "c3d4e5f6-a7b8-4c9d-0e1f-2a3b4c5d6e7f",
                "tenant_uuid": "d4e5f6a7-b8c9-4d0e-1f2a-3b4c5d6e7f80",
                "schedule": "0 0 1 * *"
            }"#,
        )
        .unwrap();
        assert_eq!(one.schedule, Some(ScheduleInput::One("0 0 1 * *".into())));

        let many: CadenceEventRequest = serde_json::from_str(
            r#"{
                "contract_uuid": "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d",
                "request_type": "process_contract_events",
                "organization_uuid": "b2c3d4e5-f6a7-4b8c-9d0e-1f2a3b4c5d6e",
                "customer_id": "cust",
                "contract_timezone": "UTC",
                "requestor_uuid": "c3d4e5f6-a7b8-4c9d-0e1f-2a3b4c5d6e7f",
                "tenant_uuid": "d4e5f6a7-b8c9-4d0e-1f2a-3b4c5d6e7f80",
                "schedule": ["0 0 1 * *", "0 0 15 * *"]
            }"#,
        )
        .unwrap();
        assert_eq!(
            many.schedule,
            Some(ScheduleInput::Many(vec![
                "0 0 1 * *".into(),
                "0 0 15 * *".into()
            ]))
        );
    }

    #[test]
    fn schedules_or_falls_back_to_default() {
        let mut req = base_request(RequestType::GenerateInvoice);
        assert_eq!(req.schedules_or("0 */5 * * *"), vec!["0 */5 * * *"]);

        req.schedule = Some(ScheduleInput::One("0 0 31 * *".into()));
        assert_eq!(req.schedules_or("0 */5 * * *"), vec!["0 0 31 * *"]);
    }
}
