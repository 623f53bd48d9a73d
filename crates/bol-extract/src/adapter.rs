//! Structured extraction: prompt, model call, repair, typed model

use std::sync::Arc;

use bol_types::BolData;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::capability::StructuredExtractor;
use crate::error::ExtractionError;
use crate::normalize;
use crate::prompt::{build_request, PromptInput};

/// Longest document preview written to debug logs.
const PREVIEW_CHARS: usize = 500;

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Turn a raw model response into a consistent [`BolData`].
pub fn parse_response(raw: &str) -> Result<BolData, ExtractionError> {
    let object = normalize::repair(normalize::parse_object(raw)?)?;
    let mut bol: BolData = serde_json::from_value(Value::Object(object))
        .map_err(|e| ExtractionError::Schema(e.to_string()))?;
    finalize(&mut bol);
    Ok(bol)
}

/// Post-deserialization invariants.
fn finalize(bol: &mut BolData) {
    bol.sync_dangerous_goods_flag();
    bol.rider_pages = None;
    for item in &mut bol.cargo {
        item.promote_raw_fields();
    }
}

/// Builds requests, calls the injected model and repairs its answer.
#[derive(Clone)]
pub struct ExtractionAdapter {
    extractor: Arc<dyn StructuredExtractor>,
}

impl ExtractionAdapter {
    pub fn new(extractor: Arc<dyn StructuredExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn extract(
        &self,
        packing_list_text: &str,
        invoice_text: &str,
        dangerous_goods_text: Option<&str>,
    ) -> Result<BolData, ExtractionError> {
        debug!(preview = %preview(packing_list_text), "Packing list text");
        debug!(preview = %preview(invoice_text), "Invoice text");

        let request = build_request(&PromptInput {
            packing_list: packing_list_text,
            invoice: invoice_text,
            dangerous_goods: dangerous_goods_text,
        });
        let raw = self.extractor.extract_structured(&request).await?;
        if raw.trim().is_empty() {
            return Err(ExtractionError::InvalidJson("empty response".to_string()));
        }

        let bol = parse_response(&raw)?;
        for warning in bol.warnings() {
            warn!(%warning, "Extracted BOL data looks incomplete");
        }
        info!(
            cargo_items = bol.cargo.len(),
            dangerous_goods = bol.dangerous_goods.len(),
            has_notify_party = bol.notify_party.is_some(),
            "Structured extraction complete"
        );
        Ok(bol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::ExtractionRequest;
    use crate::error::ServiceError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct Canned {
        response: Result<String, ServiceError>,
        seen: Mutex<Vec<ExtractionRequest>>,
    }

    impl Canned {
        fn new(response: Result<String, ServiceError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl StructuredExtractor for Canned {
        async fn extract_structured(
            &self,
            request: &ExtractionRequest,
        ) -> Result<String, ServiceError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    const VALID: &str = r#"{
        "shipper": {"name": "Acme", "address": "1 Road", "city": "Pune", "country": "India"},
        "consignee": {"name": "Beta", "address": "2 Street", "city": "Hamburg", "country": "Germany"},
        "ports": {"loading": "Nhava Sheva", "discharge": "Hamburg"},
        "rider_pages": 7,
        "has_dangerous_goods": true,
        "cargo": [
            {"description": "Valves", "gross_weight": "500 KGS"},
            {"description": "Valves", "gross_weight": "500 KGS"}
        ],
        "totals": {"packages": 20, "gross_weight": "1000 KGS"}
    }"#;

    #[tokio::test]
    async fn test_extract_valid_response() {
        let model = Canned::new(Ok(format!("```json\n{VALID}\n```")));
        let adapter = ExtractionAdapter::new(model.clone());
        let bol = adapter.extract("packing", "invoice", None).await.unwrap();

        assert_eq!(bol.shipper.name, "Acme");
        // Identical lines stay distinct.
        assert_eq!(bol.cargo.len(), 2);
        assert_eq!(bol.rider_pages, None);
        assert!(!bol.has_dangerous_goods);

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].user_prompt.contains("packing"));
    }

    #[test]
    fn test_bare_dangerous_goods_object() {
        let raw = r#"{
            "shipper": {"name": "A"}, "consignee": {"name": "B"}, "cargo": [],
            "dangerous_goods": {"un_number": "UN1263", "proper_shipping_name": "PAINT",
                                "hazard_class": "3", "packing_group": "II", "marine_pollutant": "no"}
        }"#;
        let bol = parse_response(raw).unwrap();
        assert_eq!(bol.dangerous_goods.len(), 1);
        assert!(bol.has_dangerous_goods);
        assert_eq!(bol.dangerous_goods[0].un_number, "UN1263");
        assert_eq!(
            bol.dangerous_goods[0].packing_group,
            Some(bol_types::PackingGroup::II)
        );
    }

    #[test]
    fn test_wrapped_response_promotes_weights() {
        let raw = r#"{"BillOfLading": {
            "Exporter": {"Name": "Spice Co", "Address": "1 Road, Kochi"},
            "Consignee": {"Name": "Euro Foods", "Address": "Dock 3, Antwerp"},
            "CargoDescription": [{"ItemDescription": "Pepper", "NetWeightKgs": 900, "Volume": "3 CBM"}],
            "TotalBags": "30"
        }}"#;
        let bol = parse_response(raw).unwrap();
        assert_eq!(bol.cargo[0].gross_weight, "900 kg");
        assert_eq!(bol.cargo[0].measurement.as_deref(), Some("3 CBM"));
        assert_eq!(bol.totals.packages, 30);
        assert_eq!(bol.vessel_name(), "TBN");
    }

    #[test]
    fn test_missing_consignee_is_rejected() {
        let err = parse_response(r#"{"shipper": {"name": "A"}, "cargo": []}"#).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::MissingFields(vec!["consignee".to_string()])
        );
    }

    #[test]
    fn test_wrong_shape_is_schema_error() {
        let err = parse_response(r#"{"shipper": "A", "consignee": {}, "cargo": []}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Schema(_)));
    }

    #[tokio::test]
    async fn test_service_failure_propagates() {
        let model = Canned::new(Err(ServiceError::RateLimited("quota".into())));
        let adapter = ExtractionAdapter::new(model);
        let err = adapter.extract("a", "b", None).await.unwrap_err();
        assert!(!err.is_content());
    }

    #[tokio::test]
    async fn test_empty_response() {
        let adapter = ExtractionAdapter::new(Canned::new(Ok("  ".into())));
        let err = adapter.extract("a", "b", Some("dg")).await.unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidJson(_)));
    }
}
