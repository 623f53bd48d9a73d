//! Repair of model output into the canonical BOL shape
//!
//! Everything here works on `serde_json::Value` before the typed
//! deserialization in [`crate::adapter`], so shape problems are fixed
//! without losing the fields that are already right.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::ExtractionError;

/// Top-level key some models wrap their answer in.
pub const WRAPPER_KEY: &str = "BillOfLading";

const DEFAULT_CURRENCY: &str = "USD";

/// Fields that must be present (and not `null`) after repair.
pub const REQUIRED_FIELDS: [&str; 3] = ["shipper", "consignee", "cargo"];

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse raw model output into a JSON object.
pub fn parse_object(raw: &str) -> Result<Map<String, Value>, ExtractionError> {
    let body = strip_code_fences(raw);
    let value: Value =
        serde_json::from_str(body).map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ExtractionError::NotAnObject),
    }
}

/// Apply every shape repair in order.
pub fn repair(mut object: Map<String, Value>) -> Result<Map<String, Value>, ExtractionError> {
    if let Some(Value::Object(nested)) = object.get(WRAPPER_KEY) {
        debug!("Detected nested {} structure, remapping", WRAPPER_KEY);
        object = remap_wrapper(nested);
    }
    wrap_dangerous_goods(&mut object);
    check_required(&object)?;
    Ok(object)
}

/// Wrap a bare dangerous-goods object into a one-element array.
///
/// Returns true when a repair was made.
pub fn wrap_dangerous_goods(object: &mut Map<String, Value>) -> bool {
    let Some(entry) = object.get_mut("dangerous_goods") else {
        return false;
    };
    if !entry.is_object() {
        return false;
    }
    let single = entry.take();
    *entry = Value::Array(vec![single]);
    object.insert("has_dangerous_goods".to_string(), Value::Bool(true));
    debug!("Wrapped single dangerous goods entry into a sequence");
    true
}

pub fn check_required(object: &Map<String, Value>) -> Result<(), ExtractionError> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|key| object.get(**key).map_or(true, Value::is_null))
        .map(|key| key.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        warn!(?missing, "Model response lacks required fields");
        Err(ExtractionError::MissingFields(missing))
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| text(Some(v)))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// Like [`text`], but blank becomes `null`.
fn opt_text(value: Option<&Value>) -> Value {
    let s = text(value);
    if s.is_empty() {
        Value::Null
    } else {
        Value::String(s)
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    let s = text(value);
    if s.is_empty() {
        default.to_string()
    } else {
        s
    }
}

/// `"<n> kg"`, with zero for a missing amount.
fn kilograms(value: Option<&Value>) -> String {
    format!("{} kg", text_or(value, "0"))
}

fn field<'a>(object: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    object.and_then(|o| o.get(key))
}

/// Street address before the first comma, remainder as the city line.
fn split_address(address: &str) -> (String, String) {
    match address.split_once(',') {
        Some((street, rest)) => (street.trim().to_string(), rest.trim().to_string()),
        None => (address.trim().to_string(), String::new()),
    }
}

fn party(source: Option<&Value>) -> Value {
    let (address, city) = split_address(&text(field(source, "Address")));
    json!({
        "name": text(field(source, "Name")),
        "address": address,
        "city": city,
        "country": text(field(source, "Country")),
        "phone": opt_text(field(source, "Phone")),
    })
}

/// `"EXP/001 dt 12.03.2024"`: first token is the number, text after ` dt ` the date.
fn split_invoice_reference(reference: &str) -> (String, String) {
    let number = reference.split_whitespace().next().unwrap_or("").to_string();
    let date = reference
        .split_once(" dt ")
        .map(|(_, date)| date.trim().to_string())
        .unwrap_or_default();
    (number, date)
}

fn cargo_item(item: &Value) -> Value {
    let item = Some(item);
    json!({
        "description": text(field(item, "ItemDescription")),
        "hs_code": opt_text(field(item, "HSNCode")),
        "quantity": field(item, "NumberOfBags").cloned().unwrap_or(json!(0)),
        "weight": kilograms(field(item, "NetWeightKgs")),
        "volume": opt_text(field(item, "Volume")),
    })
}

/// Re-key a `BillOfLading` wrapper object into the canonical shape.
pub fn remap_wrapper(nested: &Map<String, Value>) -> Map<String, Value> {
    let get = |key: &str| nested.get(key);
    let exporter = get("Exporter");
    let shipment = get("ShipmentDetails");
    let vessel = get("VesselAndShippingLine");
    let terms = get("FreightAndPaymentTerms");

    let notify_party = get("NotifyParty")
        .filter(|v| v.is_object())
        .map(|np| {
            let np = Some(np);
            json!({
                "name": text(field(np, "Name")),
                "address": text(field(np, "Address")),
                "phone": opt_text(field(np, "Phone")),
            })
        })
        .unwrap_or(Value::Null);

    let cargo: Vec<Value> = match get("CargoDescription") {
        Some(Value::Array(items)) => items.iter().map(cargo_item).collect(),
        _ => Vec::new(),
    };

    let (invoice_number, invoice_date) =
        split_invoice_reference(&text(field(exporter, "InvoiceNoAndDate")));

    let remapped = json!({
        "shipper": party(exporter),
        "consignee": party(get("Consignee")),
        "notify_party": notify_party,
        "vessel_details": {
            "vessel_name": text_or(field(vessel, "VesselName"), bol_types::TO_BE_NAMED),
            "voyage_number": text_or(field(vessel, "VoyageNumber"), bol_types::TO_BE_NAMED),
        },
        "ports": {
            "loading": text(field(shipment, "PortOfLoading")),
            "discharge": text(field(shipment, "PortOfDischarge")),
            "delivery": text(field(shipment, "CountryOfDestination")),
        },
        "cargo": cargo,
        "totals": {
            "packages": get("TotalBags").cloned().unwrap_or(json!(0)),
            "gross_weight": kilograms(get("TotalGrossWeightKgs")),
            "measurement": text(get("TotalMeasurement")),
        },
        "invoice_details": {
            "number": invoice_number,
            "date": invoice_date,
            "value": text(get("InvoiceValue")),
            "currency": text_or(get("Currency"), DEFAULT_CURRENCY),
        },
        "freight_terms": text(field(terms, "TermsOfDelivery")),
        "payment_terms": text(field(terms, "TermsOfPayment")),
        "special_instructions": text(get("SpecialInstructions")),
        "date_of_shipment": text(get("DateOfShipment")),
        "dangerous_goods": nested.get("dangerous_goods").cloned().unwrap_or(Value::Null),
    });

    match remapped {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
