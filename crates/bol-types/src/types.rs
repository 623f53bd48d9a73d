use std::fmt;
use std::str::FromStr;

use crate::lenient;

/// Printed in vessel/voyage boxes when the carrier has not named them yet.
pub const TO_BE_NAMED: &str = "TBN";

/// Default text for the "NO.& SEQUENCE OF ORIGINAL B/L's" box.
pub const DEFAULT_BL_SEQUENCE: &str = "3 (Three) Original Bills of Lading";

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Party {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Consignee {
    #[serde(flatten)]
    pub party: Party,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub is_negotiable: bool, // "To Order" marking
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NotifyParty {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VesselDetails {
    #[serde(default, deserialize_with = "lenient::string")]
    pub vessel_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub voyage_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ports {
    #[serde(default, deserialize_with = "lenient::string")]
    pub loading: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub discharge: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub delivery: Option<String>,
}

/// One cargo line. Display order is sequence order; lines are never merged.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CargoItem {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub container_numbers: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub seal_numbers: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub marks: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub gross_weight: String, // Free text with unit, e.g. "1,200.50 KGS"
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub measurement: Option<String>,

    // Raw fields produced by wrapped model responses
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hs_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub volume: Option<String>,
}

impl CargoItem {
    pub fn new(description: impl Into<String>, gross_weight: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            gross_weight: gross_weight.into(),
            ..Self::default()
        }
    }

    /// Move `weight`/`volume` into the display fields when those are blank.
    pub fn promote_raw_fields(&mut self) {
        if self.gross_weight.trim().is_empty() {
            if let Some(weight) = self.weight.clone() {
                self.gross_weight = weight;
            }
        }
        if self.measurement.is_none() {
            self.measurement = self.volume.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Totals {
    #[serde(default, deserialize_with = "lenient::u32")]
    pub packages: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub gross_weight: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub measurement: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InvoiceDetails {
    #[serde(default, deserialize_with = "lenient::string")]
    pub number: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransportType {
    #[serde(rename = "Port-To-Port")]
    PortToPort,
    #[serde(rename = "Combined Transport")]
    CombinedTransport,
}

impl TransportType {
    pub const ALL: [TransportType; 2] = [TransportType::PortToPort, TransportType::CombinedTransport];

    pub fn label(&self) -> &'static str {
        match self {
            TransportType::PortToPort => "Port-To-Port",
            TransportType::CombinedTransport => "Combined Transport",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "porttoport" | "p2p" => Ok(TransportType::PortToPort),
            "combinedtransport" | "combined" | "multimodal" => Ok(TransportType::CombinedTransport),
            _ => Err(format!("unknown transport type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PackingGroup {
    I,
    II,
    III,
}

impl PackingGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackingGroup::I => "I",
            PackingGroup::II => "II",
            PackingGroup::III => "III",
        }
    }
}

impl fmt::Display for PackingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackingGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let stripped = upper
            .trim_start_matches("PACKING GROUP")
            .trim_start_matches("PG")
            .trim();
        match stripped {
            "I" | "1" => Ok(PackingGroup::I),
            "II" | "2" => Ok(PackingGroup::II),
            "III" | "3" => Ok(PackingGroup::III),
            _ => Err(format!("unknown packing group: {s}")),
        }
    }
}

/// One entry of a dangerous goods declaration.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DangerousGoods {
    #[serde(default, deserialize_with = "lenient::string")]
    pub un_number: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub proper_shipping_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub hazard_class: String,
    #[serde(default, deserialize_with = "lenient::opt_parsed")]
    pub packing_group: Option<PackingGroup>,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub marine_pollutant: bool,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub subsidiary_risk: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub flash_point: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub emergency_contact: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub special_provisions: Option<String>,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub limited_quantity: bool,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ems_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub segregation_group: Option<String>,
}

/// The canonical Bill of Lading document model.
///
/// Built once per request from model output, read by layout, then dropped.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BolData {
    pub shipper: Party,
    pub consignee: Consignee,
    #[serde(default, deserialize_with = "lenient::opt_object")]
    pub notify_party: Option<NotifyParty>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub booking_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub shipper_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub imo_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub rider_pages: Option<u32>, // Recomputed by layout
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub bl_sequence: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub original_bl_count: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hs_code: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_object")]
    pub vessel_details: Option<VesselDetails>,
    #[serde(default)]
    pub ports: Ports,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub place_of_receipt: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub place_of_delivery: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub shipped_on_board_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub place_and_date_of_issue: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub discharge_agent: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_parsed")]
    pub transport_type: Option<TransportType>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub cargo: Vec<CargoItem>,
    #[serde(default)]
    pub totals: Totals,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub freight_charges: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub declared_value: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub carrier_receipt: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_object")]
    pub invoice_details: Option<InvoiceDetails>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub freight_terms: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub payment_terms: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub special_instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date_of_shipment: Option<String>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub dangerous_goods: Vec<DangerousGoods>,
    #[serde(default, deserialize_with = "lenient::bool")]
    pub has_dangerous_goods: bool,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub carrier_endorsements: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub signed_by: Option<String>,
}

impl BolData {
    /// Restore `has_dangerous_goods == !dangerous_goods.is_empty()`.
    pub fn sync_dangerous_goods_flag(&mut self) {
        self.has_dangerous_goods = !self.dangerous_goods.is_empty();
    }

    pub fn place_of_delivery(&self) -> Option<&str> {
        self.place_of_delivery
            .as_deref()
            .or(self.ports.delivery.as_deref())
    }

    /// Freight & charges box text: explicit charges, else the freight terms.
    pub fn freight(&self) -> Option<&str> {
        self.freight_charges
            .as_deref()
            .or(self.freight_terms.as_deref())
    }

    pub fn bl_sequence(&self) -> &str {
        self.bl_sequence
            .as_deref()
            .or(self.original_bl_count.as_deref())
            .unwrap_or(DEFAULT_BL_SEQUENCE)
    }

    pub fn vessel_name(&self) -> &str {
        self.vessel_details
            .as_ref()
            .map(|v| v.vessel_name.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(TO_BE_NAMED)
    }

    pub fn voyage_number(&self) -> &str {
        self.vessel_details
            .as_ref()
            .map(|v| v.voyage_number.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(TO_BE_NAMED)
    }

    /// Soft problems worth logging; none of them block layout.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.shipper.name.trim().is_empty() {
            warnings.push("shipper name is empty".to_string());
        }
        if self.consignee.party.name.trim().is_empty() {
            warnings.push("consignee name is empty".to_string());
        }
        if self.cargo.is_empty() {
            warnings.push("no cargo lines".to_string());
        }
        if self.ports.loading.trim().is_empty() || self.ports.discharge.trim().is_empty() {
            warnings.push("port of loading or discharge is empty".to_string());
        }
        for (i, item) in self.cargo.iter().enumerate() {
            if item.description.trim().is_empty() {
                warnings.push(format!("cargo line {} has no description", i + 1));
            }
        }
        warnings
    }
}
