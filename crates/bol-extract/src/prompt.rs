//! Extraction prompt construction

use crate::capability::ExtractionRequest;

pub const TEMPERATURE: f32 = 0.1;
pub const MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str = "You are an expert shipping document processor specializing in Bills of Lading for ocean freight.
Your task is to extract and organize information from shipping documents into a structured JSON format for generating a professional Bill of Lading.

CRITICAL REQUIREMENTS:
1. Return ONLY a valid JSON object - no markdown, no explanations, no additional text
2. Use the EXACT field names and structure specified in the instructions
3. Extract ALL relevant information systematically from every document provided
4. Cross-reference information between documents for accuracy and completeness
5. Use standard shipping industry terminology and formatting
6. Keep every cargo line item from the documents as its own entry; never merge or drop lines";

const GUIDELINES: &str = "EXTRACTION GUIDELINES:
- Use exporter/seller as shipper, buyer/consignee as consignee
- Extract container numbers, seal numbers, and shipping marks from either document
- Identify all reference numbers (booking, shipper's reference, etc.)
- Find port information, vessel details, and shipping dates
- Calculate accurate totals for packages, weights, and measurements
- Extract commercial terms (freight, payment, incoterms)
- Look for special instructions, handling requirements, or shipping marks";

const DANGEROUS_GOODS_GUIDELINES: &str = "DANGEROUS GOODS GUIDELINES:
- Create one dangerous_goods entry per declared substance, in document order
- Copy UN numbers, hazard classes and packing groups exactly as declared
- packing_group must be one of \"I\", \"II\", \"III\" or omitted
- marine_pollutant and limited_quantity are booleans
- Set has_dangerous_goods to true when any entry is present";

const SCHEMA: &str = r#"{
  "shipper": {
    "name": "full company name",
    "address": "street address",
    "city": "city, state/province, postal code",
    "country": "country name",
    "phone": "phone number if available"
  },
  "consignee": {
    "name": "full company name",
    "address": "street address",
    "city": "city, state/province, postal code",
    "country": "country name",
    "phone": "phone number if available",
    "is_negotiable": false
  },
  "notify_party": {
    "name": "company name if different from consignee",
    "address": "full address",
    "phone": "phone number if available"
  },
  "booking_ref": "booking reference number",
  "shipper_ref": "shipper's reference number",
  "imo_number": "IMO vessel number if available",
  "bl_sequence": "3 (Three) Original Bills of Lading",
  "hs_code": "H.S. code for customs declaration",
  "vessel_details": {
    "vessel_name": "vessel name or TBN",
    "voyage_number": "voyage number or TBN"
  },
  "ports": {
    "loading": "port of loading",
    "discharge": "port of discharge",
    "delivery": "final delivery location"
  },
  "place_of_receipt": "place where goods received by carrier",
  "place_of_delivery": "final delivery location",
  "shipped_on_board_date": "date goods loaded on vessel",
  "place_and_date_of_issue": "where and when B/L issued",
  "discharge_agent": "port agent at discharge port",
  "transport_type": "Port-To-Port",
  "cargo": [
    {
      "container_numbers": "container numbers if available",
      "seal_numbers": "seal numbers if available",
      "marks": "shipping marks and numbers",
      "description": "detailed description of goods",
      "gross_weight": "weight with unit (kg/lbs)",
      "measurement": "volume/measurement if available"
    }
  ],
  "totals": {
    "packages": 0,
    "gross_weight": "total weight with unit",
    "measurement": "total volume/CBM"
  },
  "freight_charges": "freight amount or terms",
  "declared_value": "declared value if any",
  "carrier_receipt": "receipt statement for goods",
  "invoice_details": {
    "number": "invoice number",
    "date": "invoice date",
    "value": "total invoice value",
    "currency": "currency code (USD/EUR/etc)"
  },
  "freight_terms": "FOB/CIF/EXW/etc",
  "payment_terms": "payment terms",
  "special_instructions": "special handling instructions",
  "date_of_shipment": "shipment date",
  "carrier_endorsements": "",
  "signed_by": ""
}"#;

const DANGEROUS_GOODS_SCHEMA: &str = r#"Also include these fields:
{
  "has_dangerous_goods": true,
  "dangerous_goods": [
    {
      "un_number": "UN number, e.g. UN1993",
      "proper_shipping_name": "proper shipping name",
      "hazard_class": "hazard class, e.g. 3",
      "packing_group": "I, II or III",
      "marine_pollutant": false,
      "subsidiary_risk": "subsidiary risk if any",
      "flash_point": "flash point with unit if any",
      "emergency_contact": "24/7 emergency contact",
      "special_provisions": "special provisions if any",
      "limited_quantity": false,
      "ems_number": "EmS number, e.g. F-E, S-E",
      "segregation_group": "segregation group if any"
    }
  ]
}"#;

const EXAMPLE: &str = r#"{
  "shipper": {
    "name": "ABC Exports Ltd",
    "address": "123 Industrial Road",
    "city": "Mumbai, Maharashtra 400001",
    "country": "India",
    "phone": "+91-22-12345678"
  },
  "consignee": {
    "name": "XYZ Imports BV",
    "address": "456 Harbor Street",
    "city": "Rotterdam, 3011 AB",
    "country": "Netherlands",
    "is_negotiable": false
  },
  "booking_ref": "BOOK123456",
  "shipper_ref": "EXP/2024/001",
  "ports": {
    "loading": "INMUN (Mundra)",
    "discharge": "NLRTM (Rotterdam)"
  },
  "cargo": [
    {
      "marks": "CTNS 1-100",
      "description": "Machine Parts",
      "gross_weight": "1000 kg"
    }
  ],
  "totals": {
    "packages": 100,
    "gross_weight": "1000 kg"
  },
  "freight_terms": "FOB"
}"#;

/// Source texts for one extraction.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub packing_list: &'a str,
    pub invoice: &'a str,
    pub dangerous_goods: Option<&'a str>,
}

pub fn user_prompt(input: &PromptInput<'_>) -> String {
    let mut prompt = String::from(
        "Extract and organize information from these shipping documents to create a comprehensive Bill of Lading.\n\n",
    );
    prompt.push_str("PACKING LIST:\n");
    prompt.push_str(input.packing_list);
    prompt.push_str("\n\nCOMMERCIAL INVOICE:\n");
    prompt.push_str(input.invoice);
    if let Some(dg) = input.dangerous_goods {
        prompt.push_str("\n\nDANGEROUS GOODS DECLARATION:\n");
        prompt.push_str(dg);
    }
    prompt.push_str("\n\n");
    prompt.push_str(GUIDELINES);
    if input.dangerous_goods.is_some() {
        prompt.push_str("\n\n");
        prompt.push_str(DANGEROUS_GOODS_GUIDELINES);
    }
    prompt.push_str(
        "\n\nReturn a JSON object with this EXACT structure (all fields are optional unless marked required):\n\n",
    );
    prompt.push_str(SCHEMA);
    if input.dangerous_goods.is_some() {
        prompt.push_str("\n\n");
        prompt.push_str(DANGEROUS_GOODS_SCHEMA);
    }
    prompt.push_str("\n\nEXAMPLE OUTPUT FORMAT:\n");
    prompt.push_str(EXAMPLE);
    prompt.push_str("\n\nReturn only the JSON object with extracted data.");
    prompt
}

pub fn build_request(input: &PromptInput<'_>) -> ExtractionRequest {
    ExtractionRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: user_prompt(input),
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
        json_response: true,
    }
}
