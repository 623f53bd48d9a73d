//! Fixed Bill of Lading wording
//!
//! Reproduced exactly on every document; none of it is configurable.

pub const COMPANY_NAME: &str = "SHIPPING COMPANY";
pub const COMPANY_LOGO: &str = "LOGO";
pub const TITLE: &str = "BILL OF LADING No.";
pub const DRAFT: &str = "DRAFT";

pub const CONSIGNEE_NOTE: &str =
    "This B/L is not negotiable unless marked \"To Order\" or \"To Order of ...\" here.";

pub const NOTIFY_NOTE: &str =
    "(No responsibility shall attach to Carrier or to his Agent for failure to notify)";

pub const CUSTOMS_LIABILITY: &str = "\"Carrier's liability ceases after discharge of goods into Customs custody and Carrier shall not be responsible for delivery of cargo without the presentation of the Original Bill of Lading, as per Customs Regulations\".";

pub const HS_CODE_DISCLAIMER: &str = "CARRIER WILL NOT BE LIABLE FOR ANY MISDECLARATION OF H.S.CODE/NCM AND ALL COSTS AND CONSEQUENCES ARISING OUT OF THE MISDECLARATION WILL BE ON ACCOUNT OF SHIPPERS.";

pub const CARGO_DISCLAIMER: &str =
    "PARTICULARS FURNISHED BY THE SHIPPER - NOT CHECKED BY CARRIER - CARRIER NOT RESPONSIBLE";

pub const CONTINUATION_NOTE: &str =
    "(Continued on attached Bill of Lading Rider pages(s), if applicable)";

pub const FREIGHT_DEFAULT: &str = "AS PER AGREEMENT";

pub const FREIGHT_NOTE: &str = "Cargo shall not be delivered unless Freight & Charges are paid";

pub const RECEIVED: &str = "by the Carrier in apparent good order and condition (unless otherwise stated herein) the total number or quantity of Containers or other packages or units indicated in the box entitled Carrier's Receipt for carriage subject to all the terms and conditions hereof from the Place of Receipt or Port of Loading to the Port of Discharge or Place of Delivery, whichever is applicable.";

pub const ACCEPTANCE: &str = "IN ACCEPTING THIS BILL OF LADING THE MERCHANT EXPRESSLY ACCEPTS AND AGREES TO ALL THE TERMS AND CONDITIONS, WHETHER PRINTED, STAMPED OR OTHERWISE INCORPORATED ON THIS SIDE AND ON THE REVERSE SIDE OF THIS BILL OF LADING AND THE TERMS AND CONDITIONS OF THE CARRIER'S APPLICABLE TARIFF AS IF THEY WERE ALL SIGNED BY THE MERCHANT.";

pub const SURRENDER: &str = "If this is a negotiable (To Order / of) Bill of Lading, one original Bill of Lading, duly endorsed must be surrendered by the Merchant to the Carrier (together with outstanding Freight and charges) in exchange for the Goods or a Delivery Order. If this is a non-negotiable (straight) Bill of Lading, the Carrier shall deliver the Goods or issue a Delivery Order (after payment of outstanding Freight and charges) against the surrender of one original Bill of Lading or in accordance with the national law at the Port of Discharge or Place of Delivery whichever is applicable.";

pub const WITNESS: &str = "IN WITNESS WHEREOF the Carrier or their Agent has signed the number of Bills of Lading stated at the top, all of this tenor and date, and wherever one original Bill of Lading has been surrendered all other Bills of Lading shall be void.";

pub const SIGNED_ON_BEHALF: &str = "on behalf of the Carrier";

pub const FINAL_NOTICE: &str = "TERMS CONTINUED ON REVERSE";

/// Cargo table column headings, left to right.
pub const CARGO_COLUMNS: [&str; 4] = [
    "Container Numbers, Seal Numbers and Marks",
    "Description of Packages and Goods",
    "Gross Cargo",
    "Measurement",
];
