//! Customer Attribute Table
//!
//! Declarative description of every attribute the prediction form submits,
//! plus the attributes derived from them before encoding.

use serde::{Deserialize, Serialize};

/// Contract tenure in months
pub const TENURE: &str = "tenure";
/// Monthly charge in dollars
pub const MONTHLY_CHARGES: &str = "MonthlyCharges";
/// Derived count of subscribed internet add-ons
pub const NUM_INTERNET_SERVICES: &str = "NumInternetServices";
/// Derived phone/internet combination
pub const CUSTOMER_TYPE: &str = "CustomerType";
pub const PHONE_SERVICE: &str = "PhoneService";
pub const INTERNET_SERVICE: &str = "InternetService";

const YES_NO: &[&str] = &["Yes", "No"];
const INTERNET_ADDON: &[&str] = &["Yes", "No", "No internet service"];
const MULTIPLE_LINES: &[&str] = &["Yes", "No", "No phone service"];
const CONTRACT: &[&str] = &["Month-to-month", "One year", "Two year"];
const PAYMENT_METHOD: &[&str] = &[
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];
const INTERNET: &[&str] = &["DSL", "Fiber optic", "No"];

/// Domain of the derived `CustomerType` attribute
pub const CUSTOMER_TYPES: &[&str] = &["Both", "Phone only", "Internet only", "Neither"];

/// Internet add-ons counted by `NumInternetServices`
pub const ADDON_SERVICES: [&str; 6] = [
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
];

/// Kind of a raw attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeKind {
    /// One of a fixed set of labels
    Categorical(&'static [&'static str]),
    /// Non-negative number
    Numeric,
}

/// One entry of the attribute table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub kind: AttributeKind,
}

impl AttributeSpec {
    const fn categorical(name: &'static str, domain: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: AttributeKind::Categorical(domain),
        }
    }

    const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: AttributeKind::Numeric,
        }
    }

    /// Domain of a categorical attribute
    pub fn domain(&self) -> Option<&'static [&'static str]> {
        match self.kind {
            AttributeKind::Categorical(domain) => Some(domain),
            AttributeKind::Numeric => None,
        }
    }
}

/// Attributes accepted from the caller, in form order
pub const INPUT_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::categorical("Partner", YES_NO),
    AttributeSpec::categorical("Dependents", YES_NO),
    AttributeSpec::numeric(TENURE),
    AttributeSpec::categorical("Contract", CONTRACT),
    AttributeSpec::numeric(MONTHLY_CHARGES),
    AttributeSpec::categorical("PaymentMethod", PAYMENT_METHOD),
    AttributeSpec::categorical(PHONE_SERVICE, YES_NO),
    AttributeSpec::categorical(INTERNET_SERVICE, INTERNET),
    AttributeSpec::categorical("PaperlessBilling", YES_NO),
    AttributeSpec::categorical("StreamingTV", INTERNET_ADDON),
    AttributeSpec::categorical("StreamingMovies", INTERNET_ADDON),
    AttributeSpec::categorical("TechSupport", INTERNET_ADDON),
    AttributeSpec::categorical("MultipleLines", MULTIPLE_LINES),
    AttributeSpec::categorical("OnlineSecurity", INTERNET_ADDON),
    AttributeSpec::categorical("OnlineBackup", INTERNET_ADDON),
    AttributeSpec::categorical("DeviceProtection", INTERNET_ADDON),
];

/// Attributes computed from the inputs before encoding
pub const DERIVED_ATTRIBUTES: &[AttributeSpec] = &[
    AttributeSpec::categorical(CUSTOMER_TYPE, CUSTOMER_TYPES),
    AttributeSpec::numeric(NUM_INTERNET_SERVICES),
];

/// Look up an input or derived attribute by name
pub fn lookup(name: &str) -> Option<&'static AttributeSpec> {
    INPUT_ATTRIBUTES
        .iter()
        .chain(DERIVED_ATTRIBUTES.iter())
        .find(|spec| spec.name == name)
}

/// Every categorical attribute the encoder one-hot encodes, derived ones included
pub fn categorical_attributes() -> impl Iterator<Item = (&'static str, &'static [&'static str])> {
    INPUT_ATTRIBUTES
        .iter()
        .chain(DERIVED_ATTRIBUTES.iter())
        .filter_map(|spec| spec.domain().map(|domain| (spec.name, domain)))
}

/// Every numeric attribute the encoder scales, derived ones included
pub fn numeric_attributes() -> impl Iterator<Item = &'static str> {
    INPUT_ATTRIBUTES
        .iter()
        .chain(DERIVED_ATTRIBUTES.iter())
        .filter(|spec| spec.kind == AttributeKind::Numeric)
        .map(|spec| spec.name)
}

/// Combination of phone and internet service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerType {
    #[serde(rename = "Both")]
    Both,
    #[serde(rename = "Phone only")]
    PhoneOnly,
    #[serde(rename = "Internet only")]
    InternetOnly,
    #[serde(rename = "Neither")]
    Neither,
}

impl CustomerType {
    /// Derive from the `PhoneService` and `InternetService` labels
    pub fn derive(phone_service: &str, internet_service: &str) -> Self {
        let phone = phone_service == "Yes";
        let internet = internet_service != "No";
        match (phone, internet) {
            (true, true) => CustomerType::Both,
            (true, false) => CustomerType::PhoneOnly,
            (false, true) => CustomerType::InternetOnly,
            (false, false) => CustomerType::Neither,
        }
    }

    /// Label used in the one-hot column name
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Both => "Both",
            CustomerType::PhoneOnly => "Phone only",
            CustomerType::InternetOnly => "Internet only",
            CustomerType::Neither => "Neither",
        }
    }
}
