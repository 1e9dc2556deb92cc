use serde::Serialize;

/// Everything the index knows about one hostname.
///
/// `None` means the name was never observed in that map. A present list is
/// never empty.
#[derive(Serialize, Debug, Default, PartialEq, Eq)]
pub struct HostnameLookup {
    pub hostname: String,
    #[serde(rename = "A")]
    pub a: Option<Vec<String>>,
    #[serde(rename = "AAAA")]
    pub aaaa: Option<Vec<String>>,
    pub addresses: Option<Vec<String>>,
    pub cname_target: Option<String>,
    pub cname_aliases: Option<Vec<String>>,
    pub cname_siblings: Option<Vec<String>>,
    #[serde(rename = "PTR")]
    pub ptr: Option<Vec<String>>,
    pub ptr_addresses: Option<Vec<String>>,
}

/// Everything the index knows about one address.
#[derive(Serialize, Debug, Default, PartialEq, Eq)]
pub struct AddressLookup {
    pub address: String,
    #[serde(rename = "A")]
    pub a: Option<Vec<String>>,
    #[serde(rename = "AAAA")]
    pub aaaa: Option<Vec<String>>,
    #[serde(rename = "PTR")]
    pub ptr: Option<Vec<String>>,
    pub names: Option<Vec<String>>,
}

#[derive(Serialize, Debug)]
pub struct ProblemReport {
    #[serde(rename = "buildtime")]
    pub build_time: String,
    #[serde(rename = "checktime")]
    pub check_time: String,
    pub counts: u64,
    pub known_domains: Vec<String>,
    pub failures: Vec<crate::error::IngestFailure>,
    pub problems: Vec<crate::model::problem::Problem>,
}
