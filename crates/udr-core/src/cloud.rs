//! Cloud environments that publish service tag documents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Which sovereign cloud a run targets.
///
/// Selects the service tag document to download and the control plane the
/// route table lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CloudEnvironment {
    #[default]
    Public,
    USGov,
    China,
    Germany,
}

impl CloudEnvironment {
    pub const ALL: [CloudEnvironment; 4] = [
        CloudEnvironment::Public,
        CloudEnvironment::USGov,
        CloudEnvironment::China,
        CloudEnvironment::Germany,
    ];

    /// The download confirmation page that links to the current document.
    pub fn download_page(self) -> &'static str {
        match self {
            CloudEnvironment::Public => {
                "https://www.microsoft.com/en-us/download/confirmation.aspx?id=56519"
            }
            CloudEnvironment::USGov => {
                "https://www.microsoft.com/en-us/download/confirmation.aspx?id=57063"
            }
            CloudEnvironment::China => {
                "https://www.microsoft.com/en-us/download/confirmation.aspx?id=57062"
            }
            CloudEnvironment::Germany => {
                "https://www.microsoft.com/en-us/download/confirmation.aspx?id=57064"
            }
        }
    }

    /// Base URL of the resource manager for this cloud.
    pub fn management_endpoint(self) -> &'static str {
        match self {
            CloudEnvironment::Public => "https://management.azure.com",
            CloudEnvironment::USGov => "https://management.usgovcloudapi.net",
            CloudEnvironment::China => "https://management.chinacloudapi.cn",
            CloudEnvironment::Germany => "https://management.microsoftazure.de",
        }
    }
}

impl FromStr for CloudEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "azurecloud" => Ok(CloudEnvironment::Public),
            "usgov" | "azureusgovernment" | "azuregovernment" => Ok(CloudEnvironment::USGov),
            "china" | "azurechinacloud" => Ok(CloudEnvironment::China),
            "germany" | "azuregermancloud" => Ok(CloudEnvironment::Germany),
            _ => Err(Error::invalid_request(format!(
                "unknown cloud {s:?} (expected Public, USGov, China or Germany)"
            ))),
        }
    }
}

impl fmt::Display for CloudEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudEnvironment::Public => write!(f, "Public"),
            CloudEnvironment::USGov => write!(f, "USGov"),
            CloudEnvironment::China => write!(f, "China"),
            CloudEnvironment::Germany => write!(f, "Germany"),
        }
    }
}
