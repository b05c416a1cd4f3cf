use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Default IAM host, shared by the three IAM services and the token endpoint.
pub const IAM_HOST: &str = "https://iam.cloud.ibm.com";

/// The IBM Cloud services a resource can be bound to.
///
/// The snake_case name doubles as the credential key: the upper-cased form
/// is the prefix of every environment variable read for that service
/// (`IAM_IDENTITY_APIKEY`, `SCHEMATICS_URL`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Service {
    /// Access groups, rules, members, templates and assignments.
    IamAccessGroups,
    /// Service IDs, API keys, trusted profiles, claim rules, links.
    IamIdentity,
    /// Policies (v1 / v2), custom roles, policy templates and assignments.
    IamPolicyManagement,
    /// Schematics agents, policies and workspaces.
    Schematics,
}

impl Service {
    /// Environment variable prefix, e.g. `IAM_POLICY_MANAGEMENT`.
    pub fn env_prefix(self) -> String {
        self.as_ref().to_ascii_uppercase()
    }

    /// Public endpoint for this service.
    ///
    /// Only Schematics is regional; the IAM services share one global host.
    pub fn default_url(self, region: Option<&str>) -> String {
        match (self, region) {
            (Self::Schematics, Some(region)) if !region.is_empty() => {
                format!("https://{region}.schematics.cloud.ibm.com")
            }
            (Self::Schematics, _) => "https://schematics.cloud.ibm.com".into(),
            _ => IAM_HOST.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn names_round_trip_through_snake_case() {
        for service in Service::iter() {
            assert_eq!(Service::from_str(service.as_ref()).ok(), Some(service));
        }
        assert_eq!(Service::IamAccessGroups.to_string(), "iam_access_groups");
    }

    #[test]
    fn env_prefix_is_upper_snake() {
        assert_eq!(
            Service::IamPolicyManagement.env_prefix(),
            "IAM_POLICY_MANAGEMENT"
        );
        assert_eq!(Service::Schematics.env_prefix(), "SCHEMATICS");
    }

    #[test]
    fn schematics_endpoint_is_regional() {
        assert_eq!(
            Service::Schematics.default_url(Some("eu-de")),
            "https://eu-de.schematics.cloud.ibm.com"
        );
        assert_eq!(
            Service::Schematics.default_url(None),
            "https://schematics.cloud.ibm.com"
        );
        assert_eq!(Service::IamIdentity.default_url(Some("eu-de")), IAM_HOST);
    }
}
