// ── Statistics devices ──
//
// Fixed low slots mirroring `/api/stats/summary`, plus the appliance
// status switch.

use holesync_api::StatsSummary;
use strum::EnumIter;

use super::device::{DeviceType, DeviceValue, SwitchState};
use super::slot::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StatMetric {
    DnsQueries,
    AdsBlocked,
    AdsPercentage,
    DomainsBlocked,
    QueriesForwarded,
    QueriesCached,
    ClientsEverSeen,
    UniqueClients,
    UniqueDomains,
    Status,
}

impl StatMetric {
    pub const fn slot(self) -> Slot {
        Slot::new(match self {
            Self::DnsQueries => 1,
            Self::AdsBlocked => 2,
            Self::AdsPercentage => 3,
            Self::DomainsBlocked => 4,
            Self::QueriesForwarded => 5,
            Self::QueriesCached => 6,
            Self::ClientsEverSeen => 7,
            Self::UniqueClients => 8,
            Self::UniqueDomains => 9,
            Self::Status => 10,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DnsQueries => "DNS Queries Today",
            Self::AdsBlocked => "Ads Blocked Today",
            Self::AdsPercentage => "Ads Percentage",
            Self::DomainsBlocked => "Domains in Blocklist",
            Self::QueriesForwarded => "Queries Forwarded",
            Self::QueriesCached => "Queries Cached",
            Self::ClientsEverSeen => "Clients Ever Seen",
            Self::UniqueClients => "Unique Clients",
            Self::UniqueDomains => "Unique Domains",
            Self::Status => "Pi-hole Status",
        }
    }

    pub fn device_type(self) -> DeviceType {
        let counter = |unit: &str| DeviceType::Counter { unit: unit.into() };
        match self {
            Self::DnsQueries | Self::QueriesForwarded | Self::QueriesCached => counter("queries"),
            Self::AdsBlocked => counter("blocked"),
            Self::DomainsBlocked | Self::UniqueDomains => counter("domains"),
            Self::ClientsEverSeen | Self::UniqueClients => counter("clients"),
            Self::AdsPercentage => DeviceType::Percentage,
            Self::Status => DeviceType::Switch,
        }
    }

    /// Value a freshly created device starts with.
    pub fn initial_value(self) -> DeviceValue {
        match self {
            Self::Status => SwitchState::Off.into(),
            _ => DeviceValue::text("0"),
        }
    }

    /// Reading for this metric from a successful summary fetch.
    pub fn value(self, summary: &StatsSummary) -> DeviceValue {
        let q = &summary.queries;
        match self {
            Self::DnsQueries => DeviceValue::text(q.total.to_string()),
            Self::AdsBlocked => DeviceValue::text(q.blocked.to_string()),
            Self::AdsPercentage => DeviceValue::text(format!("{:.2}", q.percent_blocked)),
            Self::DomainsBlocked => {
                DeviceValue::text(summary.gravity.domains_being_blocked.to_string())
            }
            Self::QueriesForwarded => DeviceValue::text(q.forwarded.to_string()),
            Self::QueriesCached => DeviceValue::text(q.cached.to_string()),
            Self::ClientsEverSeen => DeviceValue::text(summary.clients.total.to_string()),
            Self::UniqueClients => DeviceValue::text(summary.clients.active.to_string()),
            Self::UniqueDomains => DeviceValue::text(q.unique_domains.to_string()),
            // A summary only exists if the appliance answered.
            Self::Status => SwitchState::On.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::STATISTICS_SLOTS;
    use strum::IntoEnumIterator;

    #[test]
    fn metrics_fill_the_statistics_range() {
        let slots: Vec<u32> = StatMetric::iter().map(|m| m.slot().get()).collect();
        assert_eq!(slots, (1..=10).collect::<Vec<_>>());
        assert!(StatMetric::iter().all(|m| STATISTICS_SLOTS.contains(m.slot())));
    }

    #[test]
    fn percentage_renders_two_decimals() {
        let mut summary = StatsSummary::default();
        summary.queries.percent_blocked = 12.915_432;
        assert_eq!(
            StatMetric::AdsPercentage.value(&summary),
            DeviceValue::text("12.92")
        );
    }

    #[test]
    fn client_metrics_map_total_and_active() {
        let mut summary = StatsSummary::default();
        summary.clients.total = 31;
        summary.clients.active = 14;
        assert_eq!(StatMetric::ClientsEverSeen.value(&summary).s_value, "31");
        assert_eq!(StatMetric::UniqueClients.value(&summary).s_value, "14");
    }

    #[test]
    fn status_is_on_when_summary_arrives() {
        let value = StatMetric::Status.value(&StatsSummary::default());
        assert_eq!(value, DeviceValue::new(1, "On"));
    }
}
