//! `holesync devices`: list the local device store.

use serde::Serialize;
use tabled::Tabled;

use holesync_config::Config;
use holesync_core::{CollectionKind, Device, DeviceType, model::STATISTICS_SLOTS};

use crate::cli::{DeviceKindArg, DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Slot")]
    slot: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Tag")]
    tag: String,
}

/// Serialized view: the stored device plus its resolved kind.
#[derive(Serialize)]
struct DeviceView<'a> {
    kind: &'static str,
    #[serde(flatten)]
    device: &'a Device,
}

fn kind_of(device: &Device) -> &'static str {
    if STATISTICS_SLOTS.contains(device.slot) {
        return "stats";
    }
    match CollectionKind::for_slot(device.slot) {
        Some(CollectionKind::List) => "list",
        Some(CollectionKind::Group) => "group",
        None => "other",
    }
}

fn type_label(device_type: &DeviceType) -> String {
    match device_type {
        DeviceType::Switch => "switch".into(),
        DeviceType::Percentage => "percentage".into(),
        DeviceType::Counter { unit } => format!("counter ({unit})"),
    }
}

fn matches_filter(kind: &str, filter: Option<DeviceKindArg>) -> bool {
    match filter {
        None => true,
        Some(DeviceKindArg::Stats) => kind == "stats",
        Some(DeviceKindArg::List) => kind == "list",
        Some(DeviceKindArg::Group) => kind == "group",
    }
}

pub fn handle(args: &DevicesArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let store = super::open_store(cfg)?;
    let color = output::should_color(&global.color);

    let views: Vec<DeviceView<'_>> = store
        .devices()
        .map(|device| DeviceView {
            kind: kind_of(device),
            device,
        })
        .filter(|v| matches_filter(v.kind, args.kind))
        .collect();

    let rendered = output::render_list(
        &global.output,
        &views,
        |v| DeviceRow {
            slot: v.device.slot.get(),
            name: v.device.name.clone(),
            device_type: type_label(&v.device.device_type),
            value: output::paint_state(&v.device.value.s_value, color),
            tag: v.device.description.clone(),
        },
        |v| v.device.slot.to_string(),
    )?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use holesync_core::{DeviceValue, Slot};

    fn device(slot: u32) -> Device {
        Device::new(Slot::new(slot), "x", DeviceType::Percentage, DeviceValue::text("1.00"))
    }

    #[test]
    fn kinds_follow_slot_ranges() {
        assert_eq!(kind_of(&device(3)), "stats");
        assert_eq!(kind_of(&device(150)), "list");
        assert_eq!(kind_of(&device(250)), "group");
        assert_eq!(kind_of(&device(50)), "other");
    }

    #[test]
    fn filter_by_kind() {
        assert!(matches_filter("list", None));
        assert!(matches_filter("group", Some(DeviceKindArg::Group)));
        assert!(!matches_filter("stats", Some(DeviceKindArg::List)));
    }

    #[test]
    fn counter_label_includes_unit() {
        let t = DeviceType::Counter { unit: "queries".into() };
        assert_eq!(type_label(&t), "counter (queries)");
    }
}
