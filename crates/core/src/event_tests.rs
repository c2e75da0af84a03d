// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    reserved = {
        Event::CapacityReserved {
            reservation_id: ReservationId::new("order:o-1/pea"),
            rack: RackId::new("main"),
            slots: 4,
        },
        "capacity:reserved"
    },
    overdue = {
        Event::TaskOverdue {
            task_id: TaskId::from("task-1"),
            kind: TaskType::Light,
            run_at: DateTime::<Utc>::UNIX_EPOCH,
        },
        "task:overdue"
    },
    cancelled = {
        Event::OwnerCancelled { owner: OwnerRef::order("o-1"), released: vec![] },
        "owner:cancelled"
    },
)]
fn event_names(event: Event, expected: &str) {
    assert_eq!(event.name(), expected);
}

#[test]
fn serialized_events_carry_type_tag() {
    let event = Event::CapacityDenied {
        owner: OwnerRef::subscription("s-1"),
        product_id: "sunflower".to_string(),
        tray: TraySize::Small,
        quantity: 12,
        reason: "no free slots".to_string(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "capacity_denied");
    assert_eq!(json["tray"], "5x5");
    assert_eq!(json["owner"]["kind"], "subscription");
}
