use world::{BoolState, GameObject, Merge, NpcShip, ObjectId, ObjectKind, WorldTable};

fn ship() -> NpcShip {
    NpcShip::new(ObjectId(42))
}

#[test]
fn merge_is_idempotent() {
    let update = NpcShip {
        name: Some("Hunter".into()),
        heading: Some(1.5),
        surrendered: BoolState::False,
        ..ship()
    };

    let mut once = ship();
    once.merge(update.clone());
    let mut twice = once.clone();
    twice.merge(update);
    assert_eq!(once, twice);
}

#[test]
fn disjoint_updates_commute() {
    let position = NpcShip {
        x: Some(10.0),
        y: Some(0.0),
        z: Some(-3.0),
        ..ship()
    };
    let shields = NpcShip {
        shields_front: Some(80.0),
        shield_freqs: [Some(0.1), None, None, None, Some(0.5)],
        ..ship()
    };

    let mut a = ship();
    a.merge(position.clone());
    a.merge(shields.clone());

    let mut b = ship();
    b.merge(shields);
    b.merge(position);

    assert_eq!(a, b);
}

#[test]
fn conflicting_updates_last_wins() {
    let mut target = ship();
    target.merge(NpcShip {
        velocity: Some(1.0),
        ..ship()
    });
    target.merge(NpcShip {
        velocity: Some(2.0),
        ..ship()
    });
    assert_eq!(target.velocity, Some(2.0));
}

#[test]
fn unspecified_preserves_every_field() {
    let full = NpcShip {
        name: Some("Full".into()),
        throttle: Some(0.5),
        is_enemy: BoolState::True,
        hull_id: Some(1001),
        in_nebula: BoolState::False,
        scan_level: Some(2),
        shield_freqs: [Some(0.2); 5],
        ..ship()
    };
    let mut merged = full.clone();
    merged.merge(ship());
    assert_eq!(merged, full);
}

#[test]
fn table_query_by_specified_field() {
    let table = WorldTable::new();
    table
        .apply(GameObject::from(NpcShip {
            is_enemy: BoolState::True,
            ..NpcShip::new(ObjectId(1))
        }))
        .unwrap();
    table
        .apply(GameObject::from(NpcShip::new(ObjectId(2))))
        .unwrap();
    table
        .apply(GameObject::from(NpcShip {
            is_enemy: BoolState::False,
            ..NpcShip::new(ObjectId(2))
        }))
        .unwrap();

    let enemies_known = table
        .with_specified(ObjectKind::NpcShip, "IsEnemy")
        .unwrap();
    assert_eq!(enemies_known.len(), 2);
    assert!(table
        .with_specified(ObjectKind::NpcShip, "Name")
        .unwrap()
        .is_empty());
}

#[test]
fn concurrent_applies_all_land() {
    let table = std::sync::Arc::new(WorldTable::new());
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let table = std::sync::Arc::clone(&table);
            std::thread::spawn(move || {
                for id in 0..50 {
                    table
                        .apply(GameObject::from(NpcShip {
                            x: Some(worker as f32),
                            ..NpcShip::new(ObjectId(id))
                        }))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(table.len(), 50);
    assert!(table
        .objects_of(ObjectKind::NpcShip)
        .iter()
        .all(|object| object.is_specified("X").unwrap()));
}
